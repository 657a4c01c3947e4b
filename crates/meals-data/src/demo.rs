//! Built-in sample meals for `--demo` runs.
//!
//! The user's log covers two days: January 30 totals exactly 2000 kcal and
//! January 31 totals 2010 kcal, one on each side of the default limit.

use chrono::{NaiveDate, NaiveDateTime};
use meals_core::models::{Meal, ADMIN_ID, USER_ID};

use crate::repository::{InMemoryMealRepository, MealRepository};

/// `(day of January 2020, hour, description, calories)`
const USER_MEALS: &[(u32, u32, &str, i32)] = &[
    (30, 10, "Breakfast", 500),
    (30, 13, "Lunch", 1000),
    (30, 20, "Dinner", 500),
    (31, 0, "Midnight snack", 100),
    (31, 10, "Breakfast", 1000),
    (31, 13, "Lunch", 500),
    (31, 20, "Dinner", 410),
];

const ADMIN_MEALS: &[(u32, u32, &str, i32)] = &[(30, 10, "Breakfast", 500), (30, 13, "Lunch", 1000)];

fn january_2020(day: u32, hour: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2020, 1, day)?.and_hms_opt(hour, 0, 0)
}

fn build(rows: &[(u32, u32, &str, i32)]) -> Vec<Meal> {
    rows.iter()
        .filter_map(|&(day, hour, description, calories)| {
            Some(Meal::new(january_2020(day, hour)?, description, calories))
        })
        .collect()
}

/// The regular user's sample meals, unsaved and in chronological order.
pub fn user_meals() -> Vec<Meal> {
    build(USER_MEALS)
}

/// The administrator's sample meals, unsaved.
pub fn admin_meals() -> Vec<Meal> {
    build(ADMIN_MEALS)
}

/// A repository holding the sample meals for both demo users.
pub fn demo_repository() -> InMemoryMealRepository {
    let repo = InMemoryMealRepository::new();
    for meal in user_meals() {
        repo.save(meal, USER_ID);
    }
    for meal in admin_meals() {
        repo.save(meal, ADMIN_ID);
    }
    repo
}
