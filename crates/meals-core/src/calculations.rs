//! Daily calorie aggregation and per-meal excess annotation.
//!
//! The computation runs in two passes: every meal is first summed into its
//! calendar day, then each meal is classified against its day's total. A
//! day's flag is therefore fixed before any of its meals is emitted, so
//! input order and late-arriving meals never change the result.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::error::{MealsError, Result};
use crate::models::{Meal, MealTo};
use crate::time_utils::TimeWindow;

/// Calories eaten per calendar day, ordered by day.
pub type DailyTotals = BTreeMap<NaiveDate, i64>;

// ── Aggregator ────────────────────────────────────────────────────────────────

/// Sum calories per calendar day over all `meals`.
///
/// Every meal counts, including repeated ids; zero and negative calories are
/// summed as given.
pub fn aggregate(meals: &[Meal]) -> DailyTotals {
    let mut totals = DailyTotals::new();
    for meal in meals {
        *totals.entry(meal.date()).or_insert(0) += i64::from(meal.calories);
    }
    totals
}

// ── Classifier ────────────────────────────────────────────────────────────────

/// Whether `meal`'s day total is strictly above `calories_per_day`.
///
/// `totals` must come from [`aggregate`] over a set containing `meal`; a
/// missing day is reported as [`MealsError::InvariantViolation`].
pub fn classify(meal: &Meal, totals: &DailyTotals, calories_per_day: i32) -> Result<bool> {
    let day = meal.date();
    let total = totals.get(&day).ok_or_else(|| {
        MealsError::InvariantViolation(format!("no daily total for {} (meal {:?})", day, meal.id))
    })?;
    Ok(exceeds(*total, calories_per_day))
}

/// Whether a day total is strictly above `calories_per_day`.
pub fn exceeds(day_total: i64, calories_per_day: i32) -> bool {
    day_total > i64::from(calories_per_day)
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Annotate `meals` with their excess flag, keeping only those inside
/// `window` when one is given.
///
/// Daily totals always cover the whole input. Output keeps input order.
pub fn compute_annotated(
    meals: &[Meal],
    calories_per_day: i32,
    window: Option<&TimeWindow>,
) -> Result<Vec<MealTo>> {
    let totals = aggregate(meals);

    let annotated = meals
        .iter()
        .filter(|meal| window.map_or(true, |w| w.contains(meal.time())))
        .map(|meal| {
            classify(meal, &totals, calories_per_day).map(|excess| MealTo::from_meal(meal, excess))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Annotated {} of {} meals across {} days",
        annotated.len(),
        meals.len(),
        totals.len()
    );

    Ok(annotated)
}

/// Annotate every meal.
pub fn get_tos(meals: &[Meal], calories_per_day: i32) -> Result<Vec<MealTo>> {
    compute_annotated(meals, calories_per_day, None)
}

/// Annotate the meals eaten within `[start_time, end_time)`.
pub fn get_filtered_tos(
    meals: &[Meal],
    calories_per_day: i32,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Result<Vec<MealTo>> {
    let window = TimeWindow::new(start_time, end_time);
    compute_annotated(meals, calories_per_day, Some(&window))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
