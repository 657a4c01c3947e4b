//! User-facing meal operations on top of a [`MealRepository`].

use chrono::NaiveDate;
use meals_core::calculations::{self, DailyTotals};
use meals_core::error::{MealsError, Result};
use meals_core::models::{Meal, MealId, MealTo, UserId};
use meals_core::time_utils::{end_exclusive, start_inclusive, TimeWindow};

use crate::repository::MealRepository;

const ENTITY: &str = "meal";

/// Date range and time-of-day filter for listing meals.
///
/// Date bounds are inclusive days; the time window is half-open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MealFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub window: Option<TimeWindow>,
}

/// CRUD and annotated listings for one repository.
pub struct MealService<R: MealRepository> {
    repository: R,
}

impl<R: MealRepository> MealService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn get(&self, id: MealId, user_id: UserId) -> Result<Meal> {
        self.repository
            .get(id, user_id)
            .ok_or(MealsError::NotFound { entity: ENTITY, id })
    }

    pub fn delete(&self, id: MealId, user_id: UserId) -> Result<()> {
        if self.repository.delete(id, user_id) {
            Ok(())
        } else {
            Err(MealsError::NotFound { entity: ENTITY, id })
        }
    }

    /// All of the user's meals, newest first.
    pub fn get_all(&self, user_id: UserId) -> Vec<Meal> {
        self.repository.get_all(user_id)
    }

    /// Meals eaten from the start of `start_date` through the end of
    /// `end_date`, newest first. Missing dates leave that side open.
    pub fn get_between_inclusive(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        user_id: UserId,
    ) -> Vec<Meal> {
        self.repository.get_between_half_open(
            start_inclusive(start_date),
            end_exclusive(end_date),
            user_id,
        )
    }

    /// Store a meal that has not been saved before.
    pub fn create(&self, meal: Meal, user_id: UserId) -> Result<Meal> {
        if !meal.is_new() {
            return Err(MealsError::InvalidInput(format!(
                "meal {:?} must be new (id=null)",
                meal.id
            )));
        }
        self.repository.save(meal, user_id).ok_or_else(|| {
            MealsError::InvariantViolation("repository refused a new meal".to_string())
        })
    }

    /// Replace a stored meal.
    pub fn update(&self, meal: Meal, user_id: UserId) -> Result<Meal> {
        let id = meal
            .id
            .ok_or_else(|| MealsError::InvalidInput("meal to update has no id".to_string()))?;
        self.repository
            .save(meal, user_id)
            .ok_or(MealsError::NotFound { entity: ENTITY, id })
    }

    /// Every meal of the user, newest first, annotated against
    /// `calories_per_day`.
    pub fn get_tos(&self, user_id: UserId, calories_per_day: i32) -> Result<Vec<MealTo>> {
        calculations::get_tos(&self.get_all(user_id), calories_per_day)
    }

    /// Meals inside the filter's date range, annotated, then narrowed to its
    /// time window.
    ///
    /// Date bounds cover whole days, so each day's total is still computed
    /// over all of that day's meals.
    pub fn annotated_between(
        &self,
        user_id: UserId,
        calories_per_day: i32,
        filter: &MealFilter,
    ) -> Result<Vec<MealTo>> {
        self.annotated_with_totals(user_id, calories_per_day, filter)
            .map(|(meals, _)| meals)
    }

    /// Same as [`Self::annotated_between`], also returning the totals of
    /// every day in the date range. The range is queried once.
    pub fn annotated_with_totals(
        &self,
        user_id: UserId,
        calories_per_day: i32,
        filter: &MealFilter,
    ) -> Result<(Vec<MealTo>, DailyTotals)> {
        let in_range = self.get_between_inclusive(filter.start_date, filter.end_date, user_id);
        let annotated =
            calculations::compute_annotated(&in_range, calories_per_day, filter.window.as_ref())?;
        Ok((annotated, calculations::aggregate(&in_range)))
    }

    /// Calories per day over all of the user's meals.
    pub fn daily_totals(&self, user_id: UserId) -> DailyTotals {
        calculations::aggregate(&self.get_all(user_id))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
