//! Meal storage keyed by user.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDateTime;
use meals_core::error::{MealsError, Result};
use meals_core::models::{Meal, MealId, UserId};
use tracing::debug;

// ── MealRepository ────────────────────────────────────────────────────────────

/// Storage operations for a user's meals.
///
/// Lists come back newest first.
pub trait MealRepository: Send + Sync {
    /// Insert a new meal (assigning its id) or replace an existing one.
    ///
    /// Returns `None` when an update targets a meal the user does not own.
    fn save(&self, meal: Meal, user_id: UserId) -> Option<Meal>;

    /// Returns `false` when there was nothing to delete.
    fn delete(&self, id: MealId, user_id: UserId) -> bool;

    fn get(&self, id: MealId, user_id: UserId) -> Option<Meal>;

    fn get_all(&self, user_id: UserId) -> Vec<Meal>;

    /// Meals with `start <= date_time < end`; a `None` bound is open.
    fn get_between_half_open(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        user_id: UserId,
    ) -> Vec<Meal>;
}

// ── InMemoryMealRepository ────────────────────────────────────────────────────

/// Thread-safe in-memory store with a global id sequence.
#[derive(Debug, Default)]
pub struct InMemoryMealRepository {
    user_meals: RwLock<HashMap<UserId, HashMap<MealId, Meal>>>,
    counter: AtomicU32,
}

impl InMemoryMealRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a meal that already carries an id, e.g. one read from disk.
    ///
    /// The id sequence continues past the highest id seen. Fails with
    /// [`MealsError::InvalidInput`] when the meal has no id or the id is
    /// already taken.
    pub fn insert_existing(&self, meal: Meal, user_id: UserId) -> Result<()> {
        let id = meal
            .id
            .ok_or_else(|| MealsError::InvalidInput("stored meal has no id".to_string()))?;

        let mut all = self.write();
        if all.values().any(|meals| meals.contains_key(&id)) {
            return Err(MealsError::InvalidInput(format!(
                "duplicate meal id {}",
                id
            )));
        }
        all.entry(user_id).or_default().insert(id, meal);
        self.counter.fetch_max(id, Ordering::SeqCst);
        Ok(())
    }

    /// Every stored meal with its owner, ordered by user then id.
    pub fn entries(&self) -> Vec<(UserId, Meal)> {
        let all = self.read();
        let mut entries: Vec<(UserId, Meal)> = all
            .iter()
            .flat_map(|(user_id, meals)| meals.values().map(move |m| (*user_id, m.clone())))
            .collect();
        entries.sort_by_key(|(user_id, meal)| (*user_id, meal.id));
        entries
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<UserId, HashMap<MealId, Meal>>> {
        self.user_meals.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<UserId, HashMap<MealId, Meal>>> {
        self.user_meals.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn filtered_sorted<P>(&self, user_id: UserId, predicate: P) -> Vec<Meal>
    where
        P: Fn(&Meal) -> bool,
    {
        let all = self.read();
        let Some(meals) = all.get(&user_id) else {
            return Vec::new();
        };
        let mut result: Vec<Meal> = meals.values().filter(|m| predicate(m)).cloned().collect();
        result.sort_by(|a, b| b.date_time.cmp(&a.date_time).then(b.id.cmp(&a.id)));
        result
    }
}

impl MealRepository for InMemoryMealRepository {
    fn save(&self, mut meal: Meal, user_id: UserId) -> Option<Meal> {
        let mut all = self.write();
        let meals = all.entry(user_id).or_default();

        match meal.id {
            None => {
                let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
                meal.id = Some(id);
                meals.insert(id, meal.clone());
                debug!("Created meal {} for user {}", id, user_id);
                Some(meal)
            }
            Some(id) => {
                let slot = meals.get_mut(&id)?;
                *slot = meal.clone();
                debug!("Updated meal {} for user {}", id, user_id);
                Some(meal)
            }
        }
    }

    fn delete(&self, id: MealId, user_id: UserId) -> bool {
        let removed = self
            .write()
            .get_mut(&user_id)
            .and_then(|meals| meals.remove(&id))
            .is_some();
        if removed {
            debug!("Deleted meal {} for user {}", id, user_id);
        }
        removed
    }

    fn get(&self, id: MealId, user_id: UserId) -> Option<Meal> {
        self.read()
            .get(&user_id)
            .and_then(|meals| meals.get(&id))
            .cloned()
    }

    fn get_all(&self, user_id: UserId) -> Vec<Meal> {
        self.filtered_sorted(user_id, |_| true)
    }

    fn get_between_half_open(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        user_id: UserId,
    ) -> Vec<Meal> {
        self.filtered_sorted(user_id, |meal| {
            start.map_or(true, |s| meal.date_time >= s) && end.map_or(true, |e| meal.date_time < e)
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
