//! Meal log loading.
//!
//! The log is a JSONL file with one meal per line:
//!
//! ```text
//! {"id":1,"user_id":1,"date_time":"2020-01-30T10:00:00","description":"Breakfast","calories":500}
//! ```
//!
//! Any malformed line fails the whole load; nothing is skipped silently.

use std::io::BufRead;
use std::path::Path;

use meals_core::error::{MealsError, Result};
use meals_core::models::{Meal, MealId, UserId, USER_ID};
use meals_core::time_utils::TimezoneHandler;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::repository::{InMemoryMealRepository, MealRepository};

// ── MealRecord ────────────────────────────────────────────────────────────────

/// One line of the meal log as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MealId>,
    #[serde(default = "default_user")]
    pub user_id: UserId,
    /// Kept as text so a missing or malformed timestamp is reported as bad
    /// input rather than as a JSON error.
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub description: String,
    pub calories: i32,
}

fn default_user() -> UserId {
    USER_ID
}

impl MealRecord {
    /// Convert into a meal, resolving the timestamp through `tz`.
    pub fn into_meal(self, tz: &TimezoneHandler) -> Result<(UserId, Meal)> {
        let raw = self
            .date_time
            .ok_or_else(|| MealsError::InvalidInput("missing date_time".to_string()))?;
        let date_time = tz.parse_timestamp(&raw)?;
        Ok((
            self.user_id,
            Meal {
                id: self.id,
                date_time,
                description: self.description,
                calories: self.calories,
            },
        ))
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read every meal from the log at `path`.
///
/// A missing file is an empty log.
pub fn load_meal_records(path: &Path, tz: &TimezoneHandler) -> Result<Vec<(UserId, Meal)>> {
    if !path.exists() {
        warn!("Meal log does not exist yet: {}", path.display());
        return Ok(Vec::new());
    }

    let file = std::fs::File::open(path).map_err(|source| MealsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut meals = Vec::new();
    for (index, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| MealsError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let located = |msg: String| {
            MealsError::InvalidInput(format!("{}:{}: {}", path.display(), index + 1, msg))
        };
        let record: MealRecord =
            serde_json::from_str(trimmed).map_err(|e| located(e.to_string()))?;
        let entry = record.into_meal(tz).map_err(|e| located(e.to_string()))?;
        meals.push(entry);
    }

    debug!("Loaded {} meals from {}", meals.len(), path.display());
    Ok(meals)
}

/// Build a repository from the log at `path`.
///
/// Meals stored with an id keep it; meals without one are numbered after
/// the highest stored id.
pub fn load_repository(path: &Path, tz: &TimezoneHandler) -> Result<InMemoryMealRepository> {
    let repo = InMemoryMealRepository::new();
    let (with_id, without_id): (Vec<_>, Vec<_>) = load_meal_records(path, tz)?
        .into_iter()
        .partition(|(_, meal)| meal.id.is_some());

    for (user_id, meal) in with_id {
        repo.insert_existing(meal, user_id)?;
    }
    for (user_id, meal) in without_id {
        repo.save(meal, user_id);
    }
    Ok(repo)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
