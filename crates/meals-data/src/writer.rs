//! Meal log persistence.

use std::io::Write;
use std::path::Path;

use meals_core::error::Result;
use meals_core::models::{Meal, UserId};
use tracing::debug;

use crate::reader::MealRecord;
use crate::repository::InMemoryMealRepository;

const STORED_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

impl MealRecord {
    pub fn from_meal(user_id: UserId, meal: &Meal) -> Self {
        Self {
            id: meal.id,
            user_id,
            date_time: Some(meal.date_time.format(STORED_DATE_TIME_FORMAT).to_string()),
            description: meal.description.clone(),
            calories: meal.calories,
        }
    }
}

/// Write `entries` to `path` as a JSONL meal log.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// failed write never leaves a truncated log behind.
pub fn save_meal_records(path: &Path, entries: &[(UserId, Meal)]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut buf = Vec::new();
    for (user_id, meal) in entries {
        serde_json::to_writer(&mut buf, &MealRecord::from_meal(*user_id, meal))?;
        buf.write_all(b"\n")?;
    }

    let tmp = path.with_extension("jsonl.tmp");
    std::fs::write(&tmp, &buf)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }

    debug!("Saved {} meals to {}", entries.len(), path.display());
    Ok(())
}

/// Persist every meal held by `repo`.
pub fn save_repository(path: &Path, repo: &InMemoryMealRepository) -> Result<()> {
    save_meal_records(path, &repo.entries())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_repository;
    use crate::reader::{load_meal_records, load_repository};
    use crate::repository::MealRepository;
    use meals_core::error::MealsError;
    use meals_core::models::{ADMIN_ID, USER_ID};
    use meals_core::time_utils::TimezoneHandler;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load_keeps_ids_and_owners() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("meals.jsonl");
        let repo = demo_repository();

        save_repository(&path, &repo).unwrap();
        let reloaded = load_repository(&path, &TimezoneHandler::new("UTC")).unwrap();

        assert_eq!(reloaded.entries(), repo.entries());
        assert_eq!(reloaded.get_all(ADMIN_ID).len(), 2);
        assert!(!path.with_extension("jsonl.tmp").exists());
    }

    #[test]
    fn test_saved_lines_use_naive_timestamps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meals.jsonl");
        let repo = demo_repository();

        save_repository(&path, &repo).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let first = content.lines().next().unwrap();
        let value: serde_json::Value = serde_json::from_str(first).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["user_id"], USER_ID);
        assert_eq!(value["date_time"], "2020-01-30T10:00:00");
        assert_eq!(value["calories"], 500);
    }

    #[test]
    fn test_save_keeps_fractional_seconds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meals.jsonl");
        std::fs::write(
            &path,
            r#"{"id":1,"date_time":"2020-01-30T10:00:00.750","description":"Tea","calories":5}"#,
        )
        .unwrap();

        let tz = TimezoneHandler::new("UTC");
        let repo = load_repository(&path, &tz).unwrap();
        let before = repo.get(1, USER_ID).unwrap().date_time;
        save_repository(&path, &repo).unwrap();
        let after = load_repository(&path, &tz).unwrap().get(1, USER_ID).unwrap().date_time;

        assert_eq!(after, before);
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("2020-01-30T10:00:00.750"));
    }

    #[test]
    fn test_save_write_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meals.jsonl");
        // A directory squatting on the temp path makes the write fail.
        std::fs::create_dir(path.with_extension("jsonl.tmp")).unwrap();

        let err = save_repository(&path, &demo_repository()).unwrap_err();
        assert!(matches!(err, MealsError::Io(_)), "{}", err);
        assert!(!path.exists());
    }

    #[test]
    fn test_save_overwrites_previous_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meals.jsonl");
        let repo = demo_repository();
        save_repository(&path, &repo).unwrap();

        repo.delete(1, USER_ID);
        save_repository(&path, &repo).unwrap();

        let meals = load_meal_records(&path, &TimezoneHandler::new("UTC")).unwrap();
        assert_eq!(meals.len(), 8);
        assert!(meals.iter().all(|(_, m)| m.id != Some(1)));
    }
}
