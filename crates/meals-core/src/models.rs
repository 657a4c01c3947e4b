use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Identifier of a stored meal, unique within the store.
pub type MealId = u32;

/// Identifier of the user owning a set of meals.
pub type UserId = u32;

/// The regular user seeded by the demo data and used when `--user` is omitted.
pub const USER_ID: UserId = 1;

/// The administrator account seeded by the demo data.
pub const ADMIN_ID: UserId = 2;

/// Daily calorie threshold used when none has been configured.
pub const DEFAULT_CALORIES_PER_DAY: i32 = 2000;

/// A single logged meal.
///
/// Owned by the storage layer; the excess computation only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    /// `None` until the meal has been saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MealId>,
    /// Local wall-clock time the meal was eaten.
    pub date_time: NaiveDateTime,
    pub description: String,
    pub calories: i32,
}

impl Meal {
    /// Build an unsaved meal.
    pub fn new(date_time: NaiveDateTime, description: impl Into<String>, calories: i32) -> Self {
        Self {
            id: None,
            date_time,
            description: description.into(),
            calories,
        }
    }

    /// Same meal carrying the given identifier.
    pub fn with_id(mut self, id: MealId) -> Self {
        self.id = Some(id);
        self
    }

    /// Whether the meal has not been assigned an identifier yet.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Calendar day the meal belongs to.
    pub fn date(&self) -> NaiveDate {
        self.date_time.date()
    }

    /// Time of day the meal was eaten.
    pub fn time(&self) -> NaiveTime {
        self.date_time.time()
    }
}

/// A meal annotated with whether its day went over the calorie threshold.
///
/// Built fresh for every query and handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealTo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MealId>,
    pub date_time: NaiveDateTime,
    pub description: String,
    pub calories: i32,
    /// `true` when the day's total calories are strictly above the threshold.
    pub excess: bool,
}

impl MealTo {
    /// Copy the meal's fields and attach the computed `excess` flag.
    pub fn from_meal(meal: &Meal, excess: bool) -> Self {
        Self {
            id: meal.id,
            date_time: meal.date_time,
            description: meal.description.clone(),
            calories: meal.calories,
            excess,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date_time.date()
    }
}
