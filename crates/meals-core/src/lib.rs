//! Core types and computations for the meal tracker.
//!
//! Holds the meal models, the daily-calorie excess computation, time and
//! formatting helpers, the error type, and CLI settings.

pub mod calculations;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{MealsError, Result};
