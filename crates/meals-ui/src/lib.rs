//! Terminal UI layer for the meal tracker.
//!
//! Provides themes, the header component, the meal table view, and the
//! event loop built on top of [`ratatui`].

pub mod app;
pub mod components;
pub mod table_view;
pub mod themes;

pub use meals_core as core;
