//! Storage and service layer for the meal tracker.
//!
//! Keeps meals per user in memory, loads and saves the JSONL meal log, and
//! exposes the CRUD and annotated-listing operations the CLI drives.

pub mod demo;
pub mod reader;
pub mod repository;
pub mod service;
pub mod writer;

pub use meals_core as core;
