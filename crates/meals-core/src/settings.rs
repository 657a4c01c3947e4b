use clap::{Args, CommandFactory, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{UserId, DEFAULT_CALORIES_PER_DAY, USER_ID};

/// Directory under the home directory holding config, logs and meal data.
pub const APP_DIR_NAME: &str = ".meal-tracker";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Log meals and see which days went over your calorie limit
#[derive(Parser, Debug, Clone)]
#[command(
    name = "meal-tracker",
    about = "Log meals and see which days went over your calorie limit",
    version
)]
pub struct Settings {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Daily calorie limit; days strictly above it are flagged
    #[arg(long, default_value_t = DEFAULT_CALORIES_PER_DAY, allow_hyphen_values = true)]
    pub calories_per_day: i32,

    /// User whose meals are shown or edited
    #[arg(long, default_value_t = USER_ID)]
    pub user: UserId,

    /// Meal log file (defaults to ~/.meal-tracker/meals.jsonl)
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Use the built-in sample meals instead of the meal log; edits are not saved
    #[arg(long)]
    pub demo: bool,

    /// Timezone used to read offset timestamps (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Output format
    #[arg(long, default_value = "plain", value_parser = ["plain", "json", "table"])]
    pub output: String,

    /// Display theme for the table output
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

/// What to do with the selected user's meals.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List meals annotated with their day's excess flag (default)
    List(ListArgs),
    /// Log a new meal
    Add {
        /// When the meal was eaten, e.g. 2020-01-30T10:00
        #[arg(long)]
        date_time: String,
        #[arg(long)]
        description: String,
        #[arg(long, allow_hyphen_values = true)]
        calories: i32,
    },
    /// Change fields of an existing meal
    Update {
        #[arg(long)]
        id: u32,
        #[arg(long)]
        date_time: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        calories: Option<i32>,
    },
    /// Delete a meal
    Delete {
        #[arg(long)]
        id: u32,
    },
    /// Show a single meal
    Get {
        #[arg(long)]
        id: u32,
    },
    /// Show calorie totals per day
    Days,
}

/// Date and time-of-day filters for `list`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    /// First day to include (yyyy-MM-dd)
    #[arg(long)]
    pub start_date: Option<String>,
    /// Last day to include (yyyy-MM-dd)
    #[arg(long)]
    pub end_date: Option<String>,
    /// Earliest time of day to include (HH:mm, inclusive)
    #[arg(long)]
    pub start_time: Option<String>,
    /// Time of day to stop at (HH:mm, exclusive)
    #[arg(long)]
    pub end_time: Option<String>,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.meal-tracker/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_per_day: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl LastUsedParams {
    /// Default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&home_dir())
    }

    /// Config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(APP_DIR_NAME).join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::config_path())
    }

    /// Atomically write params to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    pub fn clear() -> Result<(), std::io::Error> {
        Self::clear_at(&Self::config_path())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with an explicit argument
    /// list and config path so tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "calories_per_day") {
            if let Some(v) = last.calories_per_day {
                settings.calories_per_day = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "output") {
            if let Some(v) = last.output {
                settings.output = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!("Could not persist settings to {}: {}", config_path.display(), e);
        }

        settings
    }

    /// The subcommand to run; `list` without filters when none was given.
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::List(ListArgs::default()))
    }

    /// Meal log location, honouring `--data-file`.
    pub fn data_file_path(&self) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| default_data_file_in(&home_dir()))
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            calories_per_day: Some(s.calories_per_day),
            timezone: Some(s.timezone.clone()),
            theme: Some(s.theme.clone()),
            output: Some(s.output.clone()),
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────────

/// Default meal log path rooted at `base_dir`.
pub fn default_data_file_in(base_dir: &Path) -> PathBuf {
    base_dir.join(APP_DIR_NAME).join("meals.jsonl")
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
