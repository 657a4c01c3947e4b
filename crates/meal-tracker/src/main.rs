mod bootstrap;
mod commands;

use anyhow::{Context, Result};
use meals_core::settings::Settings;
use meals_core::time_utils::TimezoneHandler;
use meals_data::demo::demo_repository;
use meals_data::reader::load_repository;
use meals_data::service::MealService;
use meals_data::writer::save_repository;
use meals_ui::app::App;

use crate::commands::Outcome;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Meal Tracker v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "User: {}, limit: {} kcal/day, output: {}",
        settings.user,
        settings.calories_per_day,
        settings.output
    );

    let tz = TimezoneHandler::new(&settings.timezone);
    let data_file = settings.data_file_path();

    let repository = if settings.demo {
        tracing::info!("Using built-in demo meals; changes will not be saved");
        demo_repository()
    } else {
        load_repository(&data_file, &tz)
            .with_context(|| format!("loading meals from {}", data_file.display()))?
    };
    let service = MealService::new(repository);

    let command = settings.command_or_default();
    let ctx = commands::Context {
        user_id: settings.user,
        calories_per_day: settings.calories_per_day,
        tz: &tz,
    };
    let outcome = commands::execute(&service, &ctx, &command)?;

    if commands::mutates(&command) && !settings.demo {
        save_repository(&data_file, service.repository())
            .with_context(|| format!("saving meals to {}", data_file.display()))?;
    }

    match (settings.output.as_str(), outcome) {
        ("table", Outcome::Listing { meals, totals }) => {
            let app = App::new(
                &settings.theme,
                "Meals",
                settings.user,
                settings.calories_per_day,
            );

            app.run_table(meals, totals).await?;
        }
        ("json", outcome) => println!("{}", commands::render_json(&outcome)?),
        (_, outcome) => println!("{}", commands::render_plain(&outcome)),
    }

    Ok(())
}
