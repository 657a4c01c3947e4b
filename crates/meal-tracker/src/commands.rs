use chrono::NaiveDate;
use meals_core::calculations::{self, DailyTotals};
use meals_core::error::Result;
use meals_core::formatting::{format_calories, format_meal_line};
use meals_core::models::{Meal, MealId, MealTo, UserId};
use meals_core::settings::{Command, ListArgs};
use meals_core::time_utils::{parse_local_date, parse_local_time, TimeWindow, TimezoneHandler};
use meals_data::repository::MealRepository;
use meals_data::service::{MealFilter, MealService};
use serde::Serialize;
use tracing::info;

// ── Outcome ────────────────────────────────────────────────────────────────────

/// What a command produced, ready to be printed or shown in the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Annotated meals and the totals of the days they were drawn from.
    Listing {
        meals: Vec<MealTo>,
        totals: DailyTotals,
    },
    Meal(MealTo),
    Deleted(MealId),
    Days(Vec<DayTotal>),
}

/// One calendar day's calorie total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub calories: i64,
    pub excess: bool,
}

/// Whether running `command` changes stored meals.
pub fn mutates(command: &Command) -> bool {
    matches!(
        command,
        Command::Add { .. } | Command::Update { .. } | Command::Delete { .. }
    )
}

// ── Execution ──────────────────────────────────────────────────────────────────

/// Per-invocation context shared by every command.
pub struct Context<'a> {
    pub user_id: UserId,
    pub calories_per_day: i32,
    pub tz: &'a TimezoneHandler,
}

pub fn execute<R: MealRepository>(
    service: &MealService<R>,
    ctx: &Context<'_>,
    command: &Command,
) -> Result<Outcome> {
    match command {
        Command::List(args) => list(service, ctx, args),
        Command::Add {
            date_time,
            description,
            calories,
        } => {
            let meal = Meal::new(ctx.tz.parse_timestamp(date_time)?, description.clone(), *calories);
            let created = service.create(meal, ctx.user_id)?;
            info!("Created meal {:?} for user {}", created.id, ctx.user_id);
            Ok(Outcome::Meal(annotate_one(service, ctx, &created)?))
        }
        Command::Update {
            id,
            date_time,
            description,
            calories,
        } => {
            let mut meal = service.get(*id, ctx.user_id)?;
            if let Some(raw) = date_time {
                meal.date_time = ctx.tz.parse_timestamp(raw)?;
            }
            if let Some(text) = description {
                meal.description = text.clone();
            }
            if let Some(value) = calories {
                meal.calories = *value;
            }
            let updated = service.update(meal, ctx.user_id)?;
            info!("Updated meal {} for user {}", id, ctx.user_id);
            Ok(Outcome::Meal(annotate_one(service, ctx, &updated)?))
        }
        Command::Delete { id } => {
            service.delete(*id, ctx.user_id)?;
            info!("Deleted meal {} for user {}", id, ctx.user_id);
            Ok(Outcome::Deleted(*id))
        }
        Command::Get { id } => {
            let meal = service.get(*id, ctx.user_id)?;
            Ok(Outcome::Meal(annotate_one(service, ctx, &meal)?))
        }
        Command::Days => {
            let days = service
                .daily_totals(ctx.user_id)
                .into_iter()
                .map(|(date, calories)| DayTotal {
                    date,
                    calories,
                    excess: calculations::exceeds(calories, ctx.calories_per_day),
                })
                .collect();
            Ok(Outcome::Days(days))
        }
    }
}

fn list<R: MealRepository>(
    service: &MealService<R>,
    ctx: &Context<'_>,
    args: &ListArgs,
) -> Result<Outcome> {
    let filter = MealFilter {
        start_date: parse_local_date(args.start_date.as_deref())?,
        end_date: parse_local_date(args.end_date.as_deref())?,
        window: TimeWindow::from_bounds(
            parse_local_time(args.start_time.as_deref())?,
            parse_local_time(args.end_time.as_deref())?,
        ),
    };
    let (meals, totals) =
        service.annotated_with_totals(ctx.user_id, ctx.calories_per_day, &filter)?;
    Ok(Outcome::Listing { meals, totals })
}

/// Flag a single stored meal against its whole day.
fn annotate_one<R: MealRepository>(
    service: &MealService<R>,
    ctx: &Context<'_>,
    meal: &Meal,
) -> Result<MealTo> {
    let totals = service.daily_totals(ctx.user_id);
    let excess = calculations::classify(meal, &totals, ctx.calories_per_day)?;
    Ok(MealTo::from_meal(meal, excess))
}

// ── Rendering ──────────────────────────────────────────────────────────────────

/// Human-readable lines for `outcome`.
pub fn render_plain(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Listing { meals, .. } if meals.is_empty() => "No meals found.".to_string(),
        Outcome::Listing { meals, .. } => meals
            .iter()
            .map(format_meal_line)
            .collect::<Vec<_>>()
            .join("\n"),
        Outcome::Meal(meal) => format_meal_line(meal),
        Outcome::Deleted(id) => format!("Deleted meal #{}", id),
        Outcome::Days(days) if days.is_empty() => "No meals found.".to_string(),
        Outcome::Days(days) => days
            .iter()
            .map(|day| {
                format!(
                    "{}  {}{}",
                    day.date,
                    format_calories(day.calories),
                    if day.excess { "  [EXCESS]" } else { "" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Pretty-printed JSON for `outcome`.
pub fn render_json(outcome: &Outcome) -> Result<String> {
    let text = match outcome {
        Outcome::Listing { meals, .. } => serde_json::to_string_pretty(meals)?,
        Outcome::Meal(meal) => serde_json::to_string_pretty(meal)?,
        Outcome::Deleted(id) => serde_json::to_string_pretty(&serde_json::json!({ "deleted": id }))?,
        Outcome::Days(days) => serde_json::to_string_pretty(days)?,
    };
    Ok(text)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
