//! Meal table view for the meal tracker TUI.
//!
//! Renders the annotated meals in a bordered [`ratatui::widgets::Table`],
//! one row per meal coloured by its excess flag, above a per-day summary.

use meals_core::calculations::{self, DailyTotals};
use meals_core::formatting;
use meals_core::models::MealTo;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::themes::Theme;

/// Render `meals` and the per-day `totals` into `area`.
///
/// Meal rows are drawn in [`Theme::excess`] or [`Theme::normal`]; the
/// summary lists each day's total against `calories_per_day`.
pub fn render_meal_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    meals: &[MealTo],
    totals: &DailyTotals,
    calories_per_day: i32,
    theme: &Theme,
) {
    let summary_height = u16::try_from(totals.len())
        .unwrap_or(u16::MAX)
        .saturating_add(3);
    let [meals_area, summary_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(summary_height)]).areas(area);

    render_meals(frame, meals_area, title, meals, theme);
    render_day_summary(frame, summary_area, totals, calories_per_day, theme);
}

fn render_meals(frame: &mut Frame, area: Rect, title: &str, meals: &[MealTo], theme: &Theme) {
    let header = Row::new(
        ["ID", "Date / Time", "Description", "Calories", "Status"]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let rows: Vec<Row> = meals
        .iter()
        .map(|meal| {
            Row::new(vec![
                Cell::from(meal.id.map(|id| id.to_string()).unwrap_or_default()),
                Cell::from(formatting::format_date_time(&meal.date_time)),
                Cell::from(meal.description.clone()),
                Cell::from(formatting::format_number(i64::from(meal.calories))),
                Cell::from(if meal.excess { "EXCESS" } else { "ok" }),
            ])
            .style(theme.meal_style(meal.excess))
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Length(18),
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

fn render_day_summary(
    frame: &mut Frame,
    area: Rect,
    totals: &DailyTotals,
    calories_per_day: i32,
    theme: &Theme,
) {
    let header = Row::new(
        ["Day", "Total", "Limit"]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    );

    let rows: Vec<Row> = totals
        .iter()
        .map(|(day, &total)| {
            Row::new(vec![
                Cell::from(day.to_string()),
                Cell::from(formatting::format_calories(total)),
                Cell::from(formatting::format_calories(i64::from(calories_per_day))),
            ])
            .style(theme.meal_style(calculations::exceeds(total, calories_per_day)))
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Daily totals ")
                .title_style(theme.table_total),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a placeholder when there are no meals to show.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No meals found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Add one with `meal-tracker add` or widen the filter.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text))
            .block(Block::default().borders(Borders::ALL).title(" Meals ")),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use meals_core::calculations::{aggregate, get_tos};
    use meals_core::models::Meal;
    use ratatui::backend::TestBackend;
    use ratatui::style::Color;
    use ratatui::Terminal;

    fn meals() -> Vec<Meal> {
        let at = |d, h| {
            NaiveDate::from_ymd_opt(2020, 1, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap()
        };
        vec![
            Meal::new(at(30, 10), "Porridge", 500).with_id(1),
            Meal::new(at(30, 13), "Soup", 1000).with_id(2),
            Meal::new(at(31, 10), "Pancakes", 1500).with_id(3),
            Meal::new(at(31, 20), "Steak", 600).with_id(4),
        ]
    }

    fn draw(width: u16, height: u16) -> Terminal<TestBackend> {
        let meals = meals();
        let tos = get_tos(&meals, 2000).unwrap();
        let totals = aggregate(&meals);
        let theme = Theme::dark();
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_meal_table(frame, area, "Meals", &tos, &totals, 2000, &theme);
            })
            .unwrap();
        terminal
    }

    fn rows_text(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect()
            })
            .collect()
    }

    fn row_of(lines: &[String], needle: &str) -> u16 {
        let index = lines
            .iter()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("{needle} not rendered"));
        u16::try_from(index).unwrap()
    }

    #[test]
    fn test_render_meal_table_shows_meals_and_days() {
        let terminal = draw(100, 20);
        let lines = rows_text(&terminal);
        for needle in ["Porridge", "Soup", "Pancakes", "Steak", "2020-01-31", "2,100 kcal"] {
            row_of(&lines, needle);
        }
    }

    #[test]
    fn test_render_meal_table_colours_rows_by_excess() {
        let terminal = draw(100, 20);
        let lines = rows_text(&terminal);
        let buffer = terminal.backend().buffer();

        let steak = row_of(&lines, "Steak");
        let soup = row_of(&lines, "Soup");
        assert_eq!(buffer[(1, steak)].fg, Color::Red);
        assert_eq!(buffer[(1, soup)].fg, Color::Green);
    }

    #[test]
    fn test_render_meal_table_day_summary_colours() {
        let terminal = draw(100, 20);
        let lines = rows_text(&terminal);
        let buffer = terminal.backend().buffer();

        let over = row_of(&lines, "2,100 kcal");
        let within = row_of(&lines, "1,500 kcal");
        assert_eq!(buffer[(1, over)].fg, Color::Red);
        assert_eq!(buffer[(1, within)].fg, Color::Green);
    }

    #[test]
    fn test_render_day_summary_total_equal_to_limit_is_green() {
        let at = |h| {
            NaiveDate::from_ymd_opt(2020, 2, 1)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap()
        };
        let meals = vec![
            Meal::new(at(9), "Eggs", 1200).with_id(1),
            Meal::new(at(19), "Pasta", 800).with_id(2),
        ];
        let tos = get_tos(&meals, 2000).unwrap();
        let totals = aggregate(&meals);
        let theme = Theme::dark();
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_meal_table(frame, area, "Meals", &tos, &totals, 2000, &theme);
            })
            .unwrap();

        let lines = rows_text(&terminal);
        let day_row = row_of(&lines, "2020-02-01  ");
        assert_eq!(terminal.backend().buffer()[(1, day_row)].fg, Color::Green);
    }

    #[test]
    fn test_render_meal_table_small_area_does_not_panic() {
        draw(20, 4);
    }

    #[test]
    fn test_render_no_data_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_no_data(frame, area, &theme);
            })
            .unwrap();
        row_of(&rows_text(&terminal), "No meals found");
    }
}
