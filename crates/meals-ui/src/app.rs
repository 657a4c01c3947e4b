//! Application state and TUI event loop for the meal table.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use meals_core::calculations::DailyTotals;
use meals_core::models::{MealTo, UserId};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    text::Text,
    widgets::Paragraph,
    Frame, Terminal,
};

use crate::components::Header;
use crate::table_view;
use crate::themes::Theme;

/// Root application state for the meal table TUI.
pub struct App {
    pub theme: Theme,
    pub title: String,
    pub user_id: UserId,
    pub calories_per_day: i32,
}

impl App {
    pub fn new(theme_name: &str, title: impl Into<String>, user_id: UserId, calories_per_day: i32) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            title: title.into(),
            user_id,
            calories_per_day,
        }
    }

    /// Show `meals` with their day `totals` until `q` or `Ctrl+C`.
    pub async fn run_table(self, meals: Vec<MealTo>, totals: DailyTotals) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame, &meals, &totals)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if is_quit_key(&key) => break Ok(()),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Draw the header and the meal table into `frame`.
    pub fn render(&self, frame: &mut Frame, meals: &[MealTo], totals: &DailyTotals) {
        let [header_area, body_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(frame.area());

        let header = Header::new(self.user_id, self.calories_per_day, &self.theme);
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), header_area);

        if meals.is_empty() {
            table_view::render_no_data(frame, body_area, &self.theme);
        } else {
            table_view::render_meal_table(
                frame,
                body_area,
                &self.title,
                meals,
                totals,
                self.calories_per_day,
                &self.theme,
            );
        }
    }
}

/// `q`, `Q`, or `Ctrl+C`.
pub fn is_quit_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        _ => false,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
