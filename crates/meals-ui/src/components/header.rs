use meals_core::formatting::format_calories;
use meals_core::models::UserId;
use ratatui::text::{Line, Span};

use crate::themes::Theme;

pub const TITLE: &str = "MEAL TRACKER";

/// Dashboard header rendering three lines:
///
/// 1. Application title.
/// 2. A 60-column `=` separator.
/// 3. `[ user 1 | limit 2,000 kcal/day ]`
pub struct Header<'a> {
    pub user_id: UserId,
    pub calories_per_day: i32,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(user_id: UserId, calories_per_day: i32, theme: &'a Theme) -> Self {
        Self {
            user_id,
            calories_per_day,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        vec![
            Line::from(Span::styled(TITLE, self.theme.header)),
            Line::from(Span::styled("=".repeat(60), self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(format!("user {}", self.user_id), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(
                    format!(
                        "limit {}/day",
                        format_calories(i64::from(self.calories_per_day))
                    ),
                    self.theme.value,
                ),
                Span::styled(" ]", self.theme.label),
            ]),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_to_lines_count() {
        let theme = Theme::dark();
        assert_eq!(Header::new(1, 2000, &theme).to_lines().len(), 3);
    }

    #[test]
    fn test_header_title_and_separator() {
        let theme = Theme::dark();
        let lines = Header::new(1, 2000, &theme).to_lines();
        assert_eq!(line_text(&lines[0]), TITLE);
        assert_eq!(line_text(&lines[1]), "=".repeat(60));
    }

    #[test]
    fn test_header_info_line() {
        let theme = Theme::dark();
        let lines = Header::new(2, 2500, &theme).to_lines();
        assert_eq!(line_text(&lines[2]), "[ user 2 | limit 2,500 kcal/day ]");
    }
}
