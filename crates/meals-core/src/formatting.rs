use chrono::NaiveDateTime;

use crate::models::MealTo;

/// Display pattern for meal timestamps.
pub const DATE_TIME_PATTERN: &str = "%Y-%m-%d %H:%M";

/// Render a timestamp as `yyyy-MM-dd HH:mm`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use meals_core::formatting::format_date_time;
///
/// let dt = NaiveDate::from_ymd_opt(2020, 1, 30).unwrap().and_hms_opt(10, 0, 0).unwrap();
/// assert_eq!(format_date_time(&dt), "2020-01-30 10:00");
/// ```
pub fn format_date_time(dt: &NaiveDateTime) -> String {
    dt.format(DATE_TIME_PATTERN).to_string()
}

/// Format an integer with thousands separators.
///
/// # Examples
///
/// ```
/// use meals_core::formatting::format_number;
///
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(0), "0");
/// assert_eq!(format_number(-2010), "-2,010");
/// ```
pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let grouped = group_thousands(&digits);
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Format a calorie amount, e.g. `"1,000 kcal"`.
pub fn format_calories(calories: i64) -> String {
    format!("{} kcal", format_number(calories))
}

/// One-line rendering of an annotated meal for plain output.
pub fn format_meal_line(meal: &MealTo) -> String {
    let id = meal
        .id
        .map(|id| format!("#{}", id))
        .unwrap_or_else(|| "#-".to_string());
    let marker = if meal.excess { "  [EXCESS]" } else { "" };
    format!(
        "{:<6}{}  {}  {}{}",
        id,
        format_date_time(&meal.date_time),
        meal.description,
        format_calories(i64::from(meal.calories)),
        marker
    )
}

/// Insert `,` every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
