use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::{MealsError, Result};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Turns timestamps found in meal logs into local wall-clock times.
///
/// Meals are grouped by the calendar day the user saw on their clock, so
/// offset-carrying timestamps are shifted into `default_tz` and stripped of
/// their zone. Naive timestamps are already wall-clock and pass through.
pub struct TimezoneHandler {
    default_tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler for the given IANA timezone name.
    ///
    /// Unrecognised names fall back to UTC with a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { default_tz: tz }
    }

    /// Parse a meal timestamp into local wall-clock time.
    ///
    /// Accepts RFC 3339 (with `Z` or an explicit offset) and the naive
    /// `%Y-%m-%dT%H:%M[:%S[.f]]` forms, with `T` or a space as separator.
    pub fn parse_timestamp(&self, s: &str) -> Result<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MealsError::InvalidInput("empty timestamp".to_string()));
        }

        let normalised = match s.strip_suffix('Z') {
            Some(stripped) => format!("{}+00:00", stripped),
            None => s.to_string(),
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Ok(dt.with_timezone(&self.default_tz).naive_local());
        }

        parse_naive_date_time(s)
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    pub fn default_tz(&self) -> Tz {
        self.default_tz
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a naive local date-time such as `2020-01-30T10:00` or
/// `2020-01-30 10:00:00`.
pub fn parse_naive_date_time(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| MealsError::InvalidInput(format!("malformed date-time \"{}\"", s)))
}

/// Parse an optional `yyyy-MM-dd` date. Missing or blank input yields `None`.
pub fn parse_local_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    match s.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| MealsError::InvalidInput(format!("malformed date \"{}\"", v))),
    }
}

/// Parse an optional `HH:mm` or `HH:mm:ss` time. Missing or blank input
/// yields `None`.
pub fn parse_local_time(s: Option<&str>) -> Result<Option<NaiveTime>> {
    match s.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveTime::parse_from_str(v, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(v, "%H:%M"))
            .map(Some)
            .map_err(|_| MealsError::InvalidInput(format!("malformed time \"{}\"", v))),
    }
}

// ── Date-range bounds ─────────────────────────────────────────────────────────

/// First instant of `date`; `None` leaves the range open at the start.
pub fn start_inclusive(date: Option<NaiveDate>) -> Option<NaiveDateTime> {
    date.map(|d| d.and_time(NaiveTime::MIN))
}

/// First instant of the day after `date`; `None` leaves the range open at
/// the end.
pub fn end_exclusive(date: Option<NaiveDate>) -> Option<NaiveDateTime> {
    date.and_then(|d| d.succ_opt())
        .map(|d| d.and_time(NaiveTime::MIN))
}

// ── Half-open intervals ───────────────────────────────────────────────────────

/// `start <= value < end`.
pub fn is_between_half_open<T: PartialOrd>(value: &T, start: &T, end: &T) -> bool {
    value >= start && value < end
}

/// A time-of-day window `[start, end)` within a single day.
///
/// `end == None` means the window runs to the end of the day. A window whose
/// end is not after its start matches nothing; windows never cross midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveTime,
    end: Option<NaiveTime>,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Build a window from optional user-supplied bounds.
    ///
    /// A missing start means midnight, a missing end means end of day.
    /// Returns `None` when neither bound is given, i.e. no filtering.
    pub fn from_bounds(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Option<Self> {
        if start.is_none() && end.is_none() {
            return None;
        }
        Some(Self {
            start: start.unwrap_or(NaiveTime::MIN),
            end,
        })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> Option<NaiveTime> {
        self.end
    }

    /// Half-open membership test.
    pub fn contains(&self, time: NaiveTime) -> bool {
        match self.end {
            Some(end) => is_between_half_open(&time, &self.start, &end),
            None => time >= self.start,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // ── TimezoneHandler ──────────────────────────────────────────────────────

    #[test]
    fn test_validate_timezone() {
        assert!(TimezoneHandler::validate_timezone("Europe/Moscow"));
        assert!(TimezoneHandler::validate_timezone("UTC"));
        assert!(!TimezoneHandler::validate_timezone("Mars/Olympus"));
        assert!(!TimezoneHandler::validate_timezone(""));
    }

    #[test]
    fn test_new_invalid_timezone_falls_back_to_utc() {
        let handler = TimezoneHandler::new("Invalid/Timezone");
        assert_eq!(handler.default_tz(), Tz::UTC);
    }

    #[test]
    fn test_parse_timestamp_naive_passes_through() {
        let handler = TimezoneHandler::new("Europe/Moscow");
        let dt = handler.parse_timestamp("2020-01-30T10:00:00").unwrap();
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.date(), d(2020, 1, 30));
    }

    #[test]
    fn test_parse_timestamp_offset_shifts_into_local_day() {
        // 22:30 UTC on Jan 30 is 01:30 on Jan 31 in Moscow (UTC+3).
        let handler = TimezoneHandler::new("Europe/Moscow");
        let dt = handler.parse_timestamp("2020-01-30T22:30:00Z").unwrap();
        assert_eq!(dt.date(), d(2020, 1, 31));
        assert_eq!(dt.time(), t(1, 30));
    }

    #[test]
    fn test_parse_timestamp_explicit_offset() {
        let handler = TimezoneHandler::new("UTC");
        let dt = handler.parse_timestamp("2020-01-30T12:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_timestamp_empty_is_invalid_input() {
        let handler = TimezoneHandler::new("UTC");
        let err = handler.parse_timestamp("  ").unwrap_err();
        assert!(matches!(err, MealsError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_timestamp_garbage_is_invalid_input() {
        let handler = TimezoneHandler::new("UTC");
        let err = handler.parse_timestamp("yesterday").unwrap_err();
        assert!(matches!(err, MealsError::InvalidInput(_)));
    }

    // ── parse helpers ────────────────────────────────────────────────────────

    #[test]
    fn test_parse_naive_date_time_variants() {
        let expected = d(2020, 1, 30).and_time(t(10, 0));
        assert_eq!(parse_naive_date_time("2020-01-30T10:00").unwrap(), expected);
        assert_eq!(parse_naive_date_time("2020-01-30 10:00").unwrap(), expected);
        assert_eq!(
            parse_naive_date_time("2020-01-30T10:00:00").unwrap(),
            expected
        );
    }

    #[test]
    fn test_parse_local_date() {
        assert_eq!(parse_local_date(None).unwrap(), None);
        assert_eq!(parse_local_date(Some("")).unwrap(), None);
        assert_eq!(
            parse_local_date(Some("2020-01-31")).unwrap(),
            Some(d(2020, 1, 31))
        );
        assert!(parse_local_date(Some("31.01.2020")).is_err());
    }

    #[test]
    fn test_parse_local_time() {
        assert_eq!(parse_local_time(None).unwrap(), None);
        assert_eq!(parse_local_time(Some(" ")).unwrap(), None);
        assert_eq!(parse_local_time(Some("07:00")).unwrap(), Some(t(7, 0)));
        assert_eq!(parse_local_time(Some("07:00:00")).unwrap(), Some(t(7, 0)));
        assert!(parse_local_time(Some("25:00")).is_err());
    }

    // ── date-range bounds ────────────────────────────────────────────────────

    #[test]
    fn test_start_inclusive_and_end_exclusive() {
        assert_eq!(
            start_inclusive(Some(d(2020, 1, 30))),
            Some(d(2020, 1, 30).and_time(t(0, 0)))
        );
        assert_eq!(
            end_exclusive(Some(d(2020, 1, 31))),
            Some(d(2020, 2, 1).and_time(t(0, 0)))
        );
        assert_eq!(start_inclusive(None), None);
        assert_eq!(end_exclusive(None), None);
    }

    // ── TimeWindow ───────────────────────────────────────────────────────────

    #[test]
    fn test_window_half_open_boundaries() {
        let window = TimeWindow::new(t(7, 0), t(12, 0));
        assert!(window.contains(t(7, 0)));
        assert!(window.contains(t(11, 59)));
        assert!(!window.contains(t(12, 0)));
        assert!(!window.contains(t(6, 59)));
    }

    #[test]
    fn test_window_equal_bounds_matches_nothing() {
        let window = TimeWindow::new(t(10, 0), t(10, 0));
        assert!(!window.contains(t(10, 0)));
        assert!(!window.contains(t(0, 0)));
    }

    #[test]
    fn test_window_reversed_bounds_matches_nothing() {
        let window = TimeWindow::new(t(20, 0), t(6, 0));
        assert!(!window.contains(t(22, 0)));
        assert!(!window.contains(t(3, 0)));
    }

    #[test]
    fn test_window_from_bounds() {
        assert_eq!(TimeWindow::from_bounds(None, None), None);

        let open_end = TimeWindow::from_bounds(Some(t(13, 0)), None).unwrap();
        assert!(open_end.contains(t(23, 59)));
        assert!(!open_end.contains(t(12, 59)));

        let open_start = TimeWindow::from_bounds(None, Some(t(10, 0))).unwrap();
        assert!(open_start.contains(t(0, 0)));
        assert!(!open_start.contains(t(10, 0)));
    }

    #[test]
    fn test_is_between_half_open_generic() {
        assert!(is_between_half_open(&5, &5, &10));
        assert!(!is_between_half_open(&10, &5, &10));
        let day = d(2020, 1, 30);
        assert!(is_between_half_open(&day, &d(2020, 1, 1), &d(2020, 2, 1)));
    }

    #[test]
    fn test_get_system_timezone_returns_nonempty_string() {
        assert!(!get_system_timezone().is_empty());
    }
}
