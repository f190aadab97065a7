use chrono::{Datelike, Duration, Months, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Week,
    Month,
    Semester,
    Custom,
}

impl PeriodKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "semester" => Some(Self::Semester),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Inclusive `[start, end]` pair of `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    /// Lexicographic test; valid because both sides are zero-padded ISO dates.
    pub fn contains(&self, date: &str) -> bool {
        date >= self.start.as_str() && date <= self.end.as_str()
    }
}

pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// First day of the current semester: Sep 1 for Sep..Jan, Feb 1 for Feb..Aug.
pub fn semester_start(today: NaiveDate) -> NaiveDate {
    let (year, month) = match today.month() {
        9..=12 => (today.year(), 9),
        1 => (today.year() - 1, 9),
        _ => (today.year(), 2),
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today)
}

/// Resolves a period selector against `today`. `custom` only requires non-empty bounds;
/// an inverted pair is passed through and simply matches nothing.
pub fn resolve(
    kind: PeriodKind,
    today: NaiveDate,
    custom: Option<(&str, &str)>,
) -> Result<DateRange, String> {
    let end = format_date(today);
    let start = match kind {
        PeriodKind::Week => format_date(today - Duration::days(7)),
        PeriodKind::Month => format_date(
            today
                .checked_sub_months(Months::new(1))
                .unwrap_or(today),
        ),
        PeriodKind::Semester => format_date(semester_start(today)),
        PeriodKind::Custom => {
            let Some((start, end)) = custom else {
                return Err("custom period requires start and end".to_string());
            };
            let (start, end) = (start.trim(), end.trim());
            if start.is_empty() || end.is_empty() {
                return Err("custom period requires start and end".to_string());
            }
            return Ok(DateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
    };
    Ok(DateRange { start, end })
}
