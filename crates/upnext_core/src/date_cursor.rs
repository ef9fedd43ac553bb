use crate::error::AppError;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

const DAY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const MAX_SHIFT_DAYS: u64 = 10_000_000;

/// The calendar day currently being viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateCursor {
    today: Date,
    current: Date,
}

impl DateCursor {
    /// Starts at the local calendar date, not the UTC date; around midnight
    /// the two differ and a task lands on the local day.
    pub fn today() -> Self {
        Self::starting_at(local_today())
    }

    /// Cursor whose notion of "today" is `day`.
    pub fn starting_at(day: Date) -> Self {
        Self {
            today: day,
            current: day,
        }
    }

    pub fn current(&self) -> Date {
        self.current
    }

    /// Moves by `days`; a result outside the supported calendar range leaves
    /// the cursor where it was.
    pub fn shift(&mut self, days: i64) -> Date {
        let next = if days.unsigned_abs() > MAX_SHIFT_DAYS {
            None
        } else {
            self.current.checked_add(Duration::days(days))
        };
        match next {
            Some(next) => self.current = next,
            None => log::debug!(
                "event=cursor_shift_rejected module=date_cursor from={} days={}",
                format_day(self.current),
                days
            ),
        }
        self.current
    }

    pub fn reset_to_today(&mut self) -> Date {
        self.current = self.today;
        self.current
    }

    pub fn is_today(&self) -> bool {
        self.current == self.today
    }
}

impl Default for DateCursor {
    fn default() -> Self {
        Self::today()
    }
}

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn local_today() -> Date {
    OffsetDateTime::now_utc().to_offset(local_offset()).date()
}

pub fn parse_day(raw: &str) -> Result<Date, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("date is required"));
    }
    Date::parse(trimmed, DAY_FORMAT)
        .map_err(|_| AppError::invalid_input("date must be YYYY-MM-DD"))
}

pub fn format_day(day: Date) -> String {
    // The format only uses numeric components, which cannot fail to render.
    day.format(DAY_FORMAT).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{DateCursor, format_day, local_offset, parse_day};
    use time::OffsetDateTime;
    use time::macros::date;

    #[test]
    fn today_uses_local_offset() {
        let expected = OffsetDateTime::now_utc().to_offset(local_offset()).date();
        let cursor = DateCursor::today();
        assert!(cursor.is_today());
        assert!((cursor.current() - expected).whole_days().abs() <= 1);
    }

    #[test]
    fn shift_rolls_over_month_and_year() {
        let mut cursor = DateCursor::starting_at(date!(2024 - 12 - 31));
        assert_eq!(cursor.shift(1), date!(2025 - 01 - 01));
        assert_eq!(cursor.shift(-2), date!(2024 - 12 - 30));
    }

    #[test]
    fn shift_handles_leap_day() {
        let mut cursor = DateCursor::starting_at(date!(2024 - 02 - 28));
        assert_eq!(cursor.shift(1), date!(2024 - 02 - 29));
        assert_eq!(cursor.shift(1), date!(2024 - 03 - 01));
    }

    #[test]
    fn reset_returns_to_start_day() {
        let mut cursor = DateCursor::starting_at(date!(2024 - 01 - 05));
        cursor.shift(-10);
        assert!(!cursor.is_today());
        assert_eq!(cursor.reset_to_today(), date!(2024 - 01 - 05));
        assert!(cursor.is_today());
    }

    #[test]
    fn shift_out_of_range_is_ignored() {
        let mut cursor = DateCursor::starting_at(date!(2024 - 01 - 05));
        let before = cursor.current();
        assert_eq!(cursor.shift(i64::MAX), before);
    }

    #[test]
    fn parse_and_format_day() {
        let day = parse_day(" 2024-01-05 ").unwrap();
        assert_eq!(day, date!(2024 - 01 - 05));
        assert_eq!(format_day(day), "2024-01-05");
        assert_eq!(parse_day("01/05/2024").unwrap_err().code(), "invalid_input");
        assert_eq!(parse_day("  ").unwrap_err().code(), "invalid_input");
    }
}
