//! Time source for everything that depends on "now".

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Format used for calendar-day fields (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// The current calendar day on the user's local clock.
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant. `today()` is the UTC date of that instant so
/// results do not depend on the host time zone.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Noon UTC on the given day.
    pub fn on(date: NaiveDate) -> Self {
        Self(date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }

    fn today(&self) -> NaiveDate {
        self.0.date_naive()
    }
}

/// Format a day as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` string.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Today's date on `clock`, as `YYYY-MM-DD`.
pub fn today_date(clock: &dyn Clock) -> String {
    format_date(clock.today())
}
