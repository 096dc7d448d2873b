//! Time sources: "today" for undated statement lines and timestamps for saved records.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Injected source of the current time.
pub trait Clock {
    /// Current instant in UTC.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Calendar date used when a statement line has no usable date.
    fn today(&self) -> NaiveDate {
        self.now_utc().date_naive()
    }
}

/// Wall-clock time, with "today" taken in an IANA timezone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Build from a name like "America/Chicago".
    pub fn from_tz_name(tz: &str) -> Result<Self> {
        let tz: Tz = tz
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
        Ok(Self::new(tz))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(chrono_tz::UTC)
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

/// A clock frozen at one instant. Used by tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    tz: Tz,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            tz: chrono_tz::UTC,
        }
    }

    /// Midnight UTC of the given date.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)))
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.now.with_timezone(&self.tz).date_naive()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_utc(&self) -> DateTime<Utc> {
        (**self).now_utc()
    }

    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_today_in_timezone() {
        // 03:00 UTC on Feb 21 is still Feb 20 in Chicago (UTC-6)
        let now = Utc.with_ymd_and_hms(2026, 2, 21, 3, 0, 0).unwrap();
        let clock = FixedClock::new(now);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 2, 21).unwrap());

        let chicago = clock.with_timezone(chrono_tz::America::Chicago);
        assert_eq!(chicago.today(), NaiveDate::from_ymd_opt(2026, 2, 20).unwrap());
        assert_eq!(chicago.now_utc(), now);
    }

    #[test]
    fn test_at_date_is_midnight_utc() {
        let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(clock.now_utc().to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn test_system_clock_rejects_bad_timezone() {
        assert!(SystemClock::from_tz_name("Mars/Olympus").is_err());
        let clock = SystemClock::from_tz_name("America/Chicago").unwrap();
        assert_eq!(clock.timezone(), chrono_tz::America::Chicago);
    }
}
