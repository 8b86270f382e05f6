use chrono::{DateTime, FixedOffset, Local, Timelike, Utc};

/// Source of "now" for the pricing engine.
///
/// The peak window is defined in the server's local time, so the clock
/// reports an offset-aware timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    /// Local hour of day, 0..=23
    fn hour(&self) -> u32 {
        self.now().hour()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }
}

/// Wall clock in the server's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(at: DateTime<FixedOffset>) -> Self {
        Self { at }
    }

    /// Today's date in UTC at the given hour and minute
    pub fn at_utc_hour(hour: u32, minute: u32) -> Self {
        let at = Utc::now()
            .date_naive()
            .and_hms_opt(hour.min(23), minute.min(59), 0)
            .unwrap_or_default()
            .and_utc()
            .fixed_offset();
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_hour() {
        let clock = FixedClock::at_utc_hour(9, 30);
        assert_eq!(clock.hour(), 9);
        assert_eq!(clock.now_utc().minute(), 30);
    }

    #[test]
    fn test_hour_uses_local_offset() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T07:15:00+02:00").unwrap();
        let clock = FixedClock::new(at);
        assert_eq!(clock.hour(), 7);
        assert_eq!(clock.now_utc().hour(), 5);
    }
}
