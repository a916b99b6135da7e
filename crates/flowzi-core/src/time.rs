use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Clock abstracts access to the current timestamp so services remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
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

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Midnight UTC on `date`.
    pub fn on(date: NaiveDate) -> Self {
        Self(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
