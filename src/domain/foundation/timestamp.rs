//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Creates a timestamp from Unix seconds.
    pub fn from_unix_secs(secs: i64) -> Self {
        use chrono::TimeZone;
        Self(Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
    }

    /// Returns the timestamp as Unix seconds.
    pub fn as_unix_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Creates a new timestamp by adding the specified number of seconds.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0 + Duration::seconds(secs as i64))
    }

    /// Creates a new timestamp by subtracting the specified number of seconds.
    pub fn minus_secs(&self, secs: u64) -> Self {
        Self(self.0 - Duration::seconds(secs as i64))
    }

    /// Whole seconds from now until this timestamp, clamped at zero.
    ///
    /// Used to derive the remaining lifetime of an expiring token.
    pub fn secs_from_now(&self) -> u64 {
        let delta = self.0.signed_duration_since(Utc::now()).num_seconds();
        delta.max(0) as u64
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_unix_secs_roundtrips() {
        let ts = Timestamp::from_unix_secs(1_705_276_800);
        assert_eq!(ts.as_unix_secs(), 1_705_276_800);
    }

    #[test]
    fn plus_secs_adds_correctly() {
        let ts = Timestamp::from_unix_secs(1000);
        assert_eq!(ts.plus_secs(60).as_unix_secs(), 1060);
    }

    #[test]
    fn minus_secs_subtracts_correctly() {
        let ts = Timestamp::from_unix_secs(1000);
        assert_eq!(ts.minus_secs(400).as_unix_secs(), 600);
    }

    #[test]
    fn ordering_works() {
        let earlier = Timestamp::from_unix_secs(100);
        let later = Timestamp::from_unix_secs(200);
        assert!(earlier.is_before(&later));
        assert!(later.is_after(&earlier));
        assert!(earlier < later);
    }

    #[test]
    fn secs_from_now_is_zero_for_past_instants() {
        let past = Timestamp::now().minus_secs(3600);
        assert_eq!(past.secs_from_now(), 0);
    }

    #[test]
    fn secs_from_now_approximates_remaining_lifetime() {
        let future = Timestamp::now().plus_secs(1500);
        let remaining = future.secs_from_now();
        assert!(remaining > 1495 && remaining <= 1500);
    }

    #[test]
    fn serializes_as_rfc3339() {
        let ts = Timestamp::from_unix_secs(1_705_276_800);
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15"));
    }
}
