//! Random test data.
//!
//! Values are arbitrary but always valid for the service, so a test only
//! spells out the fields it actually cares about.

use chrono::{DateTime, TimeZone, Utc};
use forecast_core::MIN_TEMPERATURE_C;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Highest temperature [`valid_temperature_c`] produces
pub const MAX_GENERATED_TEMPERATURE_C: i32 = 60;

/// Random alphanumeric string
#[must_use]
pub fn string() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

/// Random string starting with `prefix`
#[must_use]
pub fn string_with_prefix(prefix: &str) -> String {
    format!("{prefix}-{}", string())
}

/// Random instant between 2020 and 2030, at whole-second precision
///
/// Whole seconds keep JSON round trips exact.
#[must_use]
pub fn date_time() -> DateTime<Utc> {
    // 2020-01-01T00:00:00Z .. 2030-01-01T00:00:00Z
    let seconds = rand::thread_rng().gen_range(1_577_836_800_i64..1_893_456_000_i64);
    Utc.timestamp_opt(seconds, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Random integer
#[must_use]
pub fn integer() -> i32 {
    rand::thread_rng().gen_range(i32::MIN..=i32::MAX)
}

/// Random temperature the service accepts
#[must_use]
pub fn valid_temperature_c() -> i32 {
    rand::thread_rng().gen_range(MIN_TEMPERATURE_C..=MAX_GENERATED_TEMPERATURE_C)
}

/// Random temperature the service rejects
#[must_use]
pub fn invalid_temperature_c() -> i32 {
    rand::thread_rng().gen_range(MIN_TEMPERATURE_C - 1_000..MIN_TEMPERATURE_C)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn strings_are_distinct_and_prefixed() {
        assert_ne!(string(), string());
        assert!(string_with_prefix("tenant").starts_with("tenant-"));
    }

    #[test]
    fn dates_have_whole_seconds() {
        for _ in 0..100 {
            assert_eq!(date_time().nanosecond(), 0);
        }
    }

    #[test]
    fn temperatures_respect_the_minimum() {
        for _ in 0..1_000 {
            assert!(valid_temperature_c() >= MIN_TEMPERATURE_C);
            assert!(invalid_temperature_c() < MIN_TEMPERATURE_C);
        }
    }
}
