//! Engine configuration loading and validation

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

fn default_cache_expiry() -> Duration {
    Duration::from_secs(20 * 60)
}

fn default_max_last_used_delay() -> String {
    "-6h".to_string()
}

/// Configuration for the catalog cache.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Interval between periodic bulk reloads
    #[serde(default = "default_cache_expiry", with = "duration_secs")]
    pub cache_expiry: Duration,

    /// How stale `last_date_used` may get before a lookup triggers an
    /// asynchronous update. Must be a negative relative duration
    /// (e.g., `"-6h"`, `"-30m"`).
    #[serde(default = "default_max_last_used_delay")]
    pub max_last_used_delay: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_expiry: default_cache_expiry(),
            max_last_used_delay: default_max_last_used_delay(),
        }
    }
}

impl CacheConfig {
    /// Validate the configuration and return the positive last-used
    /// window it denotes.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidConfig`] when `max_last_used_delay`
    /// is not a negative relative duration.
    pub fn last_used_window(&self) -> Result<chrono::Duration> {
        let delay = parse_relative_duration(&self.max_last_used_delay)?;
        if delay >= chrono::Duration::zero() {
            return Err(AuthError::InvalidConfig(format!(
                "max_last_used_delay must be negative, got '{}'",
                self.max_last_used_delay
            )));
        }
        Ok(-delay)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

/// Parse a signed relative duration such as `-6h`, `-1d12h` or `90s`.
///
/// Supported units: `w` (weeks), `d` (days), `h` (hours), `m` (minutes),
/// `s` (seconds). Components may be concatenated; a single leading `-`
/// negates the whole value.
pub fn parse_relative_duration(input: &str) -> Result<chrono::Duration> {
    let trimmed = input.trim();
    let (negative, mut rest) = match trimmed.strip_prefix('-') {
        Some(r) => (true, r.trim_start()),
        None => (false, trimmed),
    };
    if rest.is_empty() {
        return Err(AuthError::InvalidConfig(format!(
            "empty duration: '{input}'"
        )));
    }

    let mut total = chrono::Duration::zero();
    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits_end == 0 {
            return Err(AuthError::InvalidConfig(format!(
                "expected a number in duration '{input}'"
            )));
        }
        let value: i64 = rest[..digits_end].parse().map_err(|_| {
            AuthError::InvalidConfig(format!("number out of range in duration '{input}'"))
        })?;
        rest = &rest[digits_end..];
        let unit = rest.chars().next().ok_or_else(|| {
            AuthError::InvalidConfig(format!("missing unit in duration '{input}'"))
        })?;
        rest = rest[unit.len_utf8()..].trim_start();
        let component = match unit {
            'w' => chrono::Duration::weeks(value),
            'd' => chrono::Duration::days(value),
            'h' => chrono::Duration::hours(value),
            'm' => chrono::Duration::minutes(value),
            's' => chrono::Duration::seconds(value),
            other => {
                return Err(AuthError::InvalidConfig(format!(
                    "unknown duration unit '{other}' in '{input}'"
                )))
            }
        };
        total = total + component;
    }

    Ok(if negative { -total } else { total })
}
