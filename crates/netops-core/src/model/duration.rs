// ── Estimated fix time ──
//
// Stored as whole minutes. The `PT<N>H` string is only the wire and
// display form; everything else works with the structured value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration `{0}`: expected PT<N>H, PT<N>H<M>M, or PT<M>M")]
pub struct DurationParseError(pub String);

/// An ISO-8601 time-only duration, minute precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixDuration {
    minutes: u32,
}

impl FixDuration {
    pub const fn from_minutes(minutes: u32) -> Self {
        Self { minutes }
    }

    /// Build from a (possibly fractional) hour count, rounded to the minute.
    pub fn from_hours(hours: f64) -> Result<Self, DurationParseError> {
        if !hours.is_finite() || hours < 0.0 {
            return Err(DurationParseError(hours.to_string()));
        }
        let minutes = (hours * 60.0).round();
        if minutes > f64::from(u32::MAX) {
            return Err(DurationParseError(hours.to_string()));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
        Ok(Self::from_minutes(minutes as u32))
    }

    pub const fn minutes(self) -> u32 {
        self.minutes
    }

    pub fn hours(self) -> f64 {
        f64::from(self.minutes) / 60.0
    }
}

impl fmt::Display for FixDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.minutes / 60;
        let rest = self.minutes % 60;
        match rest {
            0 => write!(f, "PT{hours}H"),
            30 => write!(f, "PT{hours}.5H"),
            _ if hours == 0 => write!(f, "PT{rest}M"),
            _ => write!(f, "PT{hours}H{rest}M"),
        }
    }
}

impl FromStr for FixDuration {
    type Err = DurationParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let err = || DurationParseError(raw.to_owned());
        let body = raw.trim().strip_prefix("PT").ok_or_else(err)?;
        if body.is_empty() {
            return Err(err());
        }

        let (hours_part, rest) = match body.split_once('H') {
            Some((h, rest)) => (Some(h), rest),
            None => (None, body),
        };
        let minutes_part = match rest {
            "" => None,
            m => Some(m.strip_suffix('M').ok_or_else(err)?),
        };

        let mut total = 0.0_f64;
        if let Some(h) = hours_part {
            let hours: f64 = h.parse().map_err(|_| err())?;
            if !hours.is_finite() || hours < 0.0 {
                return Err(err());
            }
            total += hours * 60.0;
        }
        if let Some(m) = minutes_part {
            let minutes: u32 = m.parse().map_err(|_| err())?;
            total += f64::from(minutes);
        }

        Self::from_hours(total / 60.0).map_err(|_| err())
    }
}

impl Serialize for FixDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FixDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
