//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use netops_core::{EntityId, FixDuration};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Parse a value already restricted by clap's `value_parser` list.
pub fn parse_choice<T: FromStr>(field: &str, raw: &str) -> Result<T, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("unknown value '{raw}'"),
    })
}

pub fn parse_opt_choice<T: FromStr>(field: &str, raw: Option<&str>) -> Result<Option<T>, CliError> {
    raw.map(|r| parse_choice(field, r)).transpose()
}

/// RFC 3339, or a local `YYYY-MM-DD HH:MM[:SS]` / `YYYY-MM-DD`.
pub fn parse_time(field: &str, raw: &str) -> Result<DateTime<Utc>, CliError> {
    parse_local_time(&Local, raw).ok_or_else(|| CliError::Validation {
        field: field.into(),
        reason: format!("expected RFC 3339 or 'YYYY-MM-DD HH:MM', got '{raw}'"),
    })
}

pub fn parse_opt_time(field: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, CliError> {
    raw.map(|r| parse_time(field, r)).transpose()
}

fn parse_local_time<Tz: TimeZone>(tz: &Tz, raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn parse_fix_hours(hours: Option<f64>) -> Result<Option<FixDuration>, CliError> {
    hours
        .map(|h| {
            FixDuration::from_hours(h).map_err(|e| CliError::Validation {
                field: "estimated-fix".into(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

pub fn opt_id(raw: Option<&str>) -> Option<EntityId> {
    raw.map(EntityId::from)
}

/// `--x <v>` sets, `--clear-x` nulls, neither leaves the column alone.
pub fn nullable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear { Some(None) } else { value.map(Some) }
}

pub fn or_dash(value: Option<impl ToString>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

pub fn format_time(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(
        || "-".into(),
        |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{FixedOffset, Timelike};

    use netops_core::BreakdownStatus;

    use super::*;

    #[test]
    fn local_times_are_converted_to_utc() {
        let tunis = FixedOffset::east_opt(3600).unwrap();
        let ts = parse_local_time(&tunis, "2025-03-01 09:30").unwrap();
        assert_eq!(ts.hour(), 8);
        assert_eq!(ts.minute(), 30);
    }

    #[test]
    fn rfc3339_keeps_its_offset() {
        let tunis = FixedOffset::east_opt(3600).unwrap();
        let ts = parse_local_time(&tunis, "2025-03-01T09:30:00Z").unwrap();
        assert_eq!(ts.hour(), 9);
    }

    #[test]
    fn bare_dates_are_local_midnight() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let ts = parse_local_time(&utc, "2025-03-01").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-03-01T00:00:00+00:00");
        assert!(parse_local_time(&utc, "yesterday").is_none());
    }

    #[test]
    fn choices_parse_through_strum() {
        let status: BreakdownStatus = parse_choice("status", "in_progress").unwrap();
        assert_eq!(status, BreakdownStatus::InProgress);
        assert!(parse_choice::<BreakdownStatus>("status", "done").is_err());
    }

    #[test]
    fn nullable_distinguishes_clear_from_untouched() {
        assert_eq!(nullable(Some(1), false), Some(Some(1)));
        assert_eq!(nullable::<i32>(None, true), Some(None));
        assert_eq!(nullable::<i32>(None, false), None);
    }

    #[test]
    fn half_hours_become_minutes() {
        let fix = parse_fix_hours(Some(2.5)).unwrap().unwrap();
        assert_eq!(fix.minutes(), 150);
        assert!(parse_fix_hours(Some(-1.0)).is_err());
    }
}
