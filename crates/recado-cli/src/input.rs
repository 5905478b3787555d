//! Validation of interactive input before it reaches the schedule slot.
//!
//! The daemon re-validates stored entries on its own (an invalid slot is
//! deactivated, never fired); this module is the front door that refuses to
//! write such a slot in the first place, and fills omitted values from the
//! `[defaults]` config section.

use anyhow::{anyhow, bail, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use recado_core::config::DefaultsConfig;
use recado_core::types::ScheduleEntry;
use recado_core::RecadoConfig;

/// Resolve CLI arguments plus config defaults into a validated entry whose
/// target moment lies in the future.
pub fn build_entry(
    config: &RecadoConfig,
    to: Option<String>,
    message: Option<String>,
    date: &str,
    time: Option<String>,
    now: NaiveDateTime,
) -> Result<ScheduleEntry> {
    let recipient = resolve_recipient(to, &config.defaults)?;
    let body = resolve_message(message, &config.defaults)?;

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| anyhow!("date must be YYYY-MM-DD"))?;
    let (hour, minute) = match time {
        Some(t) => parse_time(&t)?,
        None => (config.defaults.hour, config.defaults.minute),
    };
    if hour > 23 || minute > 59 {
        bail!("time must be within 00:00 to 23:59");
    }

    let entry = ScheduleEntry::new(recipient, body, date, hour, minute);
    let Some(target) = entry.target() else {
        bail!("{} is not a valid moment", entry.target_display());
    };
    if target <= now {
        bail!("scheduled date and time must be in the future");
    }
    Ok(entry)
}

/// The recipient argument, or the configured default when omitted.
pub fn resolve_recipient(arg: Option<String>, defaults: &DefaultsConfig) -> Result<String> {
    let value = arg
        .unwrap_or_else(|| defaults.recipient.clone())
        .trim()
        .to_string();
    if value.is_empty() {
        bail!("no recipient given and [defaults].recipient is empty");
    }
    validate_recipient(&value)?;
    Ok(value)
}

/// The message argument, or the configured default when omitted.
pub fn resolve_message(arg: Option<String>, defaults: &DefaultsConfig) -> Result<String> {
    let value = arg
        .unwrap_or_else(|| defaults.message.clone())
        .trim()
        .to_string();
    if value.is_empty() {
        bail!("message cannot be empty");
    }
    Ok(value)
}

// `+` followed by 8 to 15 digits (E.164 shape). Stricter per-country rules
// are the gateway's business.
fn validate_recipient(value: &str) -> Result<()> {
    let digits = value
        .strip_prefix('+')
        .ok_or_else(|| anyhow!("recipient must start with '+'"))?;
    if !(8..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        bail!("recipient must be '+' followed by 8 to 15 digits");
    }
    Ok(())
}

fn parse_time(value: &str) -> Result<(u32, u32)> {
    let t = NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| anyhow!("time must be HH:MM"))?;
    Ok((t.hour(), t.minute()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RecadoConfig {
        let mut cfg = RecadoConfig::default();
        cfg.defaults.recipient = "+56911112222".to_string();
        cfg.defaults.message = "Despierta, bro!".to_string();
        cfg
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(8, 59, 30)
            .unwrap()
    }

    #[test]
    fn explicit_arguments_build_a_future_entry() {
        let entry = build_entry(
            &config(),
            Some("+56933334444".to_string()),
            Some("hola".to_string()),
            "2025-06-01",
            Some("09:00".to_string()),
            now(),
        )
        .unwrap();

        assert_eq!(entry.recipient, "+56933334444");
        assert_eq!(entry.body, "hola");
        assert_eq!((entry.year, entry.month, entry.day), (2025, 6, 1));
        assert_eq!((entry.hour, entry.minute), (9, 0));
        assert!(entry.active);
    }

    #[test]
    fn omitted_recipient_and_message_fall_back_to_defaults() {
        let entry = build_entry(
            &config(),
            None,
            None,
            "2025-06-02",
            Some("05:00".to_string()),
            now(),
        )
        .unwrap();
        assert_eq!(entry.recipient, "+56911112222");
        assert_eq!(entry.body, "Despierta, bro!");
    }

    #[test]
    fn omitted_time_uses_the_default_slot() {
        let entry = build_entry(&config(), None, None, "2025-06-02", None, now()).unwrap();
        assert_eq!((entry.hour, entry.minute), (5, 0));
    }

    #[test]
    fn empty_default_recipient_is_an_error() {
        let mut cfg = config();
        cfg.defaults.recipient = String::new();
        let err = build_entry(&cfg, None, None, "2025-06-02", None, now()).unwrap_err();
        assert!(err.to_string().contains("recipient"));
    }

    #[test]
    fn past_and_same_minute_moments_are_rejected() {
        // One minute in the past.
        assert!(build_entry(
            &config(),
            None,
            None,
            "2025-06-01",
            Some("08:58".to_string()),
            now(),
        )
        .is_err());

        // Same minute: target 08:59:00 is not after 08:59:30.
        let err = build_entry(
            &config(),
            None,
            None,
            "2025-06-01",
            Some("08:59".to_string()),
            now(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("future"));

        // Next minute is fine.
        assert!(build_entry(
            &config(),
            None,
            None,
            "2025-06-01",
            Some("09:00".to_string()),
            now(),
        )
        .is_ok());
    }

    #[test]
    fn malformed_date_and_time_are_rejected() {
        assert!(build_entry(&config(), None, None, "01-06-2025", None, now()).is_err());
        assert!(build_entry(&config(), None, None, "2025-02-30", None, now()).is_err());
        assert!(build_entry(
            &config(),
            None,
            None,
            "2025-06-02",
            Some("25:00".to_string()),
            now(),
        )
        .is_err());
    }

    #[test]
    fn recipient_shape_is_enforced() {
        let defaults = config().defaults;
        assert!(resolve_recipient(Some("+56911112222".to_string()), &defaults).is_ok());
        assert!(resolve_recipient(Some("56911112222".to_string()), &defaults).is_err());
        assert!(resolve_recipient(Some("+569abc1222".to_string()), &defaults).is_err());
        assert!(resolve_recipient(Some("+123".to_string()), &defaults).is_err());
    }
}
