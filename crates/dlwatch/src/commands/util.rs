//! Shared helpers for command handlers.

use std::fmt::Display;
use std::io::IsTerminal;
use std::str::FromStr;

use strum::IntoEnumIterator;

use dlwatch_core::ALL_ADAPTERS;

use crate::error::CliError;

/// Parse a unit or action name, listing the accepted spellings on failure.
pub fn parse_choice<T>(kind: &'static str, raw: &str) -> Result<T, CliError>
where
    T: FromStr + IntoEnumIterator + Display,
{
    raw.trim().parse::<T>().map_err(|_| CliError::UnknownValue {
        kind,
        value: raw.to_owned(),
        expected: T::iter()
            .map(|choice| choice.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Parse a duration given as whole seconds (`"90"`) or in humantime
/// form (`"5m"`, `"1h 30m"`).
pub fn parse_duration_secs(raw: &str) -> Result<u64, CliError> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(raw)
        .map(|duration| duration.as_secs())
        .map_err(|e| CliError::Validation {
            field: "duration".into(),
            reason: format!("'{raw}' is neither seconds nor a duration like 5m: {e}"),
        })
}

/// Check a requested adapter against the available ones.
pub fn ensure_adapter(requested: Option<&str>, available: &[String]) -> Result<(), CliError> {
    match requested {
        Some(name) if name != ALL_ADAPTERS && !available.iter().any(|a| a == name) => {
            Err(CliError::AdapterNotFound { name: name.into() })
        }
        _ => Ok(()),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use dlwatch_core::{PowerAction, SizeUnit};

    use super::*;

    #[test]
    fn choices_parse_or_list_alternatives() {
        assert_eq!(
            parse_choice::<SizeUnit>("size unit", " tb ").ok(),
            Some(SizeUnit::Terabytes)
        );
        match parse_choice::<PowerAction>("power action", "explode") {
            Err(CliError::UnknownValue { expected, .. }) => {
                assert_eq!(expected, "Shutdown, Restart, Hibernate, Sleep");
            }
            other => panic!("expected UnknownValue, got {other:?}"),
        }
    }

    #[test]
    fn durations_accept_seconds_and_humantime() {
        assert_eq!(parse_duration_secs("90").ok(), Some(90));
        assert_eq!(parse_duration_secs("5m").ok(), Some(300));
        assert_eq!(parse_duration_secs("1h 30m").ok(), Some(5_400));
        assert!(parse_duration_secs("soonish").is_err());
    }

    #[test]
    fn adapters_must_exist_unless_all() {
        let available = vec![ALL_ADAPTERS.to_owned(), "eth0".to_owned()];
        assert!(ensure_adapter(None, &available).is_ok());
        assert!(ensure_adapter(Some("eth0"), &available).is_ok());
        assert!(ensure_adapter(Some(ALL_ADAPTERS), &available).is_ok());
        assert!(matches!(
            ensure_adapter(Some("wlan9"), &available),
            Err(CliError::AdapterNotFound { .. })
        ));
    }
}
