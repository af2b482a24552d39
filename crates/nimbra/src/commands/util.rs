//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::str::FromStr;

use uuid::Uuid;

use nimbra_core::params;
use nimbra_core::model::MIN_PASSPHRASE_LEN;
use nimbra_core::{CircuitType, SrtMode, SrtSettings};

use crate::cli::SrtArgs;
use crate::error::CliError;

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

pub fn parse_id(raw: &str) -> Result<Uuid, CliError> {
    let value = params::parse_script_value(raw);
    Uuid::parse_str(&value).map_err(|e| CliError::Validation {
        field: "reservation id".into(),
        reason: format!("'{value}': {e}"),
    })
}

pub fn parse_circuit_type(raw: &str) -> Result<CircuitType, CliError> {
    parse_enum("circuit type", raw)
}

/// Parse a strum-backed value from a plain or script-form argument.
pub fn parse_enum<T: FromStr>(field: &str, raw: &str) -> Result<T, CliError> {
    let value = params::parse_script_value(raw);
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("unknown value '{value}'"),
    })
}

/// Optional small integer (`-1` and empty mean unset).
pub fn parse_optional_u16(field: &str, raw: Option<&str>) -> Result<Option<u16>, CliError> {
    raw.and_then(params::parse_optional)
        .map(|value| {
            value.parse::<u16>().map_err(|_| CliError::Validation {
                field: field.into(),
                reason: format!("'{value}' is not a valid number"),
            })
        })
        .transpose()
}

/// SRT settings for SDI SRT circuits; `None` for every other type.
pub fn parse_srt(circuit_type: CircuitType, args: &SrtArgs) -> Result<Option<SrtSettings>, CliError> {
    if circuit_type != CircuitType::SdiSrt {
        return Ok(None);
    }
    let port = parse_optional_u16("port", args.port.as_deref())?.ok_or_else(|| {
        CliError::Validation {
            field: "port".into(),
            reason: "SDI SRT circuits need --port".into(),
        }
    })?;
    let mode: SrtMode = match args.mode.as_deref().and_then(params::parse_optional) {
        Some(mode) => parse_enum("mode", &mode)?,
        None => {
            return Err(CliError::Validation {
                field: "mode".into(),
                reason: "SDI SRT circuits need --mode".into(),
            });
        }
    };
    let passphrase = args.passphrase.as_deref().and_then(params::parse_optional);
    if passphrase
        .as_ref()
        .is_some_and(|p| p.chars().count() < MIN_PASSPHRASE_LEN)
    {
        return Err(CliError::Validation {
            field: "passphrase".into(),
            reason: format!("must be at least {MIN_PASSPHRASE_LEN} characters"),
        });
    }
    Ok(Some(SrtSettings {
        port,
        mode,
        passphrase,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn srt(port: Option<&str>, mode: Option<&str>, passphrase: Option<&str>) -> SrtArgs {
        SrtArgs {
            port: port.map(Into::into),
            mode: mode.map(Into::into),
            passphrase: passphrase.map(Into::into),
        }
    }

    #[test]
    fn circuit_type_accepts_script_form() {
        assert_eq!(parse_circuit_type(r#"["2"]"#).unwrap(), CircuitType::J2kHitless);
        assert_eq!(parse_circuit_type("E-Line VLAN").unwrap(), CircuitType::ElineVlan);
        assert!(parse_circuit_type("nope").is_err());
    }

    #[test]
    fn srt_settings_only_for_srt_type() {
        let args = srt(Some("9000"), Some("push"), None);
        assert!(parse_srt(CircuitType::J2k, &args).unwrap().is_none());

        let settings = parse_srt(CircuitType::SdiSrt, &args).unwrap().unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.mode, SrtMode::Push);
        assert_eq!(settings.passphrase, None);
    }

    #[test]
    fn srt_unset_passphrase_and_short_passphrase() {
        let unset = srt(Some("9000"), Some("Listener -> Caller"), Some("-1"));
        let settings = parse_srt(CircuitType::SdiSrt, &unset).unwrap().unwrap();
        assert_eq!(settings.mode, SrtMode::Pull);
        assert_eq!(settings.passphrase, None);

        let short = srt(Some("9000"), Some("pull"), Some("short"));
        assert!(parse_srt(CircuitType::SdiSrt, &short).is_err());
    }

    #[test]
    fn srt_requires_port_and_mode() {
        assert!(parse_srt(CircuitType::SdiSrt, &srt(None, Some("push"), None)).is_err());
        assert!(parse_srt(CircuitType::SdiSrt, &srt(Some("9000"), None, None)).is_err());
    }
}
