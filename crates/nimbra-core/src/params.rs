// ── Script parameter parsing ──
//
// Workflow engines hand parameters over in their script form: a JSON-ish
// list such as `["2026-03-01T10:00:00Z"]`. Plain values are accepted too.
// `-1` is the conventional "not set" marker for optional values.

use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::model::parse_time;

/// Marker used by callers for an unset optional parameter.
pub const UNSET: &str = "-1";

/// Strip list brackets and quotes and keep the first element.
pub fn parse_script_value(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '[' | ']' | '"')).collect();
    cleaned
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_owned()
}

/// Optional string parameter: empty or `-1` is `None`.
pub fn parse_optional(raw: &str) -> Option<String> {
    let value = parse_script_value(raw);
    (!value.is_empty() && value != UNSET).then_some(value)
}

/// Optional timestamp parameter in `yyyy-MM-ddTHH:mm:ssZ` form.
pub fn parse_time_param(name: &str, raw: &str) -> Result<Option<DateTime<Utc>>, CoreError> {
    parse_optional(raw)
        .map(|value| {
            parse_time(&value)
                .map_err(|e| CoreError::validation(format!("{name}: invalid time '{value}': {e}")))
        })
        .transpose()
}

/// Capacity in Mbps; must be a positive integer.
pub fn parse_capacity(raw: &str) -> Result<u32, CoreError> {
    let value = parse_script_value(raw);
    match value.parse::<u32>() {
        Ok(capacity) if capacity >= 1 => Ok(capacity),
        _ => Err(CoreError::validation(format!(
            "Capacity must be a positive integer, got '{value}'"
        ))),
    }
}

/// Mandatory string parameter.
pub fn parse_required(name: &str, raw: &str) -> Result<String, CoreError> {
    parse_optional(raw).ok_or_else(|| CoreError::validation(format!("{name} is required")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn script_form_is_unwrapped() {
        assert_eq!(parse_script_value(r#"["3_nodeA"]"#), "3_nodeA");
        assert_eq!(parse_script_value(r#"["a","b"]"#), "a");
        assert_eq!(parse_script_value("plain"), "plain");
        assert_eq!(parse_script_value(""), "");
    }

    #[test]
    fn minus_one_means_unset() {
        assert_eq!(parse_optional(r#"["-1"]"#), None);
        assert_eq!(parse_optional("-1"), None);
        assert_eq!(parse_optional("secret-pass").as_deref(), Some("secret-pass"));
        assert!(parse_time_param("Start Time", "-1").unwrap().is_none());
    }

    #[test]
    fn times_parse_in_utc() {
        let t = parse_time_param("End Time", r#"["2026-03-01T10:00:00Z"]"#)
            .unwrap()
            .unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap());
        assert!(parse_time_param("End Time", "03/01/2026").is_err());
    }

    #[test]
    fn capacity_must_be_positive() {
        assert_eq!(parse_capacity(r#"["5"]"#).unwrap(), 5);
        assert!(parse_capacity("0").is_err());
        assert!(parse_capacity("-3").is_err());
        assert!(parse_capacity("fast").is_err());
    }

    #[test]
    fn required_values_reject_unset() {
        assert!(parse_required("Source", "-1").is_err());
        assert_eq!(parse_required("Source", "1_nodeA").unwrap(), "1_nodeA");
    }
}
