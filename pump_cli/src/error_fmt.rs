//! Human-readable error descriptions and structured JSON error formatting.

use pump_core::error::{BuildError, MonitorError};

/// Context marker for failures while loading or validating configuration.
#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid configuration: {}", self.0)
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::InvalidInput { field, raw } => format!(
                "What happened: {raw:?} is not a valid {field} value; the current reading was kept.\nHow to fix: Enter a finite decimal number, e.g. `{field} 2.5`."
            ),
            MonitorError::UnknownField(name) => format!(
                "What happened: Unknown field {name:?}.\nHow to fix: Edit either `head` or `flow`, e.g. `head 5.4`."
            ),
            MonitorError::Source(msg) => format!(
                "What happened: The point source failed ({msg}).\nLikely causes: Telemetry feed closed or sensor offline.\nHow to fix: Check the feed, then restart the session."
            ),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::DuplicateHeadBand(_)
            | BuildError::InvertedRange { .. }
            | BuildError::ZeroHeadBand
            | BuildError::NonFiniteBound(_) => format!(
                "What happened: The envelope table is invalid ({be}).\nLikely causes: A malformed row in [envelope] bands or the envelope CSV.\nHow to fix: Give every head band >= 1 exactly one row with min_flow <= max_flow."
            ),
            BuildError::MissingEnvelope | BuildError::MissingSource => format!(
                "What happened: The monitoring session is incomplete ({be}).\nHow to fix: Provide both an envelope table and a point source."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<ConfigError>() {
        let cause = err
            .chain()
            .nth(1)
            .map(|c| format!(" Cause: {c}"))
            .unwrap_or_default();
        return format!(
            "What happened: Configuration is invalid or unreadable ({}).{cause}\nHow to fix: Edit the TOML or CSV and try again; run `pump self-check` to validate.",
            ce.0
        );
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    // CSV header special-case
    if lower.contains("csv must have headers") {
        return format!("Invalid headers in table CSV. {msg}");
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 configuration, 3 invalid input, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<ConfigError>().is_some() || err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    match err.downcast_ref::<MonitorError>() {
        Some(MonitorError::InvalidInput { .. } | MonitorError::UnknownField(_)) => 3,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::InvalidInput { .. } => "InvalidInput",
            MonitorError::UnknownField(_) => "UnknownField",
            MonitorError::Source(_) => "SourceFailed",
        };
    }
    if err.downcast_ref::<ConfigError>().is_some() || err.downcast_ref::<BuildError>().is_some() {
        return "ConfigurationError";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({ "reason": reason_name(err), "message": humanize(err) });
    if let Some(MonitorError::InvalidInput { field, raw }) = err.downcast_ref::<MonitorError>() {
        obj["details"] = json!({ "field": field.as_str(), "raw": raw });
    }
    obj.to_string()
}
