//! Parse-or-default helpers for user supplied values
//!
//! Numeric input that fails to parse is coerced to zero instead of being
//! rejected. These helpers are applied once, where values enter the store
//! (CLI arguments and CSV cells); the calculator and aggregator only ever see
//! `f64` and `bool`.

/// Parse a float, falling back to 0.0 for empty, malformed or non-finite input
pub fn parse_f64(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            tracing::warn!(value = trimmed, "malformed numeric input coerced to 0");
            0.0
        }
    }
}

/// Parse an optional float cell; `None` and blank cells become 0.0
pub fn parse_f64_opt(raw: Option<&str>) -> f64 {
    raw.map(parse_f64).unwrap_or(0.0)
}

/// Parse a boolean flag
///
/// Accepts `true`, `yes`, `y`, `on` (any case) and any non-zero number as
/// true. Everything else, including blank input, is false.
pub fn parse_bool(raw: &str) -> bool {
    let trimmed = raw.trim().to_lowercase();
    match trimmed.as_str() {
        "true" | "yes" | "y" | "on" => true,
        "" | "false" | "no" | "n" | "off" => false,
        other => other.parse::<f64>().map(|v| v != 0.0).unwrap_or(false),
    }
}
