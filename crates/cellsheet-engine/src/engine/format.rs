/// Display text for a formula cell without a value.
pub const ERROR_MARKER: &str = "ERROR";

/// Format a number for display: fixed point, one fractional digit.
/// Non-finite values are spelled `Infinity`, `-Infinity` and `NaN`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{:.1}", n)
    }
}

/// Format an optional value, falling back to [`ERROR_MARKER`].
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(n) => format_number(n),
        None => ERROR_MARKER.to_string(),
    }
}
