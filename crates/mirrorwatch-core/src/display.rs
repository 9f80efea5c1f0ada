//! Duration text shared by the dashboard and the CLI.

/// Seconds rounded to two decimals, e.g. `15s`, `2.5s`.
pub fn fmt_secs(secs: f64) -> String {
    let rounded = (secs * 100.0).round() / 100.0;
    format!("{rounded}s")
}

/// Total duration field: `-` until the backend reports one.
pub fn fmt_total(secs: Option<f64>) -> String {
    secs.map_or_else(|| "-".into(), fmt_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_seconds() {
        assert_eq!(fmt_secs(15.0), "15s");
        assert_eq!(fmt_secs(2.5), "2.5s");
        assert_eq!(fmt_secs(0.1 + 0.2), "0.3s");
        assert_eq!(fmt_secs(0.0), "0s");
    }

    #[test]
    fn missing_total_is_placeholder() {
        assert_eq!(fmt_total(None), "-");
        assert_eq!(fmt_total(Some(42.0)), "42s");
    }
}
