/// Parse one table cell into a number, tolerating the locale formatting
/// that survives extraction: thousands-separator commas, ordinary and
/// non-breaking spaces, and accounting-style parentheses for negatives.
/// Anything unparseable is simply absent, never an error.
pub fn clean_number(value: &str) -> Option<f64> {
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        return None;
    }

    let mut cleaned: String = value
        .chars()
        .filter(|c| *c != ' ' && *c != '\u{a0}' && *c != ',')
        .collect();

    if cleaned.starts_with('(') && cleaned.ends_with(')') {
        cleaned = format!("-{}", &cleaned[1..cleaned.len() - 1]);
    }

    // f64::from_str happily accepts "inf" and "NaN"; a percentage cell
    // holding either is absent, not a value.
    cleaned.parse().ok().filter(|v: &f64| v.is_finite())
}
