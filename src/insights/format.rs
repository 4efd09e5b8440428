/// `$1.23b`, `$4.50m`, `$7.00k` or `$12.00`.
pub fn format_usd(value: f64) -> String {
    if value >= 1e9 {
        format!("${:.2}b", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}m", value / 1e6)
    } else if value >= 1e3 {
        format!("${:.2}k", value / 1e3)
    } else {
        format!("${value:.2}")
    }
}

/// `+1.23%` / `-0.50%`.
pub fn format_change(change: f64) -> String {
    let sign = if change >= 0.0 { "+" } else { "" };
    format!("{sign}{change:.2}%")
}
