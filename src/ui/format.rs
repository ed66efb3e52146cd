use chrono::NaiveDateTime;

/// Shown wherever a statistic is undefined (e.g. the selection is empty).
pub const NOT_AVAILABLE: &str = "N/A";

/// `1234567` → `"1,234,567"`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_mean(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_temperature(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.1}°C"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_date_range(first: Option<NaiveDateTime>, last: Option<NaiveDateTime>) -> String {
    match (first, last) {
        (Some(a), Some(b)) => format!("{} to {}", a.date(), b.date()),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Two-decimal heatmap annotation.
pub fn format_correlation(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.2}")
    }
}
