// src/utils/format.rs
//! Display helpers shared by notifications, the prompt and the dashboard.

const EM_DASH: &str = "\u{2014}";

/// `$1,234.56`. Always unsigned; callers pick the sign.
pub fn dollars(value: f64, decimals: usize) -> String {
    format!("${}", group_thousands(value.abs(), decimals))
}

/// `+$1,234.56` / `-$1,234.56`
pub fn signed_dollars(value: f64, decimals: usize) -> String {
    let sign = if value >= 0.0 { "+" } else { "-" };
    format!("{}{}", sign, dollars(value, decimals))
}

/// Dollar amount or an em-dash when the level is absent.
pub fn dollars_or_dash(value: Option<f64>) -> String {
    match value {
        Some(v) => dollars(v, 2),
        None => EM_DASH.to_string(),
    }
}

/// `$4.58T`, `$968.00B`, `$105M`
pub fn market_cap(value: f64) -> String {
    if value >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else {
        format!("${:.0}M", value / 1e6)
    }
}

/// `33.7M`, `512K`
pub fn volume(value: u64) -> String {
    let v = value as f64;
    if v >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else {
        format!("{:.0}K", v / 1e3)
    }
}

/// `+1.23%` / `-0.25%`
pub fn percent(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, value)
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}
