//! Cell formatting
//!
//! Compact number formatting for table cells:
//!
//! | value               | `format_usd`   | `format_count` | `format_percent` |
//! |---------------------|----------------|----------------|------------------|
//! | 1_234.56789         | `$1,234.5679`  | `1.23K`        | `1.2k%`          |
//! | 12_345              | `$12.3K`       | `12.35K`       | `12.3k%`         |
//! | 2_500_000_000       | `$2.50B`       | `2.50B`        | `2.5b%`          |
//! | NaN / ±inf          | `-`            | `-`            | `-`              |

use chrono::{DateTime, Utc};

/// Abbreviation steps, largest first
const ABBREVIATIONS: [(f64, &str); 4] = [(1e12, "t"), (1e9, "b"), (1e6, "m"), (1e3, "k")];

/// Format a USD amount.
///
/// Values ≥ 1e9 use a 2-decimal abbreviated suffix, values ≥ 1e4 a 1-decimal
/// suffix, anything smaller is printed with thousands separators and 4 decimals.
pub fn format_usd(n: f64) -> String {
    if !n.is_finite() {
        return "-".to_string();
    }
    if n >= 1_000_000_000.0 {
        return format!("${}", abbreviate(n, 2).to_uppercase());
    }
    if n >= 10_000.0 {
        return format!("${}", abbreviate(n, 1).to_uppercase());
    }
    format!("${}", with_separators(n, 4))
}

/// Format a count (transactions, holders).
///
/// Values ≥ 1000 use a 2-decimal abbreviated suffix, otherwise a
/// thousands-separated integer.
pub fn format_count(n: f64) -> String {
    if !n.is_finite() {
        return "-".to_string();
    }
    if n >= 1_000.0 {
        return abbreviate(n, 2).to_uppercase();
    }
    with_separators(n, 0)
}

/// Format a percentage change with one decimal and a lowercase suffix
pub fn format_percent(n: f64) -> String {
    if !n.is_finite() {
        return "-".to_string();
    }
    format!("{}%", abbreviate(n, 1))
}

/// Format the age of something created at `created` as seen at `now`.
///
/// Uses the largest whole unit: `45s`, `12m`, `5h`, `3d`. Future timestamps
/// count as zero.
pub fn format_age(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - created).num_seconds().max(0);
    match secs {
        s if s < 60 => format!("{}s", s),
        s if s < 3_600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3_600),
        s => format!("{}d", s / 86_400),
    }
}

/// Abbreviate with a k/m/b/t suffix and a fixed number of decimals.
///
/// A value whose rounded mantissa reaches 1000 moves up to the next suffix,
/// so 999_999 becomes `1.0m` rather than `1000.0k`.
fn abbreviate(n: f64, decimals: usize) -> String {
    let abs = n.abs();

    let mut step = ABBREVIATIONS.iter().position(|(base, _)| abs >= *base);
    let mut mantissa = match step {
        Some(i) => round_half_up(abs / ABBREVIATIONS[i].0, decimals),
        None => round_half_up(abs, decimals),
    };

    if mantissa >= 1_000.0 {
        let next = match step {
            Some(0) => None,
            Some(i) => Some(i - 1),
            None => Some(ABBREVIATIONS.len() - 1),
        };
        if let Some(i) = next {
            step = Some(i);
            mantissa = round_half_up(abs / ABBREVIATIONS[i].0, decimals);
        }
    }

    let suffix = step.map(|i| ABBREVIATIONS[i].1).unwrap_or("");
    let sign = if n < 0.0 && mantissa != 0.0 { "-" } else { "" };
    format!("{}{:.*}{}", sign, decimals, mantissa, suffix)
}

/// Format with comma thousands separators and a fixed number of decimals
fn with_separators(n: f64, decimals: usize) -> String {
    let rounded = round_half_up(n.abs(), decimals);
    let formatted = format!("{:.*}", decimals, rounded);

    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if n < 0.0 && rounded != 0.0 { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Round half away from zero at the given number of decimals
fn round_half_up(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
