//! Display Formatting
//!
//! Durations, sizes and ranks as they appear in the Markdown tables.

/// Human-readable duration.
///
/// Below one second the plain form rounds to the nearest millisecond, the
/// same rounding the default 1 ms tie bands use, and prints "less than a ms"
/// when that is zero. `detailed` rounds to the microsecond instead and keeps
/// the microsecond remainder.
pub fn format_time(seconds: f64, detailed: bool) -> String {
    // NaN and negatives print as zero
    let seconds = seconds.max(0.0);

    if detailed {
        let total_us = (seconds * 1e6).round() as u64;
        if total_us < 1_000_000 {
            let ms = total_us / 1000;
            let remainder_us = total_us % 1000;
            return match (ms, remainder_us) {
                (0, us) => format!("{us}us"),
                (ms, 0) => format!("{ms}ms"),
                (ms, us) => format!("{ms}ms {us}us"),
            };
        }
    } else {
        let total_ms = (seconds * 1e3).round() as u64;
        if total_ms == 0 {
            return "less than a ms".to_string();
        }
        if total_ms < 1000 {
            return format!("{total_ms}ms");
        }
    }

    if seconds < 3600.0 {
        let total_ms = (seconds * 1000.0).round() as u64;
        let minutes = total_ms / 60_000;
        let sec = (total_ms / 1000) % 60;
        let ms = total_ms % 1000;
        return if minutes == 0 {
            format!("{sec}s {ms}ms")
        } else {
            format!("{minutes}min {sec}s {ms}ms")
        };
    }

    let total_s = seconds.floor() as u64;
    let hr = total_s / 3600;
    let minutes = (total_s % 3600) / 60;
    let sec = total_s % 60;
    format!("{hr}hr {minutes}min {sec}s")
}

/// `format_time` for a nanosecond value
pub fn format_nanos(nanos: f64, detailed: bool) -> String {
    format_time(nanos / 1e9, detailed)
}

/// Thousands separators from 10,000 up
pub fn format_size(size: usize) -> String {
    let digits = size.to_string();
    if size < 10_000 {
        return digits;
    }

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 1st, 2nd, 3rd, 4th, 11th, 21st ...
pub fn ordinal(n: usize) -> String {
    let suffix = if (10..=20).contains(&(n % 100)) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{n}{suffix}")
}

/// GitHub-style heading anchor
pub fn anchor(title: &str) -> String {
    title
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c.to_ascii_lowercase())
            } else if c == ' ' {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}
