//! Download rate limit parsing

/// Parse a rate limit string to bytes per second.
///
/// Accepts the engine's short form (`5M`, `500K`, `1.5G`, binary multiples)
/// as well as explicit units (`2MiB/s`, `500KB/s`).
pub fn parse_rate_limit(rate: &str) -> Option<u64> {
    let rate = rate.trim().to_uppercase();
    if rate.is_empty() {
        return None;
    }

    let rate = rate.trim_end_matches("/S");

    let mut number_end = 0;
    for (i, c) in rate.char_indices() {
        if c.is_ascii_digit() || c == '.' {
            number_end = i + 1;
        } else {
            break;
        }
    }

    if number_end == 0 {
        return None;
    }

    let number: f64 = rate[..number_end].parse().ok()?;
    if number <= 0.0 {
        return None;
    }

    let multiplier: u64 = match rate[number_end..].trim() {
        "B" | "" => 1,
        "K" | "KIB" => 1024,
        "KB" => 1000,
        "M" | "MIB" => 1024 * 1024,
        "MB" => 1000 * 1000,
        "G" | "GIB" => 1024 * 1024 * 1024,
        "GB" => 1000 * 1000 * 1000,
        _ => return None,
    };

    Some((number * multiplier as f64) as u64)
}

/// Format bytes per second as a human-readable string
pub fn format_rate(bytes_per_second: u64) -> String {
    const UNITS: &[&str] = &["B/s", "KiB/s", "MiB/s", "GiB/s"];

    let mut value = bytes_per_second as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes_per_second, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
