// src/config/duration.rs

use std::time::Duration;

/// Parse a duration string like `"250ms"`, `"90s"`, `"2m"` or `"1h"`.
///
/// Used for catalog timeouts and for `--timeout` on the command line.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    if digits.is_empty() {
        return Err(format!("duration '{s}' must start with a number"));
    }
    let value: u64 = digits
        .parse()
        .map_err(|e| format!("duration '{s}': {e}"))?;

    let unit_millis: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "ms" => 1,
        "s" => 1_000,
        "m" | "min" => 60_000,
        "h" => 3_600_000,
        "" => return Err(format!("duration '{s}' needs a unit (ms, s, m or h)")),
        other => {
            return Err(format!(
                "unknown duration unit '{other}' in '{s}'; use ms, s, m or h"
            ));
        }
    };

    value
        .checked_mul(unit_millis)
        .map(Duration::from_millis)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}

/// Render a deadline the way a user would have typed it.
///
/// Whole minutes print as `"2 min"`, whole seconds as `"5s"`, anything else
/// in milliseconds.
pub fn format_duration(d: &Duration) -> String {
    let millis = d.as_millis();
    if millis % 1000 != 0 {
        return format!("{millis}ms");
    }
    let secs = d.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        format!("{} min", secs / 60)
    } else {
        format!("{secs}s")
    }
}

/// Elapsed time with one decimal, e.g. `"12.3s"`.
pub fn format_elapsed(d: Duration) -> String {
    format!("{:.1}s", d.as_secs_f64())
}
