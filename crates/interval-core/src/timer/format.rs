//! Human-readable durations.
//!
//! Display follows the `00h 00m 00s` layout; input accepts plain seconds,
//! unit suffixes (`1h30m`, `45s`) or clock notation (`01:30`, `1:02:03`).

use crate::error::ValidationError;

/// Render seconds as `HHh MMm SSs`.
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}h {minutes:02}m {seconds:02}s")
}

/// Parse a duration into seconds.
pub fn parse_duration(input: &str) -> Result<u64, ValidationError> {
    let text = input.trim();
    let invalid = |message: &str| ValidationError::InvalidDuration {
        input: input.to_string(),
        message: message.to_string(),
    };

    if text.is_empty() {
        return Err(invalid("empty duration"));
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        return text.parse().map_err(|_| invalid("number too large"));
    }
    if text.contains(':') {
        return parse_clock(text).ok_or_else(|| invalid("expected MM:SS or HH:MM:SS"));
    }
    parse_units(text).ok_or_else(|| invalid("expected digits followed by h, m or s"))
}

fn parse_clock(text: &str) -> Option<u64> {
    let parts: Vec<&str> = text.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }
    let mut total = 0u64;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let value: u64 = part.parse().ok()?;
        // Leading field is unbounded; the rest are sexagesimal.
        if i > 0 && value >= 60 {
            return None;
        }
        total = total.checked_mul(60)?.checked_add(value)?;
    }
    Some(total)
}

fn parse_units(text: &str) -> Option<u64> {
    let mut total = 0u64;
    let mut digits = String::new();
    let mut last_rank = u8::MAX;

    for c in text.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let (scale, rank) = match c.to_ascii_lowercase() {
            'h' => (3600, 2),
            'm' => (60, 1),
            's' => (1, 0),
            _ => return None,
        };
        // Units must appear at most once, largest first.
        if digits.is_empty() || rank >= last_rank {
            return None;
        }
        last_rank = rank;
        let value: u64 = digits.parse().ok()?;
        total = total.checked_add(value.checked_mul(scale)?)?;
        digits.clear();
    }
    if !digits.is_empty() {
        return None;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_like_the_display() {
        assert_eq!(format_hms(0), "00h 00m 00s");
        assert_eq!(format_hms(100), "00h 01m 40s");
        assert_eq!(format_hms(3 * 3600 + 5), "03h 00m 05s");
        assert_eq!(format_hms(100 * 3600), "100h 00m 00s");
    }

    #[test]
    fn parses_plain_seconds() {
        assert_eq!(parse_duration("90").unwrap(), 90);
        assert_eq!(parse_duration(" 0 ").unwrap(), 0);
    }

    #[test]
    fn parses_units() {
        assert_eq!(parse_duration("1h30m").unwrap(), 5400);
        assert_eq!(parse_duration("2m15s").unwrap(), 135);
        assert_eq!(parse_duration("45S").unwrap(), 45);
    }

    #[test]
    fn parses_clock() {
        assert_eq!(parse_duration("01:30").unwrap(), 90);
        assert_eq!(parse_duration("1:02:03").unwrap(), 3723);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "abc", "1x", "10m5h", "5m5m", "1:60", "1::2", "1:2:3:4", "h"] {
            assert!(parse_duration(bad).is_err(), "accepted {bad:?}");
        }
    }
}
