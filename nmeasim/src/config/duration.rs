//! Human-readable duration parsing (e.g., "30s", "4m", "1h30m").

use std::time::Duration;

use thiserror::Error;

/// Error parsing a duration string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid duration '{input}' - expected format like '30s', '4m', '1h30m' or a number of seconds")]
pub struct DurationParseError {
    input: String,
}

impl DurationParseError {
    fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Parse a human-readable duration string.
///
/// Supports:
/// - Bare numbers (treated as seconds, decimals allowed)
/// - `s`, `m`, `h` unit suffixes, also chained (`1h30m`, `2m30s`)
/// - Case-insensitive
/// - Whitespace tolerant
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use nmeasim::config::parse_duration;
///
/// assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
/// assert_eq!(parse_duration("4m").unwrap(), Duration::from_secs(240));
/// assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
/// assert_eq!(parse_duration("90").unwrap(), Duration::from_secs(90));
/// assert_eq!(parse_duration("1.5m").unwrap(), Duration::from_secs(90));
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, DurationParseError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(DurationParseError::new(s));
    }

    if let Ok(secs) = trimmed.parse::<f64>() {
        return seconds(secs).ok_or_else(|| DurationParseError::new(s));
    }

    let compact: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let mut total = 0.0;
    let mut number = String::new();
    let mut last_unit_rank = usize::MAX;

    for c in compact.chars() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
            continue;
        }
        let (multiplier, rank) = match c {
            'h' => (3600.0, 2),
            'm' => (60.0, 1),
            's' => (1.0, 0),
            _ => return Err(DurationParseError::new(s)),
        };
        // Units must descend: "30s4m" is rejected
        if rank >= last_unit_rank || number.is_empty() {
            return Err(DurationParseError::new(s));
        }
        let value: f64 = number.parse().map_err(|_| DurationParseError::new(s))?;
        total += value * multiplier;
        last_unit_rank = rank;
        number.clear();
    }

    if !number.is_empty() {
        return Err(DurationParseError::new(s));
    }
    seconds(total).ok_or_else(|| DurationParseError::new(s))
}

fn seconds(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}

/// Format a duration in the compact form accepted by [`parse_duration`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use nmeasim::config::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(240)), "4m");
/// assert_eq!(format_duration(Duration::from_secs(5400)), "1h30m");
/// assert_eq!(format_duration(Duration::from_secs(45)), "45s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    if duration.subsec_nanos() != 0 {
        return format!("{}s", duration.as_secs_f64());
    }
    if total == 0 {
        return "0s".to_string();
    }

    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    let mut out = String::new();
    if h > 0 {
        out.push_str(&format!("{}h", h));
    }
    if m > 0 {
        out.push_str(&format!("{}m", m));
    }
    if s > 0 {
        out.push_str(&format!("{}s", s));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_number() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("0.5").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("15M").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
    }

    #[test]
    fn test_parse_compound() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("2m30s").unwrap(), Duration::from_secs(150));
        assert_eq!(parse_duration("1h 0m 5s").unwrap(), Duration::from_secs(3605));
    }

    #[test]
    fn test_parse_whitespace() {
        assert_eq!(parse_duration("  4m  ").unwrap(), Duration::from_secs(240));
        assert_eq!(parse_duration("4 m").unwrap(), Duration::from_secs(240));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("-1m").is_err());
        assert!(parse_duration("4d").is_err());
        assert!(parse_duration("30s4m").is_err());
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("4m30").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_secs(60)), "1m");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h1m1s");
    }

    #[test]
    fn test_duration_roundtrip() {
        for secs in [1, 59, 60, 61, 3599, 3600, 5400, 86400] {
            let d = Duration::from_secs(secs);
            assert_eq!(parse_duration(&format_duration(d)).unwrap(), d);
        }
    }
}
