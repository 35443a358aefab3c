// ABOUTME: Strict duration strings for health polling: <digits><ms|s|m>.
// ABOUTME: Rejects everything else, including whitespace, fractions and other units.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseDurationError {
    #[error("bad duration '{0}': expected <digits><ms|s|m>, e.g. 2s, 100ms, 1m")]
    Format(String),

    #[error("duration '{0}' is too large")]
    Overflow(String),
}

pub fn parse_duration(input: &str) -> Result<Duration, ParseDurationError> {
    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| ParseDurationError::Format(input.to_string()))?;
    let (digits, unit) = input.split_at(split);

    if digits.is_empty() {
        return Err(ParseDurationError::Format(input.to_string()));
    }

    let multiplier: u64 = match unit {
        "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        _ => return Err(ParseDurationError::Format(input.to_string())),
    };

    let n: u64 = digits
        .parse()
        .map_err(|_| ParseDurationError::Overflow(input.to_string()))?;
    let millis = n
        .checked_mul(multiplier)
        .ok_or_else(|| ParseDurationError::Overflow(input.to_string()))?;

    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_unit() {
        assert_eq!(parse_duration("2s").unwrap().as_millis(), 2_000);
        assert_eq!(parse_duration("45s").unwrap().as_millis(), 45_000);
        assert_eq!(parse_duration("100ms").unwrap().as_millis(), 100);
        assert_eq!(parse_duration("1m").unwrap().as_millis(), 60_000);
        assert_eq!(parse_duration("0ms").unwrap(), Duration::ZERO);
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in [
            "", "s", "ms", "10", "1h", "1.5s", " 2s", "2s ", "2 s", "-1s", "2S", "2sec", "1m30s",
        ] {
            assert_eq!(
                parse_duration(bad),
                Err(ParseDurationError::Format(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!(matches!(
            parse_duration("99999999999999999999s"),
            Err(ParseDurationError::Overflow(_))
        ));
        assert!(matches!(
            parse_duration("18446744073709551615m"),
            Err(ParseDurationError::Overflow(_))
        ));
    }
}
