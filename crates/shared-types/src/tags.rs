//! # Timestamp Tags
//!
//! `YYYY-MM-DD_HH:MM[__XXXX]` tags name tasks and, with a version prefix,
//! chunked messages. This module is the single parser for them.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::TypesError;

/// chrono format of the timestamp part.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M";

/// Byte length of the timestamp part.
pub const TIMESTAMP_LEN: usize = 16;

const SUFFIX_SEPARATOR: &str = "__";
const SUFFIX_MIN: usize = 2;
const SUFFIX_MAX: usize = 4;

/// A minute-resolution timestamp with an optional short disambiguating suffix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimestampTag {
    /// Minute the tag was issued.
    pub timestamp: NaiveDateTime,
    /// 2-4 uppercase alphanumeric characters.
    pub suffix: Option<String>,
}

impl TimestampTag {
    /// Create a tag, validating the suffix shape.
    pub fn new(timestamp: NaiveDateTime, suffix: Option<String>) -> Result<Self, TypesError> {
        if let Some(s) = &suffix {
            if !is_valid_suffix(s) {
                return Err(TypesError::InvalidTag(format!("bad suffix {:?}", s)));
            }
        }
        Ok(Self { timestamp, suffix })
    }

    /// Parse a tag at the start of `input`, returning it and the unparsed rest.
    ///
    /// Returns `None` when `input` does not start with a well-formed tag.
    pub fn parse_prefix(input: &str) -> Option<(Self, &str)> {
        let stamp = input.get(..TIMESTAMP_LEN)?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
        let rest = &input[TIMESTAMP_LEN..];

        let Some(after_sep) = rest.strip_prefix(SUFFIX_SEPARATOR) else {
            return Some((Self { timestamp, suffix: None }, rest));
        };

        let suffix_len = after_sep
            .bytes()
            .take(SUFFIX_MAX)
            .take_while(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
            .count();
        if suffix_len < SUFFIX_MIN {
            // `__` not followed by a suffix belongs to whatever comes next.
            return Some((Self { timestamp, suffix: None }, rest));
        }

        let suffix = after_sep[..suffix_len].to_string();
        Some((
            Self {
                timestamp,
                suffix: Some(suffix),
            },
            &after_sep[suffix_len..],
        ))
    }

    /// Parse a string that must consist of exactly one tag.
    pub fn parse_exact(input: &str) -> Option<Self> {
        match Self::parse_prefix(input) {
            Some((tag, "")) => Some(tag),
            _ => None,
        }
    }
}

impl fmt::Display for TimestampTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.timestamp.format(TIMESTAMP_FORMAT))?;
        if let Some(suffix) = &self.suffix {
            write!(f, "{}{}", SUFFIX_SEPARATOR, suffix)?;
        }
        Ok(())
    }
}

fn is_valid_suffix(s: &str) -> bool {
    (SUFFIX_MIN..=SUFFIX_MAX).contains(&s.len())
        && s.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_with_suffix() {
        let tag = TimestampTag::parse_exact("2024-08-17_17:57__TO94").unwrap();
        assert_eq!(tag.suffix.as_deref(), Some("TO94"));
        assert_eq!(tag.to_string(), "2024-08-17_17:57__TO94");
    }

    #[test]
    fn test_parse_exact_without_suffix() {
        let tag = TimestampTag::parse_exact("2024-03-20_14:30").unwrap();
        assert!(tag.suffix.is_none());
    }

    #[test]
    fn test_parse_prefix_returns_rest() {
        let (tag, rest) = TimestampTag::parse_prefix("2024-08-17_17:57__AB#1/3|hi").unwrap();
        assert_eq!(tag.suffix.as_deref(), Some("AB"));
        assert_eq!(rest, "#1/3|hi");
    }

    #[test]
    fn test_rejects_bad_timestamps() {
        assert!(TimestampTag::parse_exact("2024-13-17_17:57").is_none());
        assert!(TimestampTag::parse_exact("2024-08-17 17:57").is_none());
        assert!(TimestampTag::parse_exact("short").is_none());
        assert!(TimestampTag::parse_exact("2024-08-17_17:57__toolong1").is_none());
    }

    #[test]
    fn test_new_validates_suffix() {
        let ts = NaiveDateTime::parse_from_str("2024-08-17_17:57", TIMESTAMP_FORMAT).unwrap();
        assert!(TimestampTag::new(ts, Some("ab".to_string())).is_err());
        assert!(TimestampTag::new(ts, Some("A".to_string())).is_err());
        assert!(TimestampTag::new(ts, Some("AB12".to_string())).is_ok());
    }

    #[test]
    fn test_ordering_by_time_then_suffix() {
        let a = TimestampTag::parse_exact("2024-08-17_17:57__AA11").unwrap();
        let b = TimestampTag::parse_exact("2024-08-17_17:57__BB11").unwrap();
        let c = TimestampTag::parse_exact("2024-08-17_17:58").unwrap();
        assert!(a < b);
        assert!(b < c);
    }
}
