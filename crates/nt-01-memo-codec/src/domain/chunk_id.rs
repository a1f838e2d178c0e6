//! # Chunk Identifiers
//!
//! Parser and formatter for the chunk header carried at the front of every
//! chunk's memo data:
//!
//! ```text
//! v<version>.<YYYY-MM-DD_HH:MM>[__<suffix>]#<index>/<total>|<piece>
//! ```
//!
//! `index` is 1-based and `index <= total`. The identifier is shared by all
//! chunks of one logical message.

use std::fmt;

use chrono::{DateTime, Timelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared_types::TimestampTag;

use super::errors::ChunkParseError;

const VERSION_PREFIX: char = 'v';
const VERSION_SEPARATOR: char = '.';
const POSITION_MARKER: char = '#';
const TOTAL_SEPARATOR: char = '/';
const PIECE_SEPARATOR: char = '|';

/// Versioned tag naming one chunked message.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkIdentifier {
    /// Wire format version.
    pub version: u16,
    /// Issue time plus shard suffix.
    pub tag: TimestampTag,
}

impl ChunkIdentifier {
    /// Create an identifier from its parts.
    pub fn new(version: u16, tag: TimestampTag) -> Self {
        Self { version, tag }
    }

    /// Generate a fresh identifier for `now`: minute resolution plus a random
    /// suffix of two uppercase letters and two digits.
    pub fn generate<R: Rng + ?Sized>(version: u16, now: DateTime<Utc>, rng: &mut R) -> Self {
        let letters: String = (0..2).map(|_| rng.gen_range(b'A'..=b'Z') as char).collect();
        let digits: String = (0..2).map(|_| rng.gen_range(b'0'..=b'9') as char).collect();
        let naive = now.naive_utc();
        let minute = naive
            .date()
            .and_hms_opt(naive.hour(), naive.minute(), 0)
            .unwrap_or(naive);
        Self {
            version,
            tag: TimestampTag {
                timestamp: minute,
                suffix: Some(format!("{}{}", letters, digits)),
            },
        }
    }

    /// Parse an identifier at the start of `input`, returning the rest.
    pub fn parse_prefix(input: &str) -> Option<(Self, &str)> {
        let rest = input.strip_prefix(VERSION_PREFIX)?;
        let (version_text, rest) = rest.split_once(VERSION_SEPARATOR)?;
        if version_text.is_empty() || !version_text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let version = version_text.parse().ok()?;
        let (tag, rest) = TimestampTag::parse_prefix(rest)?;
        Some((Self { version, tag }, rest))
    }
}

impl fmt::Display for ChunkIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", VERSION_PREFIX, self.version, VERSION_SEPARATOR, self.tag)
    }
}

/// Identifier plus position of one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkHeader {
    /// Message identifier.
    pub identifier: ChunkIdentifier,
    /// 1-based position.
    pub index: u32,
    /// Number of chunks in the message.
    pub total: u32,
}

impl ChunkHeader {
    /// Header text without the trailing piece separator.
    pub fn render(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.identifier, POSITION_MARKER, self.index, TOTAL_SEPARATOR, self.total
        )
    }

    /// Full memo data for a piece under this header.
    pub fn frame(&self, piece: &str) -> String {
        format!("{}{}{}", self.render(), PIECE_SEPARATOR, piece)
    }

    /// Worst-case header length (including the piece separator) for a
    /// message of `total_digits`-digit chunk count.
    pub(crate) fn framing_len(identifier_len: usize, total_digits: usize) -> usize {
        // '#' + index + '/' + total + '|'
        identifier_len + 3 + 2 * total_digits
    }
}

/// Result of inspecting one memo's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkParse<'a> {
    /// Data does not start with a chunk identifier.
    NotAChunk,
    /// Identifier present but the rest of the header is unusable.
    Malformed(ChunkParseError),
    /// A well-formed chunk.
    Chunk {
        /// Parsed header.
        header: ChunkHeader,
        /// Payload piece after the header.
        piece: &'a str,
    },
}

/// Inspect memo data for a chunk header.
pub fn parse_chunk(data: &str) -> ChunkParse<'_> {
    let Some((identifier, rest)) = ChunkIdentifier::parse_prefix(data) else {
        return ChunkParse::NotAChunk;
    };

    let Some(rest) = rest.strip_prefix(POSITION_MARKER) else {
        return ChunkParse::Malformed(ChunkParseError::MissingPosition);
    };
    let Some((position, piece)) = rest.split_once(PIECE_SEPARATOR) else {
        return ChunkParse::Malformed(ChunkParseError::MissingPosition);
    };
    let Some((index_text, total_text)) = position.split_once(TOTAL_SEPARATOR) else {
        return ChunkParse::Malformed(ChunkParseError::MissingPosition);
    };

    let (Ok(index), Ok(total)) = (index_text.parse::<u32>(), total_text.parse::<u32>()) else {
        return ChunkParse::Malformed(ChunkParseError::BadPosition(position.to_string()));
    };
    if index == 0 || total == 0 || index > total {
        return ChunkParse::Malformed(ChunkParseError::BadPosition(position.to_string()));
    }

    ChunkParse::Chunk {
        header: ChunkHeader {
            identifier,
            index,
            total,
        },
        piece,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn identifier() -> ChunkIdentifier {
        ChunkIdentifier::new(1, TimestampTag::parse_exact("2024-08-17_17:57__TO94").unwrap())
    }

    #[test]
    fn test_identifier_display() {
        assert_eq!(identifier().to_string(), "v1.2024-08-17_17:57__TO94");
    }

    #[test]
    fn test_parse_chunk() {
        match parse_chunk("v1.2024-08-17_17:57__TO94#2/3|hello") {
            ChunkParse::Chunk { header, piece } => {
                assert_eq!(header.identifier, identifier());
                assert_eq!((header.index, header.total), (2, 3));
                assert_eq!(piece, "hello");
            }
            other => panic!("expected chunk, got {:?}", other),
        }
    }

    #[test]
    fn test_piece_may_contain_separators() {
        match parse_chunk("v1.2024-08-17_17:57#1/1|a|b#c/d") {
            ChunkParse::Chunk { header, piece } => {
                assert!(header.identifier.tag.suffix.is_none());
                assert_eq!(piece, "a|b#c/d");
            }
            other => panic!("expected chunk, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_text_is_not_a_chunk() {
        assert_eq!(parse_chunk("REQUEST_POST_FIAT ___ hi"), ChunkParse::NotAChunk);
        assert_eq!(parse_chunk("v1.notadate"), ChunkParse::NotAChunk);
        assert_eq!(parse_chunk(""), ChunkParse::NotAChunk);
    }

    #[test]
    fn test_bad_positions_are_malformed() {
        for data in [
            "v1.2024-08-17_17:57__TO94|x",
            "v1.2024-08-17_17:57__TO94#0/3|x",
            "v1.2024-08-17_17:57__TO94#4/3|x",
            "v1.2024-08-17_17:57__TO94#a/3|x",
        ] {
            assert!(
                matches!(parse_chunk(data), ChunkParse::Malformed(_)),
                "{} should be malformed",
                data
            );
        }
    }

    #[test]
    fn test_generate_truncates_to_minute() {
        let now = Utc.with_ymd_and_hms(2024, 8, 17, 17, 57, 42).unwrap();
        let id = ChunkIdentifier::generate(1, now, &mut rand::thread_rng());
        let text = id.to_string();
        assert!(text.starts_with("v1.2024-08-17_17:57__"));
        assert_eq!(ChunkIdentifier::parse_prefix(&text).unwrap().0, id);
    }
}
