//! Pattern record parsing and candidate filtering.
//!
//! Each shard line carries five tab-separated fields:
//!
//! ```text
//! hash \t specificity \t minLength \t requiredSubstring \t payload
//! ```
//!
//! The payload starts with a `<position>||` ordering marker that survives
//! until the emitter strips it.

use keys::{CandidateSet, ShardKey};
use thiserror::Error;
use tracing::warn;

const FIELD_COUNT: usize = 5;

/// Why a record line could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected 5 tab-separated fields, found {found}")]
    MissingFields { found: usize },
    #[error("specificity {0:?} is not an integer")]
    InvalidSpecificity(String),
    #[error("minimum length {0:?} is not an integer")]
    InvalidMinLength(String),
}

/// Parsed, borrowed view of one record line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternRecord<'a> {
    pub hash: &'a str,
    pub specificity: i64,
    pub min_length: i64,
    pub required_substring: &'a str,
    pub payload: &'a str,
}

impl<'a> PatternRecord<'a> {
    /// Split `line` into its five fields. The payload keeps any further tabs.
    pub fn parse(line: &'a str) -> Result<Self, RecordError> {
        let mut fields = line.splitn(FIELD_COUNT, '\t');
        let (Some(hash), Some(specificity), Some(min_length), Some(required), Some(payload)) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            return Err(RecordError::MissingFields {
                found: line.split('\t').count(),
            });
        };

        let specificity = specificity
            .trim()
            .parse::<i64>()
            .map_err(|_| RecordError::InvalidSpecificity(specificity.to_string()))?;
        let min_length = min_length
            .trim()
            .parse::<i64>()
            .map_err(|_| RecordError::InvalidMinLength(min_length.to_string()))?;

        Ok(Self {
            hash,
            specificity,
            min_length,
            required_substring: required,
            payload,
        })
    }
}

/// Records that survived filtering in one shard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredShard {
    /// `(specificity, payload)` pairs in stored order.
    pub entries: Vec<(i64, String)>,
    /// Lines skipped because they did not parse.
    pub malformed: usize,
}

impl PatternRecord<'_> {
    /// Whether the substring field constrains the identifier at all.
    ///
    /// A `"0"` field carries no requirement, the same as an empty one.
    pub fn has_required_substring(&self) -> bool {
        !matches!(self.required_substring, "" | "0")
    }
}

/// Discards records that cannot match the identifier.
///
/// A record survives when all of the following hold, checked cheapest first:
/// 1. `minLength <= len(identifier)`
/// 2. its hash is one of the identifier's candidates
/// 3. its required substring is absent (empty or `"0"`) or occurs byte-wise
///    in the identifier
pub struct RecordFilter<'a> {
    candidates: &'a CandidateSet,
    identifier: &'a [u8],
}

impl<'a> RecordFilter<'a> {
    pub fn new(candidates: &'a CandidateSet, identifier: &'a [u8]) -> Self {
        Self {
            candidates,
            identifier,
        }
    }

    pub fn accepts(&self, record: &PatternRecord<'_>) -> bool {
        let length = i64::try_from(self.identifier.len()).unwrap_or(i64::MAX);
        record.min_length <= length
            && self.candidates.contains(record.hash)
            && (!record.has_required_substring()
                || contains_bytes(self.identifier, record.required_substring.as_bytes()))
    }

    /// Parse and filter every line of one shard.
    ///
    /// Malformed lines are skipped individually with a warning.
    pub fn filter(&self, shard: &ShardKey, lines: &[String]) -> FilteredShard {
        let mut out = FilteredShard::default();
        for (index, line) in lines.iter().enumerate() {
            match PatternRecord::parse(line) {
                Ok(record) => {
                    if self.accepts(&record) {
                        out.entries
                            .push((record.specificity, record.payload.to_string()));
                    }
                }
                Err(err) => {
                    out.malformed += 1;
                    warn!(
                        shard = %shard,
                        line = index + 1,
                        reason = %err,
                        "malformed_pattern_record"
                    );
                }
            }
        }
        out
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty()
        || (needle.len() <= haystack.len()
            && haystack.windows(needle.len()).any(|window| window == needle))
}
