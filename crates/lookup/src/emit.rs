//! Ordered, size-bounded emission of candidate units.
//!
//! Buckets are visited from highest to lowest specificity. Payloads are
//! split on tabs into entries, and inside a bucket entries are sorted
//! naturally on their full text, so the leading `<position>||` marker breaks
//! ties by declaration order. Sorted entries are cut into chunks of at most
//! `batch_size`, markers are stripped, and each chunk is emitted as one
//! tab-joined unit. A single empty string ends the sequence.

use std::cmp::Ordering;
use std::iter::FusedIterator;

use crate::group::{DescendingGroups, GroupAggregator};
use crate::types::LookupStats;

/// Separator between entries of one unit.
pub const ENTRY_SEPARATOR: char = '\t';

/// Characters trimmed from both ends of a rendered unit.
const TRIMMED: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Lazy sequence of candidate units ending with one empty-string terminator.
///
/// Forward-only: once the terminator has been yielded the iterator is
/// exhausted. Dropping it early needs no cleanup.
#[derive(Debug)]
pub struct CandidateBatches {
    groups: DescendingGroups,
    current: std::vec::IntoIter<String>,
    batch_size: usize,
    remaining_groups: usize,
    terminated: bool,
    stats: LookupStats,
}

impl CandidateBatches {
    pub(crate) fn new(groups: GroupAggregator, batch_size: usize, stats: LookupStats) -> Self {
        let remaining_groups = groups.len();
        Self {
            groups: groups.into_descending(),
            current: Vec::new().into_iter(),
            batch_size: batch_size.max(1),
            remaining_groups,
            terminated: false,
            stats,
        }
    }

    /// Counters gathered while collecting the candidates.
    pub fn stats(&self) -> &LookupStats {
        &self.stats
    }

    /// Specificity buckets not yet opened.
    pub fn remaining_groups(&self) -> usize {
        self.remaining_groups
    }

    /// Whether the terminator has been yielded.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    fn next_chunk(&mut self) -> Option<String> {
        loop {
            if self.current.len() > 0 {
                let unit = render_unit(self.current.by_ref().take(self.batch_size));
                if !unit.is_empty() {
                    return Some(unit);
                }
                continue;
            }
            let (_, payloads) = self.groups.next()?;
            self.remaining_groups -= 1;
            let mut entries = split_entries(payloads);
            entries.sort_by(|a, b| natural_cmp(a, b));
            self.current = entries.into_iter();
        }
    }
}

impl Iterator for CandidateBatches {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.terminated {
            return None;
        }
        match self.next_chunk() {
            Some(unit) => Some(unit),
            None => {
                self.terminated = true;
                Some(String::new())
            }
        }
    }
}

impl FusedIterator for CandidateBatches {}

/// A stored payload may hold several tab-separated entries; each one is
/// sorted, counted and stripped on its own. Empty pieces are dropped.
fn split_entries(payloads: Vec<String>) -> Vec<String> {
    payloads
        .iter()
        .flat_map(|payload| payload.split(ENTRY_SEPARATOR))
        .filter(|piece| !piece.is_empty())
        .map(str::to_owned)
        .collect()
}

fn render_unit<I: Iterator<Item = String>>(entries: I) -> String {
    let mut unit = String::new();
    for (index, entry) in entries.enumerate() {
        if index > 0 {
            unit.push(ENTRY_SEPARATOR);
        }
        unit.push_str(strip_marker(&entry));
    }
    unit.trim_matches(TRIMMED).to_string()
}

/// Remove a leading `<digits>||` ordering marker, if present.
pub fn strip_marker(entry: &str) -> &str {
    let digits = entry.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = entry[digits..].strip_prefix("||") {
            return rest;
        }
    }
    entry
}

/// Natural (numeric-aware) string ordering.
///
/// Runs of ASCII digits compare by numeric value, all other bytes compare
/// byte-wise. Equal numeric runs order fewer leading zeros first. Strings
/// that still tie fall back to plain byte order, so the ordering is total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_order(a.as_bytes(), b.as_bytes()).then_with(|| a.cmp(b))
}

fn natural_order(a: &[u8], b: &[u8]) -> Ordering {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let end_a = digit_run_end(a, i);
            let end_b = digit_run_end(b, j);
            match compare_numeric(&a[i..end_a], &b[j..end_b]) {
                Ordering::Equal => {
                    i = end_a;
                    j = end_b;
                }
                ord => return ord,
            }
        } else {
            match a[i].cmp(&b[j]) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                ord => return ord,
            }
        }
    }
    (a.len() - i).cmp(&(b.len() - j))
}

fn digit_run_end(bytes: &[u8], start: usize) -> usize {
    start
        + bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
}

fn compare_numeric(a: &[u8], b: &[u8]) -> Ordering {
    let zeros_a = a.iter().take_while(|&&d| d == b'0').count();
    let zeros_b = b.iter().take_while(|&&d| d == b'0').count();
    let (value_a, value_b) = (&a[zeros_a..], &b[zeros_b..]);
    value_a
        .len()
        .cmp(&value_b.len())
        .then_with(|| value_a.cmp(value_b))
        .then_with(|| zeros_a.cmp(&zeros_b))
}
