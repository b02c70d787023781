//! Output-shape guarantees checked over a fixed identifier corpus.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::{Fixture, hash_of};
use uapatterns::{generate, InMemoryShardStore, LookupConfig, PatternLookup};

const IDENTIFIERS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15",
    "Opera/9.80 (Windows NT 6.1; U; en) Presto/2.12.388 Version/12.16",
    "Googlebot/2.1 (+http://www.google.com/bot.html)",
    "curl/8.4.0",
    "Wget",
    "*",
    "",
    "A-really-long-identifier-with-no-boundaries-at-all-exceeding-the-window",
];

/// Seeds one record per literal prefix of every identifier, with varied
/// specificity, min length and required substring.
fn dense_fixture() -> (Fixture, HashMap<String, String>) {
    let mut fixture = Fixture::new().fallback(0, 1, "*");
    let mut owners = HashMap::new();
    let mut marker = 2;
    for identifier in IDENTIFIERS {
        let literal: String = identifier
            .chars()
            .take(32)
            .take_while(|c| !matches!(c, '.' | '*' | '?' | '\\' | ' ' | '\t' | '\n' | '\r'))
            .collect();
        for end in 1..=literal.len() {
            let prefix = &literal[..end];
            let pattern = format!("{prefix}#{marker}");
            let substring = if end % 3 == 0 { &literal[end - 1..end] } else { "" };
            fixture = fixture.record(
                prefix,
                (end as i64 * 7) % 11,
                (end as i64 * 5) % 40,
                substring,
                marker,
                &pattern,
            );
            owners.insert(pattern, hash_of(prefix));
            marker += 1;
        }
    }
    (fixture, owners)
}

fn lookup(batch_size: usize) -> (PatternLookup<InMemoryShardStore>, HashMap<String, String>) {
    let (fixture, owners) = dense_fixture();
    let lookup = PatternLookup::new(
        Arc::new(fixture.build()),
        LookupConfig::default().with_batch_size(batch_size),
    )
    .unwrap();
    (lookup, owners)
}

#[test]
fn terminator_appears_exactly_once_and_last() {
    let (lookup, _) = lookup(4);
    for identifier in IDENTIFIERS {
        let mut batches = lookup.candidates(identifier).unwrap();
        let units: Vec<String> = batches.by_ref().collect();
        assert_eq!(units.last().map(String::as_str), Some(""), "{identifier}");
        assert_eq!(units.iter().filter(|u| u.is_empty()).count(), 1, "{identifier}");
        assert!(batches.is_terminated());
        assert_eq!(batches.next(), None);
    }
}

#[test]
fn units_never_exceed_batch_size() {
    for batch_size in [1, 2, 3, 50] {
        let (lookup, _) = lookup(batch_size);
        for identifier in IDENTIFIERS {
            for unit in lookup.candidates(identifier).unwrap() {
                assert!(unit.split('\t').count() <= batch_size, "{unit:?}");
            }
        }
    }
}

#[test]
fn every_emitted_pattern_is_reachable_and_satisfiable() {
    let (lookup, owners) = lookup(50);
    let (fixture, _) = dense_fixture();
    let records: HashMap<String, (i64, String)> = fixture
        .entries()
        .into_iter()
        .flat_map(|(_, bytes)| {
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| {
                    let fields: Vec<&str> = line.splitn(5, '\t').collect();
                    let pattern = fields[4].split_once("||").unwrap().1.to_string();
                    (pattern, (fields[2].parse().unwrap(), fields[3].to_string()))
                })
                .collect::<Vec<_>>()
        })
        .collect();

    for identifier in IDENTIFIERS {
        let candidates = generate(identifier.as_bytes()).unwrap();
        for unit in lookup.candidates(identifier).unwrap() {
            for pattern in unit.split('\t').filter(|p| !p.is_empty()) {
                if pattern == "*" {
                    continue;
                }
                assert!(candidates.contains(&owners[pattern]), "{pattern} for {identifier}");
                let (min_length, substring) = &records[pattern];
                assert!(*min_length <= identifier.len() as i64);
                assert!(identifier.contains(substring.as_str()));
            }
        }
    }
}

#[test]
fn specificity_never_increases_across_units() {
    let (lookup, _) = lookup(2);
    let (fixture, _) = dense_fixture();
    let specificity: HashMap<String, i64> = fixture
        .entries()
        .into_iter()
        .flat_map(|(_, bytes)| {
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| {
                    let fields: Vec<&str> = line.splitn(5, '\t').collect();
                    let pattern = fields[4].split_once("||").unwrap().1.to_string();
                    (pattern, fields[1].parse().unwrap())
                })
                .collect::<Vec<_>>()
        })
        .collect();

    for identifier in IDENTIFIERS {
        let mut previous = i64::MAX;
        for unit in lookup.candidates(identifier).unwrap() {
            for pattern in unit.split('\t').filter(|p| !p.is_empty()) {
                let current = specificity[pattern];
                assert!(current <= previous, "{pattern} after specificity {previous}");
                previous = current;
            }
        }
    }
}

#[test]
fn each_pattern_is_emitted_at_most_once() {
    let (lookup, _) = lookup(3);
    for identifier in IDENTIFIERS {
        let mut seen = std::collections::HashSet::new();
        for unit in lookup.candidates(identifier).unwrap() {
            for pattern in unit.split('\t').filter(|p| !p.is_empty()) {
                assert!(seen.insert(pattern.to_string()), "duplicate {pattern}");
            }
        }
    }
}
