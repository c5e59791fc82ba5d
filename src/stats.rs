//! Batch statistics: counts by category and severity, top sources and
//! top event ids.

use std::collections::{BTreeMap, HashMap};

use crate::types::{RawEvent, Severity, Summary, TopEntry};

/// Maximum entries in each top-N list.
const TOP_N: usize = 5;

struct Tally {
  count: u64,
  /// Input-order index of the first occurrence; the deterministic tie-break.
  first_idx: usize,
  /// Category the name was first observed in; never updated afterwards.
  category: String,
}

/// Compute batch-wide statistics in a single pass.
///
/// Sources and event ids with a total count of 1 are excluded from the top
/// lists; event id 0 (absent/unparseable) is excluded from the id list
/// entirely. Total function; an empty batch yields an all-zero summary.
pub fn summarize(events: &[RawEvent]) -> Summary {
  let mut counts_by_category: BTreeMap<String, u64> = BTreeMap::new();
  let mut counts_by_severity: BTreeMap<Severity, u64> =
    Severity::ALL.iter().map(|s| (*s, 0)).collect();
  let mut sources: HashMap<String, Tally> = HashMap::new();
  let mut event_ids: HashMap<i64, Tally> = HashMap::new();

  for (idx, event) in events.iter().enumerate() {
    *counts_by_category
      .entry(event.log_name.clone())
      .or_insert(0) += 1;

    let severity = Severity::normalize(event.level.as_deref());
    *counts_by_severity.entry(severity).or_insert(0) += 1;

    sources
      .entry(event.provider_name.clone())
      .and_modify(|t| t.count += 1)
      .or_insert_with(|| Tally {
        count: 1,
        first_idx: idx,
        category: event.log_name.clone(),
      });

    // Zero is not a valid event identifier in this domain.
    if event.event_id != 0 {
      event_ids
        .entry(event.event_id)
        .and_modify(|t| t.count += 1)
        .or_insert_with(|| Tally {
          count: 1,
          first_idx: idx,
          category: event.log_name.clone(),
        });
    }
  }

  Summary {
    total_events: events.len() as u64,
    counts_by_category,
    counts_by_severity,
    top_sources: into_top(sources.into_iter().collect()),
    top_event_ids: into_top(
      event_ids
        .into_iter()
        .map(|(id, t)| (id.to_string(), t))
        .collect(),
    ),
  }
}

fn into_top(mut entries: Vec<(String, Tally)>) -> Vec<TopEntry> {
  entries.retain(|(_, t)| t.count > 1);
  entries.sort_by(|a, b| {
    b.1
      .count
      .cmp(&a.1.count)
      .then_with(|| a.1.first_idx.cmp(&b.1.first_idx))
  });
  entries.truncate(TOP_N);
  entries
    .into_iter()
    .map(|(name, t)| TopEntry {
      name,
      count: t.count,
      category: t.category,
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn make_event(log: &str, source: &str, event_id: i64, level: Option<&str>) -> RawEvent {
    RawEvent {
      log_name: log.to_string(),
      time_created: None,
      level: level.map(str::to_string),
      event_id,
      provider_name: source.to_string(),
      message: "No message".to_string(),
    }
  }

  #[test]
  fn mixed_severity_shapes_are_normalized() {
    let events = vec![
      make_event("System", "A", 1, Some("1")),
      make_event("System", "B", 2, Some("Error")),
      make_event("System", "C", 3, Some("warning")),
      make_event("System", "D", 4, Some("bogus")),
    ];
    let summary = summarize(&events);
    assert_eq!(summary.counts_by_severity[&Severity::Critical], 1);
    assert_eq!(summary.counts_by_severity[&Severity::Error], 1);
    assert_eq!(summary.counts_by_severity[&Severity::Warning], 1);
    assert_eq!(summary.counts_by_severity[&Severity::Information], 1);
    assert_eq!(summary.counts_by_severity[&Severity::Verbose], 0);
  }

  #[test]
  fn all_severity_keys_present_even_when_zero() {
    let summary = summarize(&[]);
    assert_eq!(summary.counts_by_severity.len(), 5);
    assert!(summary.counts_by_severity.values().all(|&c| c == 0));
    assert_eq!(summary.total_events, 0);
  }

  #[test]
  fn singletons_excluded_from_top_lists() {
    let events = vec![
      make_event("System", "Common", 10, Some("Error")),
      make_event("System", "Common", 10, Some("Error")),
      make_event("System", "Rare", 11, Some("Error")),
    ];
    let summary = summarize(&events);
    assert_eq!(summary.top_sources.len(), 1);
    assert_eq!(summary.top_sources[0].name, "Common");
    assert_eq!(summary.top_sources[0].count, 2);
    assert_eq!(summary.top_event_ids.len(), 1);
    assert_eq!(summary.top_event_ids[0].name, "10");
  }

  #[test]
  fn zero_event_id_never_listed() {
    let events = vec![
      make_event("System", "A", 0, Some("Error")),
      make_event("System", "A", 0, Some("Error")),
      make_event("System", "A", 0, Some("Error")),
    ];
    let summary = summarize(&events);
    assert!(summary.top_event_ids.is_empty());
    // The source still qualifies.
    assert_eq!(summary.top_sources.len(), 1);
  }

  #[test]
  fn top_lists_capped_and_sorted_descending() {
    let mut events = Vec::new();
    // Seven sources with counts 8, 7, ..., 2.
    for (i, count) in (2..=8).rev().enumerate() {
      for _ in 0..count {
        events.push(make_event("System", &format!("S{i}"), 100 + i as i64, Some("Error")));
      }
    }
    let summary = summarize(&events);
    assert_eq!(summary.top_sources.len(), 5);
    let counts: Vec<u64> = summary.top_sources.iter().map(|e| e.count).collect();
    assert_eq!(counts, vec![8, 7, 6, 5, 4]);
    assert_eq!(summary.top_event_ids.len(), 5);
  }

  #[test]
  fn first_seen_category_is_sticky() {
    let events = vec![
      make_event("System", "Mover", 5, Some("Error")),
      make_event("Application", "Mover", 5, Some("Error")),
      make_event("Application", "Mover", 5, Some("Error")),
    ];
    let summary = summarize(&events);
    assert_eq!(summary.top_sources[0].category, "System");
    assert_eq!(summary.top_event_ids[0].category, "System");
  }

  #[test]
  fn category_counts_cover_every_event() {
    let events = vec![
      make_event("System", "A", 1, None),
      make_event("System", "B", 2, None),
      make_event("Application", "C", 3, None),
    ];
    let summary = summarize(&events);
    assert_eq!(summary.counts_by_category["System"], 2);
    assert_eq!(summary.counts_by_category["Application"], 1);
    assert_eq!(summary.total_events, 3);
  }

  #[test]
  fn ties_broken_by_input_order() {
    let events = vec![
      make_event("System", "Second", 1, None),
      make_event("System", "First", 2, None),
      make_event("System", "First", 2, None),
      make_event("System", "Second", 1, None),
    ];
    let summary = summarize(&events);
    // Both count 2; "Second" appeared first in the input.
    assert_eq!(summary.top_sources[0].name, "Second");
    assert_eq!(summary.top_sources[1].name, "First");
  }
}
