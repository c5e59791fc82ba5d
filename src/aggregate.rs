//! Event aggregation: collapse recurring events into groups with occurrence
//! counts and time spans.
//!
//! Grouping is a single pass over one flat map keyed by the composed
//! (category, source, event id, severity) tuple. An insertion-order side
//! index keeps the output fully deterministic before the final sort.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::diag::DiagnosticSink;
use crate::types::{AggregateGroup, RawEvent, Severity};

/// Number of example timestamps retained per group, nearest the last one.
const MAX_EXAMPLE_TIMESTAMPS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
  log_category: String,
  source: String,
  event_id: i64,
  severity: Severity,
}

struct GroupAcc {
  key: GroupKey,
  message: String,
  count: u64,
  timestamps: Vec<DateTime<Utc>>,
}

/// Group a batch of raw events into aggregate groups.
///
/// Every event contributes to exactly one group's `occurrence_count`; only
/// events whose timestamp parses contribute to the time span. The output is
/// sorted by occurrence count descending, then last timestamp descending,
/// with timestamp-less groups after all timestamped ones.
pub fn aggregate(events: &[RawEvent], sink: &dyn DiagnosticSink) -> Vec<AggregateGroup> {
  let mut index: HashMap<GroupKey, usize> = HashMap::new();
  let mut accs: Vec<GroupAcc> = Vec::new();

  for event in events {
    let key = GroupKey {
      log_category: event.log_name.clone(),
      source: event.provider_name.clone(),
      event_id: event.event_id,
      severity: Severity::normalize(event.level.as_deref()),
    };

    let idx = match index.get(&key) {
      Some(&i) => i,
      None => {
        accs.push(GroupAcc {
          key: key.clone(),
          // Representative message: first event seen for this key, fixed.
          message: event.message.clone(),
          count: 0,
          timestamps: Vec::new(),
        });
        index.insert(key, accs.len() - 1);
        accs.len() - 1
      }
    };

    let acc = &mut accs[idx];
    acc.count += 1;

    if let Some(raw) = &event.time_created {
      match parse_timestamp(raw) {
        Some(ts) => acc.timestamps.push(ts),
        None => sink.note(&format!(
          "unparsable timestamp {:?} (source {}, event id {})",
          raw, event.provider_name, event.event_id
        )),
      }
    }
  }

  let mut groups: Vec<AggregateGroup> = accs
    .into_iter()
    .map(|acc| {
      let mut timestamps = acc.timestamps;
      timestamps.sort();
      let first_timestamp = timestamps.first().copied();
      let last_timestamp = timestamps.last().copied();
      let example_timestamps: Vec<DateTime<Utc>> = timestamps
        .iter()
        .rev()
        .take(MAX_EXAMPLE_TIMESTAMPS)
        .copied()
        .collect();
      AggregateGroup {
        log_category: acc.key.log_category,
        source: acc.key.source,
        event_id: acc.key.event_id,
        severity: acc.key.severity,
        message: acc.message,
        occurrence_count: acc.count,
        first_timestamp,
        last_timestamp,
        example_timestamps,
      }
    })
    .collect();

  // Most noise first: count descending, then most recent last-timestamp.
  // The empty string is the tie key for groups with no parsed timestamp,
  // which puts them after every timestamped group.
  groups.sort_by(|a, b| {
    b.occurrence_count
      .cmp(&a.occurrence_count)
      .then_with(|| sort_key(b).cmp(&sort_key(a)))
  });

  groups
}

fn sort_key(group: &AggregateGroup) -> String {
  group
    .last_timestamp
    .map(|ts| ts.to_rfc3339())
    .unwrap_or_default()
}

/// Parse an ISO-8601 timestamp as emitted by the collector.
///
/// Accepts an optional fractional-second component (normalized to exactly
/// 6 digits before parsing, padding or truncating as needed) and an optional
/// trailing `Z`, which is treated as the UTC offset `+00:00`. A timestamp
/// with no explicit offset is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  let rewritten;
  let s: &str = if trimmed.ends_with('Z') || trimmed.ends_with('z') {
    rewritten = format!("{}+00:00", &trimmed[..trimmed.len() - 1]);
    &rewritten
  } else {
    trimmed
  };

  // Split an explicit offset off the date-time body. The search starts after
  // the 'T' so date separators are not mistaken for an offset sign.
  let t_pos = s.find('T')?;
  let (body, offset) = match s[t_pos..].find(['+', '-']) {
    Some(rel) => (&s[..t_pos + rel], &s[t_pos + rel..]),
    None => (s, "+00:00"),
  };

  let body = match body.split_once('.') {
    Some((seconds, frac)) => {
      if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
      }
      let mut digits = frac.to_string();
      while digits.len() < 6 {
        digits.push('0');
      }
      digits.truncate(6);
      format!("{seconds}.{digits}")
    }
    None => body.to_string(),
  };

  let full = format!("{body}{offset}");
  DateTime::parse_from_str(&full, "%Y-%m-%dT%H:%M:%S%.f%:z")
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
}
