//! Context formatting: render processed logs into one bounded text block.
//!
//! The full report is rendered first and only then cut at the character
//! budget, so truncation is a suffix operation that can never corrupt a
//! section header. The marker tells the consumer content was dropped.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::Config;
use crate::types::{AggregateGroup, ProcessedLogs, Summary};

/// Appended when the rendered report exceeded the character budget.
pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// Known cp1252-mojibake sequences stripped from event messages. Longer
/// sequences first so the bare "Â" pass cannot split them.
const ENCODING_ARTIFACTS: &[&str] = &["â€™", "â€œ", "â€\u{9d}", "â€“", "â€”", "Â"];

/// Message lines are clamped to this many characters in the report.
const MAX_MESSAGE_CHARS: usize = 200;

/// Render the report in fixed section order, then enforce the budget.
pub fn format_report(processed: &ProcessedLogs, config: &Config) -> String {
  let mut out: Vec<String> = Vec::new();

  render_system_info(&mut out, &processed.system_info);
  render_collection(&mut out, processed);
  if config.include_network_info {
    if let Some(network) = &processed.network_info {
      render_network(&mut out, network);
    }
  }
  render_summary(&mut out, &processed.summary);
  render_groups(&mut out, &processed.groups);

  truncate_to_budget(out.join("\n"), config.budget_chars)
}

fn render_system_info(out: &mut Vec<String>, info: &BTreeMap<String, Value>) {
  out.push("## SYSTEM INFORMATION ##".to_string());
  out.push(format!("OS: {}", lookup(info, "OSVersion")));
  out.push(format!("Computer: {}", lookup(info, "ComputerName")));
  out.push(format!("Uptime: {}", lookup(info, "Uptime")));
  out.push(format!("Last Boot: {}", lookup(info, "LastBootTime")));
  out.push(String::new());
}

fn render_collection(out: &mut Vec<String>, processed: &ProcessedLogs) {
  out.push("## COLLECTION INFORMATION ##".to_string());
  out.push(format!(
    "Collection Time: {}",
    processed.collection_time.as_deref().unwrap_or("Unknown")
  ));
  let (start, end) = match &processed.time_range {
    Some(range) => (
      range.start_time.as_deref().unwrap_or("N/A"),
      range.end_time.as_deref().unwrap_or("N/A"),
    ),
    None => ("N/A", "N/A"),
  };
  out.push(format!("Time Range: {start} to {end}"));
  out.push(String::new());
}

fn render_network(out: &mut Vec<String>, network: &BTreeMap<String, Value>) {
  out.push("## NETWORK INFORMATION ##".to_string());
  if network.is_empty() {
    out.push("unavailable".to_string());
  }
  for (key, value) in network {
    out.push(format!("{key}: {}", value_str(value)));
  }
  out.push(String::new());
}

fn render_summary(out: &mut Vec<String>, summary: &Summary) {
  out.push("## EVENT SUMMARY ##".to_string());
  out.push(format!("Total Events: {}", summary.total_events));

  out.push("Events by Log Type:".to_string());
  for (category, count) in &summary.counts_by_category {
    out.push(format!("- {category}: {count}"));
  }

  out.push("Events by Severity Level:".to_string());
  for (severity, count) in &summary.counts_by_severity {
    if *count > 0 {
      out.push(format!("- {severity}: {count}"));
    }
  }

  if !summary.top_sources.is_empty() {
    out.push("Top Event Sources:".to_string());
    for entry in &summary.top_sources {
      out.push(format!(
        "- {} ({}): {} events",
        entry.name, entry.category, entry.count
      ));
    }
  }

  if !summary.top_event_ids.is_empty() {
    out.push("Top Event IDs:".to_string());
    for entry in &summary.top_event_ids {
      out.push(format!(
        "- Event ID {} ({}): {} occurrences",
        entry.name, entry.category, entry.count
      ));
    }
  }

  out.push(String::new());
}

fn render_groups(out: &mut Vec<String>, groups: &[AggregateGroup]) {
  out.push("## AGGREGATED EVENTS ##".to_string());
  if groups.is_empty() {
    out.push("None".to_string());
    return;
  }

  for group in groups {
    out.push(format!(
      "{} | {} | Event ID: {} | Count: {}",
      group.severity, group.source, group.event_id, group.occurrence_count
    ));
    out.push(format!("Message: {}", clean_message(&group.message)));
    if group.occurrence_count > 1 {
      out.push(format!(
        "First: {} | Last: {}",
        timestamp_str(group.first_timestamp),
        timestamp_str(group.last_timestamp)
      ));
    } else {
      out.push(format!("Time: {}", timestamp_str(group.last_timestamp)));
    }
    out.push(String::new());
  }
}

fn timestamp_str(ts: Option<DateTime<Utc>>) -> String {
  ts.map(|t| t.to_rfc3339()).unwrap_or_else(|| "unknown".to_string())
}

fn lookup(info: &BTreeMap<String, Value>, key: &str) -> String {
  info.get(key).map(value_str).unwrap_or_else(|| "Unknown".to_string())
}

fn value_str(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// Collapse newline runs to single spaces, strip known encoding artifacts,
/// trim, and clamp to the message length ceiling.
fn clean_message(raw: &str) -> String {
  let mut text = raw.to_string();
  for artifact in ENCODING_ARTIFACTS {
    if text.contains(artifact) {
      text = text.replace(artifact, "");
    }
  }

  let mut collapsed = String::with_capacity(text.len());
  let mut in_break = false;
  for ch in text.chars() {
    if ch == '\n' || ch == '\r' {
      if !in_break {
        collapsed.push(' ');
      }
      in_break = true;
    } else {
      in_break = false;
      collapsed.push(ch);
    }
  }

  let trimmed = collapsed.trim();
  if trimmed.chars().count() > MAX_MESSAGE_CHARS {
    let clipped: String = trimmed.chars().take(MAX_MESSAGE_CHARS - 3).collect();
    format!("{clipped}...")
  } else {
    trimmed.to_string()
  }
}

/// Cut at the budget boundary and append the marker. The marker's own length
/// may push the total past the budget; the consumer is told either way.
fn truncate_to_budget(text: String, budget_chars: usize) -> String {
  if text.chars().count() <= budget_chars {
    return text;
  }
  let mut cut: String = text.chars().take(budget_chars).collect();
  cut.push_str(TRUNCATION_MARKER);
  cut
}
