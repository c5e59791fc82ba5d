//! Core types for the digest engine (JSON contracts + derived models).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the collector produces)
// ---------------------------------------------------------------------------

/// A complete collected log document. Unknown fields are silently ignored;
/// a missing `Events` array is treated as an empty batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogDocument {
  #[serde(default, deserialize_with = "de_opt_string")]
  pub collection_time: Option<String>,
  #[serde(default)]
  pub time_range: Option<TimeRange>,
  /// Free-form key/value map; consumed opaquely apart from optional lookups.
  #[serde(default)]
  pub system_info: BTreeMap<String, Value>,
  #[serde(default)]
  pub network_info: Option<BTreeMap<String, Value>>,
  #[serde(default)]
  pub events: Vec<RawEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeRange {
  #[serde(default, deserialize_with = "de_opt_string")]
  pub start_time: Option<String>,
  #[serde(default, deserialize_with = "de_opt_string")]
  pub end_time: Option<String>,
}

/// One observed event occurrence, as emitted by the collector. Created once
/// at parse time and never mutated. Field-level anomalies are absorbed here
/// with documented defaults rather than surfaced as errors.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawEvent {
  /// Log category, e.g. "System" or "Application".
  #[serde(default, deserialize_with = "de_string_or_empty")]
  pub log_name: String,
  /// ISO-8601 text; may be absent or malformed.
  #[serde(default, deserialize_with = "de_opt_string")]
  pub time_created: Option<String>,
  /// Raw severity: text, numeric-as-text, or a bare number. Normalized later.
  #[serde(default, deserialize_with = "de_opt_string")]
  pub level: Option<String>,
  /// Numeric event identifier; 0 when absent or unparseable.
  #[serde(rename = "EventID", default, deserialize_with = "de_event_id")]
  pub event_id: i64,
  /// Provider/originator name; "Unknown" when absent or blank.
  #[serde(default = "default_provider", deserialize_with = "de_provider")]
  pub provider_name: String,
  /// Free text; "No message" when absent or blank.
  #[serde(default = "default_message", deserialize_with = "de_message")]
  pub message: String,
}

// ---------------------------------------------------------------------------
// Severity enum (normalized)
// ---------------------------------------------------------------------------

/// Canonical severity. Declaration order is display order, so the derived
/// `Ord` sorts Critical first.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
  Critical,
  Error,
  Warning,
  Information,
  Verbose,
}

impl Severity {
  pub const ALL: [Severity; 5] = [
    Severity::Critical,
    Severity::Error,
    Severity::Warning,
    Severity::Information,
    Severity::Verbose,
  ];

  /// Total mapping from raw severity representations to the canonical set.
  ///
  /// Case-insensitive, whitespace-trimmed match on the five canonical names,
  /// then the numeric codes "1".."5"; anything else (including absent input)
  /// is `Information`.
  pub fn normalize(raw: Option<&str>) -> Self {
    let Some(raw) = raw else {
      return Severity::Information;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
      "critical" | "1" => Severity::Critical,
      "error" | "2" => Severity::Error,
      "warning" | "3" => Severity::Warning,
      "information" | "4" => Severity::Information,
      "verbose" | "5" => Severity::Verbose,
      _ => Severity::Information,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Severity::Critical => "Critical",
      Severity::Error => "Error",
      Severity::Warning => "Warning",
      Severity::Information => "Information",
      Severity::Verbose => "Verbose",
    }
  }
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ---------------------------------------------------------------------------
// Derived types (computed fresh per batch)
// ---------------------------------------------------------------------------

/// A deduplicated bucket of raw events sharing category, provider, event id,
/// and canonical severity.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateGroup {
  pub log_category: String,
  pub source: String,
  pub event_id: i64,
  pub severity: Severity,
  /// Message of the first event encountered for this group in input order.
  pub message: String,
  pub occurrence_count: u64,
  /// Min/max of the successfully parsed timestamps; both `None` when no
  /// timestamp in the group parsed.
  pub first_timestamp: Option<DateTime<Utc>>,
  pub last_timestamp: Option<DateTime<Utc>>,
  /// Up to 3 parsed timestamps nearest `last_timestamp`, newest first.
  pub example_timestamps: Vec<DateTime<Utc>>,
}

/// One entry in a top-N list: a source name or a stringified event id, its
/// total count, and the category it was first observed in.
#[derive(Debug, Clone, Serialize)]
pub struct TopEntry {
  pub name: String,
  pub count: u64,
  pub category: String,
}

/// Batch-wide statistics.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
  pub total_events: u64,
  pub counts_by_category: BTreeMap<String, u64>,
  /// All five canonical severities are always present, possibly zero.
  pub counts_by_severity: BTreeMap<Severity, u64>,
  /// At most 5 entries, count > 1 only, count-descending.
  pub top_sources: Vec<TopEntry>,
  /// At most 5 entries, count > 1 only, count-descending; id 0 excluded.
  pub top_event_ids: Vec<TopEntry>,
}

/// Everything derived from one document: collection metadata carried through
/// verbatim plus the computed summary and aggregate groups. Serializable so
/// callers can persist the intermediate alongside the rendered report.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedLogs {
  pub collection_time: Option<String>,
  pub time_range: Option<TimeRange>,
  pub system_info: BTreeMap<String, Value>,
  pub network_info: Option<BTreeMap<String, Value>>,
  pub summary: Summary,
  pub groups: Vec<AggregateGroup>,
}

// ---------------------------------------------------------------------------
// Lenient serde helpers (collector output is loosely typed)
// ---------------------------------------------------------------------------

fn default_provider() -> String {
  "Unknown".to_string()
}

fn default_message() -> String {
  "No message".to_string()
}

fn value_to_string(value: Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

/// String, number, or bool → `Some(text)`; null and structured values → `None`.
fn de_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(value.and_then(value_to_string))
}

fn de_string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(de_opt_string(deserializer)?.unwrap_or_default())
}

fn de_provider<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(
    de_opt_string(deserializer)?
      .filter(|s| !s.trim().is_empty())
      .unwrap_or_else(default_provider),
  )
}

fn de_message<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(
    de_opt_string(deserializer)?
      .filter(|s| !s.trim().is_empty())
      .unwrap_or_else(default_message),
  )
}

/// JSON number or numeric string → i64; anything else → 0.
fn de_event_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
    Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
    _ => 0,
  })
}
