//! Engine facade: parse → {aggregate, summarize} → format.

use crate::aggregate;
use crate::config::Config;
use crate::diag::DiagnosticSink;
use crate::error::EngineError;
use crate::format;
use crate::parse;
use crate::stats;
use crate::types::{LogDocument, ProcessedLogs};

/// The digest engine. Stateless apart from its configuration; every call's
/// working set is local and discarded at return.
pub struct Engine {
  config: Config,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  /// Run aggregation and summarization over a parsed document.
  ///
  /// Total: per-record anomalies are absorbed with defaults and surfaced
  /// only through the sink.
  pub fn process(&self, doc: &LogDocument, sink: &dyn DiagnosticSink) -> ProcessedLogs {
    let groups = aggregate::aggregate(&doc.events, sink);
    let summary = stats::summarize(&doc.events);
    ProcessedLogs {
      collection_time: doc.collection_time.clone(),
      time_range: doc.time_range.clone(),
      system_info: doc.system_info.clone(),
      network_info: doc.network_info.clone(),
      summary,
      groups,
    }
  }

  /// Render a processed batch into the budgeted report text.
  pub fn render(&self, processed: &ProcessedLogs) -> String {
    format::format_report(processed, &self.config)
  }

  /// Full pipeline from raw JSON text. The only fallible step is parsing;
  /// a malformed batch yields an error and no partial report.
  pub fn process_json(
    &self,
    text: &str,
    sink: &dyn DiagnosticSink,
  ) -> Result<(ProcessedLogs, String), EngineError> {
    let doc = parse::parse_document(text)?;
    let processed = self.process(&doc, sink);
    let report = self.render(&processed);
    Ok((processed, report))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::diag::NullSink;

  #[test]
  fn empty_batch_produces_report_not_error() {
    let engine = Engine::with_defaults();
    let (processed, report) = engine
      .process_json(r#"{"Events": []}"#, &NullSink)
      .unwrap();
    assert_eq!(processed.summary.total_events, 0);
    assert!(processed.groups.is_empty());
    assert!(report.contains("## EVENT SUMMARY ##"));
    assert!(report.contains("Total Events: 0"));
  }

  #[test]
  fn malformed_batch_yields_single_failure() {
    let engine = Engine::with_defaults();
    let err = engine.process_json("{not json", &NullSink);
    assert!(err.is_err());
  }

  #[test]
  fn occurrence_counts_cover_the_batch() {
    let json = r#"{
      "Events": [
        {"LogName": "System", "Level": "Error", "EventID": 7, "ProviderName": "Disk", "Message": "a"},
        {"LogName": "System", "Level": "Error", "EventID": 7, "ProviderName": "Disk", "Message": "a"},
        {"LogName": "Application", "Level": "Warning", "EventID": 9, "ProviderName": "App", "Message": "b"}
      ]
    }"#;
    let engine = Engine::with_defaults();
    let (processed, _) = engine.process_json(json, &NullSink).unwrap();
    let total: u64 = processed.groups.iter().map(|g| g.occurrence_count).sum();
    assert_eq!(total, 3);
    assert_eq!(processed.summary.total_events, 3);
  }
}
