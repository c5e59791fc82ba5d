//! Diagnostic side channel for per-record anomalies.
//!
//! The engine is a pure function over its batch; anomalies that are recovered
//! with defaults (unparsable timestamps and the like) are reported through an
//! explicit sink the caller passes in, not through ambient logger state.

use std::sync::Mutex;

pub trait DiagnosticSink {
  fn note(&self, message: &str);
}

/// Discards every note.
pub struct NullSink;

impl DiagnosticSink for NullSink {
  fn note(&self, _message: &str) {}
}

/// Forwards notes to the `tracing` facade at DEBUG level.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
  fn note(&self, message: &str) {
    tracing::debug!("{message}");
  }
}

/// Captures notes in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
  notes: Mutex<Vec<String>>,
}

impl MemorySink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn notes(&self) -> Vec<String> {
    match self.notes.lock() {
      Ok(notes) => notes.clone(),
      Err(poisoned) => poisoned.into_inner().clone(),
    }
  }
}

impl DiagnosticSink for MemorySink {
  fn note(&self, message: &str) {
    if let Ok(mut notes) = self.notes.lock() {
      notes.push(message.to_string());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn memory_sink_records_in_order() {
    let sink = MemorySink::new();
    sink.note("first");
    sink.note("second");
    assert_eq!(sink.notes(), vec!["first", "second"]);
  }

  #[test]
  fn null_sink_is_silent() {
    NullSink.note("ignored");
  }
}
