//! Document parsing: the single place a malformed input batch is rejected.

use crate::error::EngineError;
use crate::types::LogDocument;

/// Parse a collected log document from JSON text.
///
/// Tolerates the UTF-8 BOM the upstream collector writes and a missing
/// `Events` array (empty batch). A document that is not a JSON object of the
/// expected shape fails here, once; downstream stages assume a well-shaped
/// batch.
pub fn parse_document(text: &str) -> Result<LogDocument, EngineError> {
  let text = text.strip_prefix('\u{feff}').unwrap_or(text);
  if text.trim().is_empty() {
    return Err(EngineError::validation("document", "input is empty"));
  }
  let doc: LogDocument = serde_json::from_str(text)?;
  Ok(doc)
}
