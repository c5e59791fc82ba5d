//! Engine configuration with sane defaults.

/// Caller-supplied knobs for the rendered report.
#[derive(Debug, Clone)]
pub struct Config {
  /// Hard character ceiling for the rendered report. The full text is
  /// rendered first and cut at this boundary with an explicit marker.
  pub budget_chars: usize,
  /// Whether to emit the optional network-information block when the
  /// document carries one.
  pub include_network_info: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      budget_chars: 100_000,
      include_network_info: false,
    }
  }
}
