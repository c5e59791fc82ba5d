//! Binary entrypoint: read a collected log document, print the digest report.
//!
//! The report goes to stdout; diagnostics and errors go to stderr. With
//! `--processed-out` the intermediate structures are also written as JSON,
//! for callers that want the machine-readable form alongside the prose.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use digest_engine::{Config, Engine, TracingSink};

fn usage() -> ! {
  let _ = writeln!(
    io::stderr(),
    "usage: digest-engine [--budget CHARS] [--network] [--processed-out FILE] <log-document.json>"
  );
  process::exit(2);
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .with_writer(io::stderr)
    .init();

  let mut config = Config::default();
  let mut processed_out: Option<PathBuf> = None;
  let mut input: Option<PathBuf> = None;

  let mut args = env::args().skip(1);
  while let Some(arg) = args.next() {
    match arg.as_str() {
      "--budget" => {
        config.budget_chars = match args.next().and_then(|v| v.parse().ok()) {
          Some(n) => n,
          None => usage(),
        };
      }
      "--network" => config.include_network_info = true,
      "--processed-out" => {
        processed_out = match args.next() {
          Some(path) => Some(PathBuf::from(path)),
          None => usage(),
        };
      }
      "--help" | "-h" => usage(),
      _ if input.is_none() && !arg.starts_with('-') => input = Some(PathBuf::from(arg)),
      _ => usage(),
    }
  }

  let input = match input {
    Some(path) => path,
    None => usage(),
  };

  let text = match fs::read_to_string(&input) {
    Ok(t) => t,
    Err(e) => {
      let _ = writeln!(
        io::stderr(),
        "digest-engine: cannot read {}: {}",
        input.display(),
        e
      );
      process::exit(1);
    }
  };

  let engine = Engine::new(config);
  let (processed, report) = match engine.process_json(&text, &TracingSink) {
    Ok(result) => result,
    Err(e) => {
      let _ = writeln!(io::stderr(), "digest-engine: {}", e);
      process::exit(1);
    }
  };

  if let Some(path) = processed_out {
    match serde_json::to_string_pretty(&processed) {
      Ok(json) => {
        if let Err(e) = fs::write(&path, json) {
          let _ = writeln!(
            io::stderr(),
            "digest-engine: cannot write {}: {}",
            path.display(),
            e
          );
        }
      }
      Err(e) => {
        let _ = writeln!(io::stderr(), "digest-engine: serialize processed: {}", e);
      }
    }
  }

  println!("{report}");
}
