//! Tracing bootstrap.
//!
//! Stdout is the interactive surface, so records go to `MOLTBOOK_LOG_FILE`
//! when set and to stderr otherwise.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

/// Directive used when `RUST_LOG` is unset.
#[must_use]
pub fn default_directive(config: &EnvConfig) -> &'static str {
    if config.debug {
        "debug"
    } else {
        "warn"
    }
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init(config: &EnvConfig) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let (writer, ansi) = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(io::stderr), true),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .try_init();
    Ok(())
}
