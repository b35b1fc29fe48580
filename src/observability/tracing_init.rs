//! Structured tracing setup, controlled by `RUST_LOG` (or the config's
//! `output.log_level` as a fallback default) and optionally redirected to
//! `output.log_file` / `DLOGCOVER_LOG_PATH`.
//!
//! ## Log Levels
//!
//! - `error!` — a file or the whole run could not be analyzed
//! - `warn!`  — recoverable per-file issues (parse failure, missing worker)
//! - `info!`  — phase-level progress, pipeline monitor ticks
//! - `debug!` — per-file detail
//! - `trace!` — very verbose output
//!
//! ```bash
//! # Default: whatever output.log_level says (warn if unset)
//! dlogcover analyze .
//!
//! # Override via the standard tracing env var
//! RUST_LOG=debug dlogcover analyze .
//! ```

use std::io::Write;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber. `default_level` is used when
/// `RUST_LOG` is unset (normally `config.output.log_level`). When
/// `log_file` is set, output goes there instead of stderr.
///
/// # Panics
///
/// Panics if a subscriber is already installed (e.g. called twice).
pub fn init_tracing(default_level: &str, log_file: Option<&std::path::Path>) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if let Some(path) = log_file {
        if let Ok(file) = std::fs::File::create(path) {
            let file = std::sync::Mutex::new(file);
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(move || FileWriter {
                            file: &file as *const _,
                        }),
                )
                .with(filter)
                .init();
            return;
        }
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

/// Checks if debug logging is enabled, to avoid expensive formatting when
/// it would be discarded anyway.
pub fn is_debug_enabled() -> bool {
    tracing::enabled!(tracing::Level::DEBUG)
}

/// A writer that appends to a fixed file, used when `output.log_file` (or
/// `DLOGCOVER_LOG_PATH`) names a destination other than stderr.
struct FileWriter {
    file: *const std::sync::Mutex<std::fs::File>,
}

// SAFETY: the pointee lives in a `'static` local captured by the closure
// passed to `with_writer`, which itself lives as long as the subscriber.
unsafe impl Send for FileWriter {}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let file = unsafe { &*self.file };
        let mut guard = file.lock().unwrap();
        guard.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let file = unsafe { &*self.file };
        let mut guard = file.lock().unwrap();
        guard.flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FileWriter {
    type Writer = FileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        FileWriter { file: self.file }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_debug_enabled_does_not_panic_without_subscriber() {
        let _ = is_debug_enabled();
    }
}
