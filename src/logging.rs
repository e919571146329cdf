//! Logging module for LotLedger
//!
//! This module configures structured logging using the tracing crate,
//! providing JSON output for production and pretty formatting for development.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::error::{Error, Result};

/// Initialize the logging system
///
/// Configures tracing based on the environment:
/// - Production: JSON formatted logs
/// - Development: Pretty formatted logs with colors
///
/// `RUST_LOG` overrides the level when set.
pub fn init_tracing(log_level: &str, environment: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lotledger={}", log_level)));

    if environment == "production" {
        let formatting_layer = fmt::layer()
            .json()
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_writer(std::io::stderr);

        Registry::default()
            .with(env_filter)
            .with(formatting_layer)
            .try_init()
            .map_err(|e| Error::internal(format!("Failed to initialize tracing: {}", e)))?;
    } else {
        let formatting_layer = fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr);

        Registry::default()
            .with(env_filter)
            .with(formatting_layer)
            .try_init()
            .map_err(|e| Error::internal(format!("Failed to initialize tracing: {}", e)))?;
    }

    tracing::info!(
        environment = environment,
        log_level = log_level,
        "Logging initialized"
    );

    Ok(())
}

/// Create a span for one reconciliation run
///
/// `events`, `closed` and `rejected` are recorded once the run completes.
#[macro_export]
macro_rules! reconcile_span {
    ($run_id:expr) => {
        tracing::info_span!(
            "reconcile",
            run_id = %$run_id,
            events = tracing::field::Empty,
            closed = tracing::field::Empty,
            rejected = tracing::field::Empty,
        )
    };
}

/// Log an error with context
#[macro_export]
macro_rules! log_error {
    ($error:expr, $msg:expr) => {
        tracing::error!(
            error = %$error,
            error_type = $error.error_type(),
            $msg
        )
    };
}

/// Helper for timing operations
pub struct Timer {
    start: std::time::Instant,
    operation: String,
}

impl Timer {
    /// Start a new timer
    pub fn start(operation: impl Into<String>) -> Self {
        Timer {
            start: std::time::Instant::now(),
            operation: operation.into(),
        }
    }

    /// Stop the timer and log the duration at debug level
    pub fn stop(self) -> std::time::Duration {
        self.stop_and_log(tracing::Level::DEBUG)
    }

    /// Stop the timer and log with custom level
    pub fn stop_and_log(self, level: tracing::Level) -> std::time::Duration {
        let duration = self.start.elapsed();
        let duration_ms = duration.as_millis() as u64;
        match level {
            tracing::Level::TRACE => {
                tracing::trace!(operation = %self.operation, duration_ms, "Operation completed")
            }
            tracing::Level::DEBUG => {
                tracing::debug!(operation = %self.operation, duration_ms, "Operation completed")
            }
            tracing::Level::INFO => {
                tracing::info!(operation = %self.operation, duration_ms, "Operation completed")
            }
            tracing::Level::WARN => {
                tracing::warn!(operation = %self.operation, duration_ms, "Operation completed")
            }
            tracing::Level::ERROR => {
                tracing::error!(operation = %self.operation, duration_ms, "Operation completed")
            }
        }
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer() {
        let timer = Timer::start("test_operation");
        std::thread::sleep(std::time::Duration::from_millis(10));
        let duration = timer.stop_and_log(tracing::Level::INFO);
        assert!(duration.as_millis() >= 10);
    }

    #[test]
    fn test_reconcile_span_records_fields() {
        let span = crate::reconcile_span!(uuid::Uuid::new_v4());
        span.record("events", 3usize);
        span.record("closed", 1usize);
        span.record("rejected", 2usize);
    }

    #[test]
    fn test_log_error_macro() {
        let error = Error::unknown_lot("Z");
        crate::log_error!(error, "Roster references an unknown lot");
    }
}
