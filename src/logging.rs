//! Logging infrastructure.
//!
//! The crate emits structured events through the `tracing` facade; this
//! module wires up an optional subscriber controlled by environment
//! variables:
//!
//! - `CRITERIA_DEBUG=true|1|yes` - enable debug logging
//! - `CRITERIA_LOG_LEVEL=trace|debug|info|warn|error` - set a specific level
//! - `CRITERIA_LOG_FORMAT=json|pretty|compact` - set the output format
//!   (default: json)
//!
//! ```rust,no_run
//! use criteria::logging;
//!
//! // Call once at startup.
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `CRITERIA_DEBUG`.
///
/// Returns `true` for the values "true", "1", or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("CRITERIA_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Resolve the log level from `CRITERIA_LOG_LEVEL`.
///
/// Falls back to "debug" when `CRITERIA_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("CRITERIA_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Resolve the output format from `CRITERIA_LOG_FORMAT`.
///
/// Defaults to "json" for structured logging.
pub fn get_log_format() -> &'static str {
    env::var("CRITERIA_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Initialize the logging system.
///
/// Should be called once at application startup; subsequent calls are
/// no-ops. Without the `tracing-subscriber` feature the crate stays silent
/// unless the caller installs their own subscriber.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("CRITERIA_LOG_LEVEL").is_err() {
            // No logging requested.
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!("criteria={level}"))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            match get_log_format() {
                "compact" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().compact())
                        .init();
                }
                "pretty" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().pretty())
                        .init();
                }
                _ => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().json())
                        .init();
                }
            }

            tracing::info!(
                level = level,
                format = get_log_format(),
                "criteria logging initialized"
            );
        }
    });
}

/// Initialize logging with a specific level.
///
/// # Safety
///
/// This modifies environment variables, which is unsafe in multi-threaded
/// programs. Call this early, before spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: intended to be called at program startup before threads exist.
    unsafe {
        env::set_var("CRITERIA_LOG_LEVEL", level);
    }
    init();
}

/// Macro for conditional debug logging, active only when `CRITERIA_DEBUG`
/// is enabled at runtime.
#[macro_export]
macro_rules! criteria_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}

/// Macro for conditional trace logging.
#[macro_export]
macro_rules! criteria_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::trace!($($arg)*);
        }
    };
}
