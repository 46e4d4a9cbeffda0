//! # Diagnostic Logger
//!
//! Vendors accept an optional [`Logger`] through [`Vendor::set_logger`](crate::Vendor::set_logger).
//! It is a pure sink: logging never changes vendor behavior and a sink that fails
//! must swallow its own errors.
//!
//! [`TracingLogger`] is the default sink and forwards everything into `tracing`, so
//! vendor diagnostics land next to the cashier's own structured events.

use tracing::{debug, error, info, trace, warn, Level};

/// Accepts diagnostic events from a vendor.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }
}

/// [`Logger`] that emits `tracing` events tagged with a component name.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    tag: String,
}

impl TracingLogger {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new("cashier")
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        let tag = self.tag.as_str();
        match level {
            Level::ERROR => error!(tag, "{message}"),
            Level::WARN => warn!(tag, "{message}"),
            Level::INFO => info!(tag, "{message}"),
            Level::DEBUG => debug!(tag, "{message}"),
            _ => trace!(tag, "{message}"),
        }
    }
}
