//! Logging and performance tracing for Trellis.
//!
//! Trellis uses the `tracing` crate for instrumentation. Nothing is printed
//! unless the host installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("trellis::reflow=debug,trellis::window=warn")
//!     .init();
//! ```
//!
//! Long-running operations are measured with [`SlowOpWatch`], which warns
//! when a reflow or an update tick exceeds its budget.

use std::time::{Duration, Instant};

/// Span names used throughout Trellis for tracing.
pub mod span_names {
    /// Window update tick.
    pub const UPDATE: &str = "trellis::update";
    /// Full or partial reflow.
    pub const REFLOW: &str = "trellis::reflow";
    /// Draw pass.
    pub const DRAW: &str = "trellis::draw";
    /// Event dispatch.
    pub const DISPATCH: &str = "trellis::dispatch";
}

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "trellis_core";
    /// Attribute registry and attribute mutation.
    pub const ATTRIBUTE: &str = "trellis::attribute";
    /// Layout.
    pub const REFLOW: &str = "trellis::reflow";
    /// Event synthesis and dispatch.
    pub const EVENT: &str = "trellis::event";
    /// Animations.
    pub const ANIMATION: &str = "trellis::animation";
    /// Window tick and host interaction.
    pub const WINDOW: &str = "trellis::window";
    /// Performance spans.
    pub const PERF: &str = "trellis::perf";
}

/// A guard that keeps a tracing span entered until dropped.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a performance span for `name`.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self { span: span.entered() }
    }
}

/// Measures an operation and warns when it exceeds a budget.
///
/// ```
/// use std::time::Duration;
/// use trellis_core::logging::SlowOpWatch;
///
/// let watch = SlowOpWatch::new("reflow", Duration::from_millis(20));
/// // ... work ...
/// let elapsed = watch.finish();
/// assert!(elapsed < Duration::from_secs(1));
/// ```
#[derive(Debug)]
pub struct SlowOpWatch {
    operation: &'static str,
    threshold: Duration,
    start: Instant,
}

impl SlowOpWatch {
    /// Start measuring.
    pub fn new(operation: &'static str, threshold: Duration) -> Self {
        Self {
            operation,
            threshold,
            start: Instant::now(),
        }
    }

    /// Stop measuring, warning if the budget was exceeded.
    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        if elapsed > self.threshold {
            tracing::warn!(
                target: targets::PERF,
                operation = self.operation,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = self.threshold.as_secs_f64() * 1000.0,
                "slow {}",
                self.operation
            );
        }
        elapsed
    }
}

/// Trace-level log with the Trellis target.
#[macro_export]
macro_rules! trellis_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

/// Debug-level log with the Trellis target.
#[macro_export]
macro_rules! trellis_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

/// Warning with the Trellis target.
#[macro_export]
macro_rules! trellis_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::EnvFilter;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` under a subscriber that records everything, and return the
    /// formatted output.
    fn capture_logs(f: impl FnOnce()) -> String {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("trace"))
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = out.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_perf_span_uses_perf_target() {
        let logs = capture_logs(|| {
            let _span = PerfSpan::new("test_operation");
            tracing::info!("inside");
        });
        assert!(logs.contains("operation=\"test_operation\""));
    }

    #[test]
    fn test_slow_op_watch_warns_over_budget() {
        let logs = capture_logs(|| {
            let watch = SlowOpWatch::new("noop", Duration::ZERO);
            std::thread::sleep(Duration::from_millis(1));
            assert!(watch.finish() >= Duration::from_millis(1));
        });
        assert!(logs.contains("WARN"));
        assert!(logs.contains(targets::PERF));
        assert!(logs.contains("slow noop"));
    }

    #[test]
    fn test_slow_op_watch_quiet_within_budget() {
        let logs = capture_logs(|| {
            SlowOpWatch::new("fast", Duration::from_secs(60)).finish();
        });
        assert!(!logs.contains("slow fast"));
    }

    #[test]
    fn test_macros_log_to_core_target() {
        let logs = capture_logs(|| {
            crate::trellis_trace!("trace {}", 1);
            crate::trellis_debug!(value = 2, "debug");
            crate::trellis_warn!("warn");
        });
        assert_eq!(logs.matches(targets::CORE).count(), 3);
        assert!(logs.contains("value=2"));
    }
}
