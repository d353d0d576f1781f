#![forbid(unsafe_code)]

//! Capture `tracing` output for assertions.
//!
//! Events are formatted without timestamps or colour, one per line, each
//! prefixed with its enclosing spans (`tether.dispatch{path=name ...}:`), so
//! tests can assert on both the message and where it was emitted.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Shared in-memory sink for a scoped subscriber.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with a subscriber recording events at `level` and above.
    pub fn run<T>(&self, level: Level, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(level)
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn logs(&self) -> CapturedLogs {
        CapturedLogs {
            text: String::from_utf8_lossy(&lock(&self.buf)).into_owned(),
        }
    }
}

/// Run `f` under a fresh capture and return its result with the logs.
pub fn capture<T>(level: Level, f: impl FnOnce() -> T) -> (T, CapturedLogs) {
    let capture = LogCapture::new();
    let out = capture.run(level, f);
    (out, capture.logs())
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buf: Arc::clone(&self.buf),
        }
    }
}

/// Writer handed to the formatter for each event.
#[derive(Debug)]
pub struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        lock(&self.buf).extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// A panicking test thread must not hide the logs of the others.
fn lock(buf: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    buf.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Formatted log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLogs {
    text: String,
}

impl CapturedLogs {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    /// Number of lines containing `needle`.
    #[must_use]
    pub fn count(&self, needle: &str) -> usize {
        self.lines().filter(|line| line.contains(needle)).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_events_at_or_above_level() {
        let ((), logs) = capture(Level::INFO, || {
            tracing::info!(answer = 42, "hello");
            tracing::debug!("hidden");
        });
        assert!(logs.contains("hello"));
        assert!(logs.contains("answer=42"));
        assert!(!logs.contains("hidden"));
        assert_eq!(logs.count("hello"), 1);
    }

    #[test]
    fn includes_span_context() {
        let ((), logs) = capture(Level::DEBUG, || {
            let _span = tracing::debug_span!("outer", id = 7).entered();
            tracing::debug!("inside");
        });
        let line = logs.lines().find(|l| l.contains("inside")).unwrap();
        assert!(line.contains("outer{id=7}"), "{line}");
    }
}
