// src/notify/mod.rs
//
// Report side-channel. The command listener (start/end/log) lives outside
// this crate; it only flips the flags on a shared handle. The cycle loop
// reads them once per report, so plain atomics are enough.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Delivery target for flushed cycle reports.
pub trait Notifier: Send + Sync {
    fn deliver(&self, report: &str);
}

/// Default sink: the report goes to the log stream.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, report: &str) {
        for line in report.lines() {
            info!("{}", line);
        }
    }
}

/// Shared flags the external command listener mutates.
#[derive(Debug, Default)]
pub struct ReporterFlags {
    subscribed: AtomicBool,
    verbose: AtomicBool,
}

#[derive(Clone, Default)]
pub struct ReporterHandle {
    flags: Arc<ReporterFlags>,
}

impl ReporterHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// `start` command: begin receiving reports.
    pub fn subscribe(&self) {
        self.flags.subscribed.store(true, Ordering::Relaxed);
    }

    /// `end` command: stop receiving reports.
    pub fn unsubscribe(&self) {
        self.flags.subscribed.store(false, Ordering::Relaxed);
    }

    /// `log` command: toggle verbose lines.
    pub fn set_verbose(&self, verbose: bool) {
        self.flags.verbose.store(verbose, Ordering::Relaxed);
    }

    pub fn is_subscribed(&self) -> bool {
        self.flags.subscribed.load(Ordering::Relaxed)
    }

    pub fn is_verbose(&self) -> bool {
        self.flags.verbose.load(Ordering::Relaxed)
    }
}

/// Line buffer for one cycle. Lines accumulate during the cycle and flush
/// once at cycle end.
pub struct CycleReport {
    lines: Vec<String>,
    verbose: bool,
}

impl CycleReport {
    pub fn new(verbose: bool) -> Self {
        Self {
            lines: Vec::new(),
            verbose,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Dropped entirely unless verbose reporting is on.
    pub fn push_verbose(&mut self, line: impl Into<String>) {
        if self.verbose {
            self.lines.push(line.into());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn flush(self, handle: &ReporterHandle, notifier: &dyn Notifier) {
        if self.lines.is_empty() || !handle.is_subscribed() {
            return;
        }
        notifier.deliver(&self.lines.join("\n"));
    }
}
