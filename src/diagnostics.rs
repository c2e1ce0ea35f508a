//! Diagnostic side channel for recovery warnings and debug traces.
//!
//! The parser and renderer report through a [`DiagnosticSink`] injected by
//! the caller instead of writing to stderr directly. Warnings have the form
//! `<source>:<line>:<col> <message>` and never block or alter the output.

use colored::Colorize;

/// Receiver for warnings and debug traces emitted while processing one input.
pub trait DiagnosticSink {
    /// Report a recoverable anomaly that was corrected in-memory.
    fn warning(&mut self, message: &str);

    /// Report a debug trace. Sinks may discard these.
    fn debug(&mut self, message: &str);
}

/// Sink writing to stderr: warnings in yellow, debug traces in blue.
#[derive(Debug, Default)]
pub struct StderrSink {
    /// When false, debug traces are dropped
    pub debug_enabled: bool,
}

impl StderrSink {
    #[must_use]
    pub fn new(debug_enabled: bool) -> Self {
        Self { debug_enabled }
    }
}

impl DiagnosticSink for StderrSink {
    fn warning(&mut self, message: &str) {
        eprintln!("{}", message.yellow().bold());
    }

    fn debug(&mut self, message: &str) {
        if self.debug_enabled {
            eprintln!("{}", message.blue().bold());
        }
    }
}

/// Sink discarding everything, for silent mode.
#[derive(Debug, Default)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn warning(&mut self, _message: &str) {}

    fn debug(&mut self, _message: &str) {}
}

/// Sink collecting messages in memory, for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub warnings: Vec<String>,
    pub debugs: Vec<String>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for MemorySink {
    fn warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn debug(&mut self, message: &str) {
        self.debugs.push(message.to_string());
    }
}
