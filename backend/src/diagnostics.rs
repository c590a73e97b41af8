//! Diagnostics collected while decoding sheets and building grids.
//!
//! Every call owns its own [`Diagnostics`] sink; entries are returned to the
//! caller inside the result value and mirrored to `tracing` as they are
//! recorded, so a host program sees them in its log output too.

use serde::{Deserialize, Serialize};

/// Diagnostic level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single diagnostic entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for follow-up lines)
    #[serde(default)]
    pub indent: u8,
}

impl Diagnostic {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }
}

/// Per-call diagnostic sink
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry and forward it to `tracing`
    pub fn push(&mut self, entry: Diagnostic) {
        let indent = "   ".repeat(entry.indent as usize);
        match entry.level {
            LogLevel::Info | LogLevel::Success => tracing::info!("{}{}", indent, entry.message),
            LogLevel::Warning => tracing::warn!("{}{}", indent, entry.message),
            LogLevel::Error => tracing::error!("{}{}", indent, entry.message),
        }
        self.entries.push(entry);
    }

    pub fn info(&mut self, msg: impl Into<String>) {
        self.push(Diagnostic::info(msg));
    }

    pub fn success(&mut self, msg: impl Into<String>) {
        self.push(Diagnostic::success(msg));
    }

    pub fn warning(&mut self, msg: impl Into<String>) {
        self.push(Diagnostic::warning(msg));
    }

    pub fn warning_indent(&mut self, msg: impl Into<String>, indent: u8) {
        self.push(Diagnostic::warning(msg).with_indent(indent));
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of warning-level entries
    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.level == LogLevel::Warning)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move every entry of `other` into this sink without re-emitting it
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}
