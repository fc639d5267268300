//! # Validation Report — Aggregable Verdicts
//!
//! Defines [`Report`], the pass/fail verdict produced by every validator, and
//! [`Message`], one diagnostic entry.
//!
//! ## Composition
//!
//! Reports form a monoid under [`Report::merge`]:
//!
//! ```text
//! merge(a, b).success  = a.success && b.success
//! merge(a, b).messages = a.messages ++ b.messages
//! identity             = Report::SUCCESS
//! ```
//!
//! A failing report is absorbing for `success`: once any merged report
//! fails, the aggregate fails.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One diagnostic entry attached to a failing report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// JSON Pointer to the offending node in the validated document.
    pub instance_path: String,
    /// JSON Pointer to the schema location that produced the diagnostic.
    pub schema_path: String,
    /// The keyword that failed (e.g. `required`).
    pub keyword: String,
    /// Human-readable description.
    pub message: String,
}

impl Message {
    /// Build a message.
    pub fn new(
        instance_path: impl Into<String>,
        schema_path: impl Into<String>,
        keyword: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            instance_path: instance_path.into(),
            schema_path: schema_path.into(),
            keyword: keyword.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): [{}] {}", self.keyword, self.message)
        } else {
            write!(f, "{}: [{}] {}", self.instance_path, self.keyword, self.message)
        }
    }
}

/// Pass/fail verdict with ordered diagnostics.
///
/// # Invariants
///
/// - A report with `success = true` produced by this crate never carries
///   messages; [`Report::SUCCESS`] is the canonical pass value.
/// - A failure report always carries at least one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    success: bool,
    messages: Vec<Message>,
}

impl Report {
    /// The canonical passing report: `success = true`, no messages.
    pub const SUCCESS: Report = Report {
        success: true,
        messages: Vec::new(),
    };

    /// The canonical passing report.
    pub const fn success() -> Self {
        Self::SUCCESS
    }

    /// A failing report carrying one message.
    pub fn failure(message: Message) -> Self {
        Self {
            success: false,
            messages: vec![message],
        }
    }

    /// Whether the verdict is a pass.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The diagnostics, in the order they were produced.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Consume the report, returning its diagnostics.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// AND-merge two reports, concatenating messages in call order.
    #[must_use]
    pub fn merge(mut self, other: Report) -> Report {
        self.merge_from(other);
        self
    }

    /// In-place form of [`Report::merge`].
    pub fn merge_from(&mut self, other: Report) {
        self.success &= other.success;
        self.messages.extend(other.messages);
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl FromIterator<Report> for Report {
    fn from_iter<I: IntoIterator<Item = Report>>(iter: I) -> Self {
        iter.into_iter().fold(Report::SUCCESS, Report::merge)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            return f.write_str("success");
        }
        write!(f, "failure ({} message(s))", self.messages.len())?;
        for message in &self.messages {
            write!(f, "\n  {message}")?;
        }
        Ok(())
    }
}
