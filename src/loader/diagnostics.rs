//! Diagnostic collection for a single load attempt
//!
//! Collaborators report resolution and build problems into a `Diagnostics`
//! value instead of failing on the first one. The orchestrator checks the
//! collected messages once the attempt is over and only commits when none
//! were recorded.

use crate::error::{UniloadError, UniloadResult};
use std::fmt;
use tracing::debug;

/// Which stage of the attempt reported a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The package set could not be turned into a dependency graph
    Resolution,

    /// The image could not be built from a resolved graph
    Build,
}

impl DiagnosticKind {
    fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Resolution => "resolution",
            DiagnosticKind::Build => "build",
        }
    }
}

/// One reported problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,

    /// Package (or raw identifier) the message is about
    pub package: String,

    pub message: String,
}

/// Ordered messages collected during one attempt
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    label: String,
    messages: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            messages: Vec::new(),
        }
    }

    /// Label of the scope these messages were collected in
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Record an error
    pub fn error(
        &mut self,
        kind: DiagnosticKind,
        package: impl Into<String>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            package: package.into(),
            message: message.into(),
        };
        debug!(
            "{} error for {}: {}",
            diagnostic.kind.as_str(),
            diagnostic.package,
            diagnostic.message
        );
        self.messages.push(diagnostic);
    }

    pub fn resolution_error(&mut self, package: impl Into<String>, message: impl Into<String>) {
        self.error(DiagnosticKind::Resolution, package, message);
    }

    pub fn build_error(&mut self, package: impl Into<String>, message: impl Into<String>) {
        self.error(DiagnosticKind::Build, package, message);
    }

    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter()
    }

    /// Render every message, one per line, in the order they were recorded
    pub fn format_messages(&self) -> String {
        let mut out = format!("While {}:\n", self.label);
        for d in &self.messages {
            out.push_str(&format!(
                "  {} error: {}: {}\n",
                d.kind.as_str(),
                d.package,
                d.message
            ));
        }
        out
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format_messages().trim_end())
    }
}

/// Outcome of a captured attempt: the messages plus whatever the body produced
#[derive(Debug)]
pub struct Captured<T> {
    pub diagnostics: Diagnostics,
    pub value: Option<T>,
}

impl<T> Captured<T> {
    /// All-or-nothing conversion: any recorded message turns the attempt
    /// into a single `LoadFailed` error, regardless of what the body returned.
    pub fn into_result(self) -> UniloadResult<T> {
        if self.diagnostics.has_messages() {
            return Err(UniloadError::LoadFailed(self.diagnostics));
        }
        self.value.ok_or_else(|| {
            UniloadError::Internal(format!(
                "{} produced no result and reported no errors",
                self.diagnostics.label
            ))
        })
    }
}

/// Run `body` inside a fresh diagnostic scope.
///
/// Messages the body records are returned rather than raised. An `Err` from
/// the body is a fault, not a diagnostic: it propagates as-is and any
/// messages recorded before it are dropped with the scope, never folded
/// into the fault or reported separately.
pub fn capture<T, F>(label: &str, body: F) -> UniloadResult<Captured<T>>
where
    F: FnOnce(&mut Diagnostics) -> UniloadResult<Option<T>>,
{
    let mut diagnostics = Diagnostics::new(label);
    let value = body(&mut diagnostics)?;
    Ok(Captured { diagnostics, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_collects_in_order() {
        let captured = capture("loading packages a", |d| {
            d.resolution_error("a", "first");
            d.build_error("b", "second");
            Ok(Some(1))
        })
        .unwrap();

        let messages: Vec<&str> = captured
            .diagnostics
            .iter()
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(captured.value, Some(1));
    }

    #[test]
    fn messages_win_over_value() {
        let captured = capture("loading packages a", |d| {
            d.build_error("a", "broken");
            Ok(Some(1))
        })
        .unwrap();

        let err = captured.into_result().unwrap_err();
        assert!(matches!(err, UniloadError::LoadFailed(ref d) if d.len() == 1));
    }

    #[test]
    fn clean_scope_yields_value() {
        let captured = capture("loading packages a", |_| Ok(Some("ok"))).unwrap();
        assert!(!captured.diagnostics.has_messages());
        assert_eq!(captured.into_result().unwrap(), "ok");
    }

    #[test]
    fn empty_scope_without_value_is_internal() {
        let captured: Captured<()> = capture("loading packages a", |_| Ok(None)).unwrap();
        assert!(matches!(
            captured.into_result(),
            Err(UniloadError::Internal(_))
        ));
    }

    #[test]
    fn body_fault_propagates_and_drops_messages() {
        let result: UniloadResult<Captured<()>> = capture("loading packages a", |d| {
            d.resolution_error("a", "recorded first");
            Err(UniloadError::User("fault".into()))
        });
        let err = result.unwrap_err();
        assert!(matches!(err, UniloadError::User(ref m) if m == "fault"));
        assert!(!err.to_string().contains("recorded first"));
    }

    #[test]
    fn format_messages_layout() {
        let mut d = Diagnostics::new("loading packages a,b");
        d.resolution_error("a", "package not found");
        d.build_error("b", "bad export");

        let text = d.format_messages();
        assert_eq!(
            text,
            "While loading packages a,b:\n  resolution error: a: package not found\n  build error: b: bad export\n"
        );
    }
}
