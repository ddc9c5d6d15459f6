//! Diagnostics produced while lexing, parsing, linking and validating, plus
//! the fatal error types used when a compilation unit cannot be loaded.

use crate::ast::Span;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

/// Which stage raised a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    Lex,
    Syntax,
    IllegalStatement,
    UnresolvedReference,
    AmbiguousReference,
    MissingVersion,
}

impl DiagnosticKind {
    /// Syntax-class diagnostics are the ones counted as parser errors.
    pub fn is_syntax(self) -> bool {
        matches!(
            self,
            DiagnosticKind::Lex | DiagnosticKind::Syntax | DiagnosticKind::IllegalStatement
        )
    }
}

/// A single `(severity, message, span)` entry on the diagnostics channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub file: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        kind: DiagnosticKind,
        file: &str,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            severity,
            kind,
            message: message.into(),
            file: file.to_owned(),
            span,
        }
    }

    pub fn lex(file: &str, span: Span, message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Error, DiagnosticKind::Lex, file, span, message)
    }

    pub fn syntax(file: &str, span: Span, message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Error, DiagnosticKind::Syntax, file, span, message)
    }

    pub fn illegal(file: &str, span: Span, message: impl Into<String>) -> Self {
        Diagnostic::new(
            Severity::Error,
            DiagnosticKind::IllegalStatement,
            file,
            span,
            message,
        )
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.file, self.span.line, self.severity, self.message
        )
    }
}

/// Failure to assemble a compilation unit from disk or memory.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot list sources under '{path}': {source}")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no .{extension} sources found under the given paths")]
    Empty { extension: String },
}
