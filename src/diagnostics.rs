//! Diagnostics for the Scope-Lift Pass
//!
//! Structured errors and warnings accumulated by the analysis stages.
//! Diagnostics never mutate prior stage output; fatal codes abort the
//! file's rewrite, warnings leave the offending reference untransformed
//! and let the build continue.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_PARSE: &str = "LIFT-ERR-PARSE";
pub const ERR_NESTED_DESTRUCTURE: &str = "LIFT-ERR-NESTED-DESTRUCTURE";
pub const ERR_ATTR_VALUE: &str = "LIFT-ERR-ATTR-VALUE";
pub const WARN_REASSIGNED: &str = "LIFT-WARN-REASSIGNED";
pub const WARN_CALLBACK: &str = "LIFT-WARN-CALLBACK";

/// Codes that abort the whole file's rewrite. `LIFT-ERR-ATTR-VALUE` is an
/// error too, but it is fatal only for the offending usage.
pub fn aborts_file(code: &str) -> bool {
    matches!(code, ERR_PARSE | ERR_NESTED_DESTRUCTURE)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPANS
// ═══════════════════════════════════════════════════════════════════════════════

/// Byte-offset span into the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: u32,
    pub end: u32,
}

impl TextSpan {
    pub fn new(start: u32, end: u32) -> Self {
        TextSpan { start, end }
    }

    pub fn contains_span(&self, other: TextSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl From<oxc_span::Span> for TextSpan {
    fn from(span: oxc_span::Span) -> Self {
        TextSpan {
            start: span.start,
            end: span.end,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTICS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: String,
    pub span: TextSpan,
    pub message: String,
}

/// Ordered collector shared by stages 4-7. Emission order is arbitrary;
/// `into_sorted` establishes the span order the host sees.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    file: String,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new(file: &str) -> Self {
        DiagnosticSink {
            file: file.to_string(),
            diagnostics: Vec::new(),
        }
    }

    pub fn error(&mut self, code: &str, span: TextSpan, message: String) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            code: code.to_string(),
            file: self.file.clone(),
            span,
            message,
        });
    }

    pub fn warning(&mut self, code: &str, span: TextSpan, message: String) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            code: code.to_string(),
            file: self.file.clone(),
            span,
            message,
        });
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(|d| aborts_file(&d.code))
    }

    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|d| (d.span.start, d.span.end));
        self.diagnostics
    }
}
