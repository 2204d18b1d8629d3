//! Diagnostic aggregation and rendering

use serde::Serialize;

use super::diagnostics::{Diagnostic, Severity};

/// Terminal output of a validation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Sorted and deduplicated diagnostics
    pub diagnostics: Vec<Diagnostic>,
    /// True iff no diagnostic is an error
    pub pass: bool,
    /// Number of documents that were checked
    pub documents: usize,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
            pass: true,
            documents: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.pass
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Plain text report, one diagnostic per line
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for diagnostic in &self.diagnostics {
            out.push_str(&diagnostic.to_string());
            out.push('\n');
        }
        out
    }

    /// Machine-readable report
    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Merge per-document diagnostic lists into one deterministic result.
///
/// Sorted by path, then line (line-less first), then rule identifier;
/// identical diagnostics collapse into one.
pub fn aggregate<I>(lists: I) -> ValidationResult
where
    I: IntoIterator<Item = Vec<Diagnostic>>,
{
    let mut diagnostics: Vec<Diagnostic> = lists.into_iter().flatten().collect();

    diagnostics.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then(a.line.cmp(&b.line))
            .then_with(|| a.rule.as_str().cmp(b.rule.as_str()))
            .then_with(|| a.message.cmp(&b.message))
            .then(a.severity.cmp(&b.severity))
    });
    diagnostics.dedup();

    let pass = !diagnostics.iter().any(Diagnostic::is_error);
    ValidationResult {
        diagnostics,
        pass,
        documents: 0,
    }
}
