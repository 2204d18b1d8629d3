//! Diagnostics
//!
//! One reported problem: severity, location, message and the rule that
//! produced it.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// Identifier of the rule that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    MissingSection,
    TooManySections,
    SectionOrder,
    HeadingLevel,
    UnexpectedHeading,
    UnknownCallout,
    EmptyCallout,
    CalloutTitle,
    CalloutCount,
    CalloutHeadingLevel,
    LeadingBlock,
    Fixme,
    MissingMetadata,
    InvalidMetadata,
    UnknownMetadata,
    MissingGlossary,
    GlossaryContent,
    GlossaryReference,
    BrokenLink,
    MissingAnchor,
    MissingAsset,
    EmptyDocument,
    ParseError,
    UnreadableFile,
    MissingFile,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::MissingSection => "missing-section",
            RuleId::TooManySections => "too-many-sections",
            RuleId::SectionOrder => "section-order",
            RuleId::HeadingLevel => "heading-level",
            RuleId::UnexpectedHeading => "unexpected-heading",
            RuleId::UnknownCallout => "unknown-callout",
            RuleId::EmptyCallout => "empty-callout",
            RuleId::CalloutTitle => "callout-title",
            RuleId::CalloutCount => "callout-count",
            RuleId::CalloutHeadingLevel => "callout-heading-level",
            RuleId::LeadingBlock => "leading-block",
            RuleId::Fixme => "fixme",
            RuleId::MissingMetadata => "missing-metadata",
            RuleId::InvalidMetadata => "invalid-metadata",
            RuleId::UnknownMetadata => "unknown-metadata",
            RuleId::MissingGlossary => "missing-glossary",
            RuleId::GlossaryContent => "glossary-content",
            RuleId::GlossaryReference => "glossary-reference",
            RuleId::BrokenLink => "broken-link",
            RuleId::MissingAnchor => "missing-anchor",
            RuleId::MissingAsset => "missing-asset",
            RuleId::EmptyDocument => "empty-document",
            RuleId::ParseError => "parse-error",
            RuleId::UnreadableFile => "unreadable-file",
            RuleId::MissingFile => "missing-file",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic message for a validation issue
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub path: PathBuf,
    /// 1-based line; `None` when no position applies
    pub line: Option<usize>,
    pub message: String,
    pub rule: RuleId,
}

impl Diagnostic {
    pub fn error(
        path: &Path,
        line: Option<usize>,
        rule: RuleId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            path: path.to_path_buf(),
            line,
            message: message.into(),
            rule,
        }
    }

    pub fn warning(
        path: &Path,
        line: Option<usize>,
        rule: RuleId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.to_path_buf(),
            line,
            message: message.into(),
            rule,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Renders as `path:line: severity: message`
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        write!(f, ": {}: {}", self.severity, self.message)
    }
}
