//! Schema Types
//!
//! Rule file structure (matches TOML) and the runtime schema built from it.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::core::Role;
use crate::parser::{Block, BlockKind};

/// Root rule file structure (matches TOML)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SchemaFile {
    #[serde(default)]
    pub lesson: LessonRules,
    /// Ordered filename patterns; first match wins
    #[serde(default)]
    pub classify: Vec<ClassifyRule>,
    #[serde(default)]
    pub schemas: Vec<SchemaDef>,
}

/// Rules that apply to the lesson as a whole
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LessonRules {
    /// File stem of the glossary document targeted by glossary links
    #[serde(default = "default_glossary")]
    pub glossary: String,
    /// Glob patterns (`*`, `?`) that must each match a file in the root
    #[serde(default)]
    pub required_files: Vec<String>,
}

impl Default for LessonRules {
    fn default() -> Self {
        Self {
            glossary: default_glossary(),
            required_files: Vec::new(),
        }
    }
}

fn default_glossary() -> String {
    "reference".to_string()
}

/// One row of the filename → role table
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClassifyRule {
    pub pattern: String,
    pub role: Role,
}

/// Schema definition for one role
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SchemaDef {
    pub role: Role,
    /// Whether required sections must appear in the listed order
    #[serde(default)]
    pub ordered: bool,
    /// Whether headings outside the section list are tolerated
    #[serde(default = "default_true")]
    pub extra_headings: bool,
    /// Level every top-level heading must have
    pub heading_level: Option<u8>,
    #[serde(default)]
    pub sections: Vec<RequiredSection>,
    /// Callout kinds allowed in addition to those named by sections
    #[serde(default)]
    pub callouts: Vec<String>,
    #[serde(default)]
    pub metadata: Vec<MetadataField>,
    #[serde(default)]
    pub optional_metadata: Vec<String>,
    /// Document must contain a definition list
    #[serde(default)]
    pub glossary: bool,
    /// Heading under which only definitions may appear
    pub glossary_heading: Option<String>,
    /// Level the title heading of every callout must have
    pub callout_heading_level: Option<u8>,
    /// Title and count constraints per callout kind
    #[serde(default)]
    pub callout_rules: Vec<CalloutRule>,
    /// What the first content blocks must be, in order
    #[serde(default)]
    pub leading: Vec<LeadingBlock>,
}

fn default_true() -> bool {
    true
}

fn default_min() -> usize {
    1
}

/// A section the document must contain
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RequiredSection {
    /// Heading text (or prefix), also used to name the section in reports
    pub heading: String,
    #[serde(default, rename = "match")]
    pub match_mode: MatchMode,
    /// When set, a callout of this kind satisfies the section
    pub callout: Option<String>,
    #[serde(default = "default_min")]
    pub min: usize,
    pub max: Option<usize>,
}

/// Constraints on the callouts of one kind
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CalloutRule {
    pub kind: String,
    /// Exact title the callout heading must carry
    pub title: Option<String>,
    #[serde(default)]
    pub min: usize,
    pub max: Option<usize>,
}

/// Expected top-level block near the start of a document, written as
/// `paragraph` or `.kind` in rule files
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String")]
pub enum LeadingBlock {
    Paragraph,
    Callout(String),
}

impl TryFrom<String> for LeadingBlock {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.strip_prefix('.') {
            Some(kind) if !kind.is_empty() => Ok(LeadingBlock::Callout(kind.to_string())),
            None if value == "paragraph" => Ok(LeadingBlock::Paragraph),
            _ => Err(format!(
                "unknown leading block '{}', expected 'paragraph' or '.kind'",
                value
            )),
        }
    }
}

impl fmt::Display for LeadingBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadingBlock::Paragraph => f.write_str("a paragraph"),
            LeadingBlock::Callout(kind) => write!(f, "a '.{}' callout", kind),
        }
    }
}

impl LeadingBlock {
    pub fn matches(&self, block: &Block) -> bool {
        match (self, &block.kind) {
            (LeadingBlock::Paragraph, BlockKind::Paragraph { .. }) => true,
            (LeadingBlock::Callout(wanted), BlockKind::Callout { kind, .. }) => wanted == kind,
            _ => false,
        }
    }
}

/// How a heading is compared with a section
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Exact,
    /// For numbered sections like "Exercise 1", "Exercise 2"
    Prefix,
}

/// A required metadata key
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MetadataField {
    pub key: String,
    #[serde(default)]
    pub kind: ValueKind,
}

/// Value format of a metadata entry
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Any non-blank text
    #[default]
    String,
    Number,
}

/// Runtime schema (optimized for lookups)
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub role: Role,
    pub ordered: bool,
    pub extra_headings: bool,
    pub heading_level: Option<u8>,
    pub sections: Vec<RequiredSection>,
    pub callouts: BTreeSet<String>,
    pub metadata: Vec<MetadataField>,
    pub optional_metadata: BTreeSet<String>,
    pub glossary: bool,
    pub glossary_heading: Option<String>,
    pub callout_heading_level: Option<u8>,
    pub callout_rules: Vec<CalloutRule>,
    pub leading: Vec<LeadingBlock>,
}

impl From<SchemaDef> for Schema {
    fn from(def: SchemaDef) -> Self {
        // Kinds named by required sections or callout rules are always allowed
        let callouts = def
            .callouts
            .into_iter()
            .chain(def.sections.iter().filter_map(|s| s.callout.clone()))
            .chain(def.callout_rules.iter().map(|r| r.kind.clone()))
            .collect();

        Self {
            role: def.role,
            ordered: def.ordered,
            extra_headings: def.extra_headings,
            heading_level: def.heading_level,
            sections: def.sections,
            callouts,
            metadata: def.metadata,
            optional_metadata: def.optional_metadata.into_iter().collect(),
            glossary: def.glossary,
            glossary_heading: def.glossary_heading,
            callout_heading_level: def.callout_heading_level,
            callout_rules: def.callout_rules,
            leading: def.leading,
        }
    }
}

impl Schema {
    pub fn allows_callout(&self, kind: &str) -> bool {
        self.callouts.contains(kind)
    }

    /// Whether `key` is a metadata key this schema knows about
    pub fn knows_metadata(&self, key: &str) -> bool {
        self.optional_metadata.contains(key) || self.metadata.iter().any(|m| m.key == key)
    }

    /// Rules that apply to callouts of `kind`
    pub fn callout_rules_for<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a CalloutRule> {
        self.callout_rules.iter().filter(move |r| r.kind == kind)
    }

    /// Index of the first section a block satisfies
    pub fn section_index(&self, block: &Block) -> Option<usize> {
        self.sections.iter().position(|s| s.matches(block))
    }
}

impl RequiredSection {
    /// Check if a heading text satisfies this section
    pub fn matches_heading(&self, text: &str) -> bool {
        match self.match_mode {
            MatchMode::Exact => text == self.heading,
            MatchMode::Prefix => text.starts_with(&self.heading),
        }
    }

    /// Check if a block satisfies this section
    pub fn matches(&self, block: &Block) -> bool {
        match (&self.callout, &block.kind) {
            (Some(wanted), BlockKind::Callout { kind, .. }) => wanted == kind,
            (None, BlockKind::Heading { text, .. }) => self.matches_heading(text),
            _ => false,
        }
    }
}

impl ValueKind {
    /// Validate a metadata value
    pub fn validate(&self, key: &str, value: &str) -> Result<(), String> {
        match self {
            ValueKind::String => {
                if value.trim().is_empty() {
                    return Err(format!("Metadata key '{}' must not be empty", key));
                }
            }
            ValueKind::Number => {
                value.trim().parse::<f64>().map_err(|_| {
                    format!("Metadata key '{}' expects a number, got '{}'", key, value)
                })?;
            }
        }
        Ok(())
    }
}
