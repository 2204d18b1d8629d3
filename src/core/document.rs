//! Lesson Documents
//!
//! A parsed document together with the role that selects its schema.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, UnknownRoleError};
use crate::parser::inline::{heading_anchor, term_fragment};
use crate::parser::{self, walk, Block, BlockKind};

/// Category of a lesson document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Home,
    Episode,
    Reference,
    Discussion,
    Instructors,
    Faq,
    Other,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Home,
        Role::Episode,
        Role::Reference,
        Role::Discussion,
        Role::Instructors,
        Role::Faq,
        Role::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Home => "home",
            Role::Episode => "episode",
            Role::Reference => "reference",
            Role::Discussion => "discussion",
            Role::Instructors => "instructors",
            Role::Faq => "faq",
            Role::Other => "other",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == lower)
            .ok_or_else(|| UnknownRoleError(s.to_string()))
    }
}

/// A parsed lesson document. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: PathBuf,
    pub role: Role,
    pub blocks: Vec<Block>,
    line_count: usize,
    /// Lines containing a FIXME marker, in any case
    fixme_lines: Vec<usize>,
}

impl Document {
    /// Parse `text` into a document
    pub fn load(path: impl Into<PathBuf>, role: Role, text: &str) -> Result<Self, ParseError> {
        let blocks = parser::parse_document(text)?;
        let mut document = Self::from_blocks(path, role, blocks, text.lines().count());
        document.fixme_lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| line.to_lowercase().contains("fixme"))
            .map(|(idx, _)| idx + 1)
            .collect();
        Ok(document)
    }

    /// Build a document from an existing block sequence
    pub fn from_blocks(
        path: impl Into<PathBuf>,
        role: Role,
        blocks: Vec<Block>,
        line_count: usize,
    ) -> Self {
        Self {
            path: path.into(),
            role,
            blocks,
            line_count,
            fixme_lines: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Line number of the end of the document (at least 1)
    pub fn end_line(&self) -> usize {
        let last_block = self.blocks.iter().map(|b| b.end_line).max().unwrap_or(0);
        self.line_count.max(last_block).max(1)
    }

    pub fn fixme_lines(&self) -> &[usize] {
        &self.fixme_lines
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Top-level headings in document order
    pub fn headings(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.heading_text().is_some())
    }

    /// Top-level callouts in document order
    pub fn callouts(&self) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(|b| matches!(b.kind, BlockKind::Callout { .. }))
    }

    /// Metadata key/value pairs with their line
    pub fn metadata(&self) -> impl Iterator<Item = (&str, &str, usize)> {
        self.blocks.iter().filter_map(|b| match &b.kind {
            BlockKind::Metadata { key, value } => Some((key.as_str(), value.as_str(), b.start_line)),
            _ => None,
        })
    }

    /// Every link and image, including those nested in quotes and callouts
    pub fn references(&self) -> Vec<&Block> {
        let mut found = Vec::new();
        walk(&self.blocks, &mut |b| {
            if matches!(b.kind, BlockKind::Link { .. } | BlockKind::Image { .. }) {
                found.push(b);
            }
        });
        found
    }

    /// Glossary terms defined in this document
    pub fn defined_terms(&self) -> Vec<&str> {
        let mut terms = Vec::new();
        walk(&self.blocks, &mut |b| {
            if let BlockKind::Definition { term, .. } = &b.kind {
                terms.push(term.as_str());
            }
        });
        terms
    }

    /// Fragment identifiers a link may target in this document
    pub fn anchors(&self) -> BTreeSet<String> {
        let mut anchors = BTreeSet::new();
        walk(&self.blocks, &mut |b| match &b.kind {
            BlockKind::Heading { text, id, .. } => {
                anchors.insert(id.clone().unwrap_or_else(|| heading_anchor(text)));
            }
            BlockKind::Definition { term, .. } => {
                anchors.insert(term_fragment(term));
            }
            _ => {}
        });
        anchors
    }
}
