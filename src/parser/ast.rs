//! Block model for lesson documents
//!
//! Plain data produced by the block parser. No validation logic lives here.

/// A block-level element with its line provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    /// First source line (1-based, inclusive)
    pub start_line: usize,
    /// Last source line (1-based, inclusive)
    pub end_line: usize,
    /// Which parsing rule produced this block
    pub rule: BlockRule,
}

/// The kinds of block the loader recognizes
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Heading {
        level: u8,
        /// Heading text with trailing `{...}` attributes removed
        text: String,
        /// Explicit `{#id}` attribute
        id: Option<String>,
        /// `{.class}` attributes
        classes: Vec<String>,
    },
    Paragraph {
        text: String,
    },
    List {
        ordered: bool,
        items: usize,
    },
    CodeBlock {
        language: Option<String>,
    },
    /// A block quote that carries a callout kind
    Callout {
        kind: String,
        title: Option<String>,
        /// Level of the title heading
        title_level: Option<u8>,
        /// Inner blocks, title heading excluded
        body: Vec<Block>,
    },
    /// A block quote that is not a callout
    BlockQuote {
        body: Vec<Block>,
    },
    Link {
        text: String,
        target: String,
    },
    Image {
        alt: String,
        target: String,
    },
    Metadata {
        key: String,
        value: String,
    },
    /// Definition-list entry (glossary term)
    Definition {
        term: String,
        text: String,
    },
    ThematicBreak,
}

/// Parsing rule that matched a block.
///
/// Where a construct is ambiguous the earliest rule wins; this records which
/// one did so a diagnostic can explain the block's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRule {
    Preamble,
    AtxHeading,
    SetextHeading,
    FencedCode,
    IndentedCode,
    ThematicBreak,
    BlockQuote,
    /// Callout kind taken from a `{: .kind}` line after the quote
    CalloutAnnotation,
    /// Callout kind taken from a `{.kind}` class on the title heading
    CalloutClass,
    /// Callout kind inferred from a well-known title
    CalloutTitle,
    List,
    LinkDefinition,
    DefinitionList,
    Paragraph,
    InlineLink,
}

impl Block {
    pub fn new(kind: BlockKind, start_line: usize, end_line: usize, rule: BlockRule) -> Self {
        Self {
            kind,
            start_line,
            end_line,
            rule,
        }
    }

    /// Heading text if this block is a heading
    pub fn heading_text(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Heading { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Nested blocks for quotes and callouts
    pub fn children(&self) -> &[Block] {
        match &self.kind {
            BlockKind::Callout { body, .. } | BlockKind::BlockQuote { body } => body,
            _ => &[],
        }
    }
}

/// Depth-first walk over blocks and their nested bodies
pub fn walk<'a>(blocks: &'a [Block], visit: &mut impl FnMut(&'a Block)) {
    for block in blocks {
        visit(block);
        walk(block.children(), visit);
    }
}
