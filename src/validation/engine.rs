//! Validation Engine
//!
//! Per-document checks against a role schema. Every check is a pure function
//! of the block sequence and the schema; all of them always run.

use std::collections::BTreeMap;

use crate::core::{Diagnostic, Document, RuleId};
use crate::parser::{walk, Block, BlockKind, BlockRule};
use crate::schema::{RequiredSection, Schema};

/// Validate a document against the schema for its role
pub fn evaluate(document: &Document, schema: &Schema) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    check_sections(document, schema, &mut diagnostics);
    check_order(document, schema, &mut diagnostics);
    check_headings(document, schema, &mut diagnostics);
    check_callouts(document, schema, &mut diagnostics);
    check_callout_counts(document, schema, &mut diagnostics);
    check_leading(document, schema, &mut diagnostics);
    check_metadata(document, schema, &mut diagnostics);
    check_glossary(document, schema, &mut diagnostics);
    check_glossary_content(document, schema, &mut diagnostics);
    check_fixme(document, &mut diagnostics);

    diagnostics
}

/// Checks for documents whose role has no schema
pub fn evaluate_generic(document: &Document) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if document.is_empty() {
        diagnostics.push(Diagnostic::error(
            document.path(),
            None,
            RuleId::EmptyDocument,
            "Document is empty",
        ));
    }
    check_fixme(document, &mut diagnostics);
    diagnostics
}

fn section_label(section: &RequiredSection) -> String {
    match &section.callout {
        Some(kind) => format!("'{}' callout (.{})", section.heading, kind),
        None => format!("heading '{}'", section.heading),
    }
}

/// Every required section appears between `min` and `max` times
fn check_sections(document: &Document, schema: &Schema, out: &mut Vec<Diagnostic>) {
    for section in &schema.sections {
        let found: Vec<&Block> = document
            .blocks
            .iter()
            .filter(|b| section.matches(b))
            .collect();

        if found.len() < section.min {
            let message = if section.min == 1 {
                format!("Document is missing expected {}", section_label(section))
            } else {
                format!(
                    "Document needs at least {} of {}, found {}",
                    section.min,
                    section_label(section),
                    found.len()
                )
            };
            out.push(Diagnostic::error(
                document.path(),
                Some(document.end_line()),
                RuleId::MissingSection,
                message,
            ));
        }

        if let Some(max) = section.max {
            if let Some(excess) = found.get(max) {
                out.push(Diagnostic::error(
                    document.path(),
                    Some(excess.start_line),
                    RuleId::TooManySections,
                    format!(
                        "Document must not contain more than {} of {}, found {}",
                        max,
                        section_label(section),
                        found.len()
                    ),
                ));
            }
        }
    }
}

/// Sections appear in schema order
fn check_order(document: &Document, schema: &Schema, out: &mut Vec<Diagnostic>) {
    if !schema.ordered {
        return;
    }

    // Highest schema index seen so far
    let mut furthest: Option<usize> = None;

    for block in &document.blocks {
        let Some(idx) = schema.section_index(block) else {
            continue;
        };
        match furthest {
            Some(seen) if idx < seen => {
                let section = &schema.sections[idx];
                let after = &schema.sections[seen].heading;
                let message = match idx.checked_sub(1).map(|p| &schema.sections[p]) {
                    Some(predecessor) => format!(
                        "Section '{}' is out of order: it should follow '{}', not '{}'",
                        section.heading, predecessor.heading, after
                    ),
                    None => format!(
                        "Section '{}' is out of order: it should come first, not after '{}'",
                        section.heading, after
                    ),
                };
                out.push(Diagnostic::warning(
                    document.path(),
                    Some(block.start_line),
                    RuleId::SectionOrder,
                    message,
                ));
            }
            _ => furthest = Some(idx),
        }
    }
}

/// Heading levels and headings the template does not know about
fn check_headings(document: &Document, schema: &Schema, out: &mut Vec<Diagnostic>) {
    for heading in document.headings() {
        let BlockKind::Heading { level, text, .. } = &heading.kind else {
            continue;
        };

        if let Some(expected) = schema.heading_level {
            if *level != expected {
                out.push(Diagnostic::error(
                    document.path(),
                    Some(heading.start_line),
                    RuleId::HeadingLevel,
                    format!("Heading '{}' should be level {}", text, expected),
                ));
            }
        }

        if !schema.extra_headings && schema.section_index(heading).is_none() {
            out.push(Diagnostic::warning(
                document.path(),
                Some(heading.start_line),
                RuleId::UnexpectedHeading,
                format!(
                    "Heading '{}' is not part of the {} template",
                    text, schema.role
                ),
            ));
        }
    }
}

/// Callout kinds must be allowed for the role, callouts must have content,
/// and their titles must follow the callout rules
fn check_callouts(document: &Document, schema: &Schema, out: &mut Vec<Diagnostic>) {
    walk(&document.blocks, &mut |block| {
        let BlockKind::Callout {
            kind,
            title,
            title_level,
            body,
        } = &block.kind
        else {
            return;
        };
        let name = title.as_deref().unwrap_or(kind);

        if !schema.allows_callout(kind) {
            out.push(Diagnostic::error(
                document.path(),
                Some(block.start_line),
                RuleId::UnknownCallout,
                format!(
                    "Callout kind '{}' is not allowed in {} documents",
                    kind, schema.role
                ),
            ));
        }

        if body.is_empty() {
            out.push(Diagnostic::error(
                document.path(),
                Some(block.start_line),
                RuleId::EmptyCallout,
                format!("Callout '{}' should not be empty", name),
            ));
        }

        if let (Some(expected), Some(level)) = (schema.callout_heading_level, title_level) {
            if *level != expected {
                out.push(Diagnostic::error(
                    document.path(),
                    Some(block.start_line),
                    RuleId::CalloutHeadingLevel,
                    format!(
                        "Callout '{}' should have a level {} title heading, not level {}",
                        name, expected, level
                    ),
                ));
            }
        }

        for rule in schema.callout_rules_for(kind) {
            let Some(expected) = &rule.title else {
                continue;
            };
            if title.as_deref() != Some(expected.as_str()) {
                out.push(Diagnostic::error(
                    document.path(),
                    Some(block.start_line),
                    RuleId::CalloutTitle,
                    format!(
                        "Callout '.{}' should be titled '{}', found '{}'",
                        kind,
                        expected,
                        title.as_deref().unwrap_or("")
                    ),
                ));
            }
        }
    });
}

/// Top-level callouts of each ruled kind appear between `min` and `max` times
fn check_callout_counts(document: &Document, schema: &Schema, out: &mut Vec<Diagnostic>) {
    for rule in &schema.callout_rules {
        let found: Vec<&Block> = document
            .callouts()
            .filter(|b| matches!(&b.kind, BlockKind::Callout { kind, .. } if *kind == rule.kind))
            .collect();

        if found.len() < rule.min {
            out.push(Diagnostic::error(
                document.path(),
                Some(document.end_line()),
                RuleId::CalloutCount,
                format!(
                    "Document needs at least {} '.{}' callout(s), found {}",
                    rule.min,
                    rule.kind,
                    found.len()
                ),
            ));
        }

        if let Some(max) = rule.max {
            if let Some(excess) = found.get(max) {
                out.push(Diagnostic::error(
                    document.path(),
                    Some(excess.start_line),
                    RuleId::CalloutCount,
                    format!(
                        "Document must not contain more than {} '.{}' callout(s), found {}",
                        max,
                        rule.kind,
                        found.len()
                    ),
                ));
            }
        }
    }
}

/// The first content blocks have the expected kinds. Only the first
/// mismatch is reported.
fn check_leading(document: &Document, schema: &Schema, out: &mut Vec<Diagnostic>) {
    let mut content = document.blocks.iter().filter(|b| {
        !matches!(b.kind, BlockKind::Metadata { .. }) && b.rule != BlockRule::InlineLink
    });

    for (position, expected) in schema.leading.iter().enumerate() {
        match content.next() {
            Some(block) if expected.matches(block) => {}
            found => {
                out.push(Diagnostic::warning(
                    document.path(),
                    Some(found.map_or(document.end_line(), |b| b.start_line)),
                    RuleId::LeadingBlock,
                    format!(
                        "Block {} of the document should be {}",
                        position + 1,
                        expected
                    ),
                ));
                return;
            }
        }
    }
}

/// Required metadata keys are present and well-formed
fn check_metadata(document: &Document, schema: &Schema, out: &mut Vec<Diagnostic>) {
    let mut present: BTreeMap<&str, (&str, usize)> = BTreeMap::new();
    for (key, value, line) in document.metadata() {
        present.entry(key).or_insert((value, line));

        if !schema.knows_metadata(key) {
            out.push(Diagnostic::warning(
                document.path(),
                Some(line),
                RuleId::UnknownMetadata,
                format!("Unrecognized metadata key '{}'", key),
            ));
        }
    }

    for field in &schema.metadata {
        match present.get(field.key.as_str()) {
            None => out.push(Diagnostic::error(
                document.path(),
                Some(1),
                RuleId::MissingMetadata,
                format!("Missing required metadata key '{}'", field.key),
            )),
            Some((value, line)) => {
                if let Err(message) = field.kind.validate(&field.key, value) {
                    out.push(Diagnostic::error(
                        document.path(),
                        Some(*line),
                        RuleId::InvalidMetadata,
                        message,
                    ));
                }
            }
        }
    }
}

/// Glossary documents must define at least one term
fn check_glossary(document: &Document, schema: &Schema, out: &mut Vec<Diagnostic>) {
    if schema.glossary && document.defined_terms().is_empty() {
        out.push(Diagnostic::error(
            document.path(),
            Some(document.end_line()),
            RuleId::MissingGlossary,
            "Document has no glossary entries (definition list)",
        ));
    }
}

/// Only definitions may appear under the glossary heading
fn check_glossary_content(document: &Document, schema: &Schema, out: &mut Vec<Diagnostic>) {
    let Some(glossary) = &schema.glossary_heading else {
        return;
    };

    let mut inside = false;
    for block in &document.blocks {
        match &block.kind {
            BlockKind::Heading { text, .. } => inside = text == glossary,
            BlockKind::Definition { .. } => {}
            _ if !inside || block.rule == BlockRule::InlineLink => {}
            _ => out.push(Diagnostic::error(
                document.path(),
                Some(block.start_line),
                RuleId::GlossaryContent,
                format!("Only definitions may appear under the '{}' heading", glossary),
            )),
        }
    }
}

/// FIXME markers, in any case, are left-over editing notes
fn check_fixme(document: &Document, out: &mut Vec<Diagnostic>) {
    for &line in document.fixme_lines() {
        out.push(Diagnostic::error(
            document.path(),
            Some(line),
            RuleId::Fixme,
            "Line contains a FIXME marker",
        ));
    }
}
