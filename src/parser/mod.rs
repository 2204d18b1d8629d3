//! Lesson Document Parser
//!
//! Line-oriented, single-pass splitting of lesson markup into blocks.
//! The lexer classifies lines; this module assembles them into blocks.

pub mod ast;
pub mod inline;
pub mod lexer;

pub use ast::{walk, Block, BlockKind, BlockRule};
pub use lexer::{classify_line, LineKind};

use serde_yaml::Value;

use crate::error::ParseError;
use inline::{find_links_in_lines, split_attributes};

/// Well-known callout titles and the kind they imply
const CALLOUT_TITLES: &[(&str, &str)] = &[
    ("prerequisites", "prereq"),
    ("learning objectives", "objectives"),
    ("objectives", "objectives"),
    ("key points", "keypoints"),
    ("challenge", "challenge"),
    ("callout", "callout"),
    ("discussion", "discussion"),
    ("solution", "solution"),
];

/// Parse a whole document, including the metadata preamble
pub fn parse_document(text: &str) -> Result<Vec<Block>, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();

    let mut body_start = 0;
    if lines.first().map(|l| l.trim_end()) == Some("---") {
        body_start = parse_preamble(&lines, &mut blocks)?;
    }

    blocks.extend(parse_blocks(&lines[body_start..], body_start + 1)?);
    Ok(blocks)
}

/// Parse the `---` delimited YAML preamble into one `Metadata` block per
/// top-level key. Returns the index of the first line after it.
fn parse_preamble(lines: &[&str], blocks: &mut Vec<Block>) -> Result<usize, ParseError> {
    let close = lines
        .iter()
        .skip(1)
        .position(|line| matches!(line.trim(), "---" | "..."))
        .map(|offset| offset + 1)
        .ok_or_else(|| ParseError::new(1, "metadata preamble is never closed"))?;

    let span = &lines[1..close];
    let source = span.join("\n");
    let value: Value = serde_yaml::from_str(&source).map_err(|err| {
        // Locations are 1-based within the span, which starts on line 2
        let line = err.location().map_or(2, |loc| loc.line() + 1);
        ParseError::new(line, "metadata preamble is not valid YAML")
    })?;

    let mapping = match value {
        Value::Null => return Ok(close + 1),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(ParseError::new(
                2,
                "metadata preamble is not a mapping of keys to values",
            ));
        }
    };

    let key_lines = top_level_key_lines(span);
    for (key, value) in &mapping {
        let key = render_value(key);
        let line_no = key_lines
            .iter()
            .find(|(name, _)| *name == key)
            .map_or(2, |(_, line_no)| *line_no);
        blocks.push(Block::new(
            BlockKind::Metadata {
                value: render_value(value),
                key,
            },
            line_no,
            line_no,
            BlockRule::Preamble,
        ));
    }
    Ok(close + 1)
}

/// Source line of each unindented `key:` line in the preamble span
fn top_level_key_lines<'a>(span: &[&'a str]) -> Vec<(&'a str, usize)> {
    span.iter()
        .enumerate()
        .filter(|(_, line)| !line.starts_with([' ', '\t', '-', '#']))
        .filter_map(|(offset, &line)| {
            let (key, _) = line.split_once(':')?;
            Some((key.trim().trim_matches(['"', '\'']), offset + 2))
        })
        .collect()
}

/// Text form of a metadata value. Lists become comma-separated, nested
/// mappings keep their YAML form.
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Sequence(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Tagged(tagged) => render_value(&tagged.value),
        Value::Mapping(_) => serde_yaml::to_string(value)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Parse a run of lines into blocks. `first_line` is the 1-based source line
/// number of `lines[0]`.
pub fn parse_blocks(lines: &[&str], first_line: usize) -> Result<Vec<Block>, ParseError> {
    let mut parser = BlockParser::new(first_line);
    parser.run(lines)?;
    Ok(parser.finish())
}

/// Paragraph lines waiting for a terminating line
struct PendingParagraph {
    start: usize,
    lines: Vec<String>,
}

struct BlockParser {
    first_line: usize,
    blocks: Vec<Block>,
    paragraph: Option<PendingParagraph>,
    /// Whether the previous line was blank
    after_blank: bool,
}

impl BlockParser {
    fn new(first_line: usize) -> Self {
        Self {
            first_line,
            blocks: Vec::new(),
            paragraph: None,
            after_blank: false,
        }
    }

    fn line_no(&self, idx: usize) -> usize {
        self.first_line + idx
    }

    fn run(&mut self, lines: &[&str]) -> Result<(), ParseError> {
        let mut idx = 0;
        while idx < lines.len() {
            let line = lines[idx];
            let kind = classify_line(line);
            let was_blank = matches!(kind, LineKind::Blank);

            idx = match kind {
                LineKind::Blank => {
                    self.flush_paragraph();
                    idx + 1
                }
                LineKind::Fence { marker, len, info } => {
                    self.flush_paragraph();
                    self.fenced_code(lines, idx, marker, len, info)?
                }
                LineKind::AtxHeading { level, text } => {
                    self.flush_paragraph();
                    let line_no = self.line_no(idx);
                    self.push_heading(level, text, line_no, line_no, BlockRule::AtxHeading);
                    idx + 1
                }
                LineKind::SetextUnderline { level } => self.setext_or_break(line, idx, level),
                LineKind::ThematicBreak => {
                    self.flush_paragraph();
                    let line_no = self.line_no(idx);
                    self.blocks.push(Block::new(
                        BlockKind::ThematicBreak,
                        line_no,
                        line_no,
                        BlockRule::ThematicBreak,
                    ));
                    idx + 1
                }
                LineKind::Quote => {
                    self.flush_paragraph();
                    self.block_quote(lines, idx)?
                }
                LineKind::ListItem { ordered } => {
                    self.flush_paragraph();
                    self.list(lines, idx, ordered)
                }
                LineKind::LinkDefinition { label, target } => {
                    self.flush_paragraph();
                    let line_no = self.line_no(idx);
                    self.blocks.push(Block::new(
                        BlockKind::Link {
                            text: label.to_string(),
                            target: target.to_string(),
                        },
                        line_no,
                        line_no,
                        BlockRule::LinkDefinition,
                    ));
                    idx + 1
                }
                LineKind::DefinitionItem { text } => self.definition(lines, idx, text),
                LineKind::ClassAnnotation { classes } => {
                    self.flush_paragraph();
                    self.annotate_previous(&classes);
                    idx + 1
                }
                LineKind::Indented if self.paragraph.is_none() => self.indented_code(lines, idx),
                LineKind::Indented | LineKind::Text => {
                    let line_no = self.line_no(idx);
                    self.paragraph
                        .get_or_insert_with(|| PendingParagraph {
                            start: line_no,
                            lines: Vec::new(),
                        })
                        .lines
                        .push(line.trim().to_string());
                    idx + 1
                }
            };

            self.after_blank = was_blank;
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_paragraph();
        self.blocks
    }

    fn flush_paragraph(&mut self) {
        let Some(para) = self.paragraph.take() else {
            return;
        };
        let end = para.start + para.lines.len() - 1;
        self.blocks.push(Block::new(
            BlockKind::Paragraph {
                text: para.lines.join("\n"),
            },
            para.start,
            end,
            BlockRule::Paragraph,
        ));
        self.push_inline_links(&para.lines, para.start);
    }

    /// Link and image blocks for a run of lines starting at `first_line`
    fn push_inline_links<S: AsRef<str>>(&mut self, lines: &[S], first_line: usize) {
        for (offset, found) in find_links_in_lines(lines) {
            let kind = if found.is_image {
                BlockKind::Image {
                    alt: found.text,
                    target: found.target,
                }
            } else {
                BlockKind::Link {
                    text: found.text,
                    target: found.target,
                }
            };
            let line_no = first_line + offset;
            self.blocks
                .push(Block::new(kind, line_no, line_no, BlockRule::InlineLink));
        }
    }

    fn push_heading(&mut self, level: u8, raw: &str, start: usize, end: usize, rule: BlockRule) {
        let (text, attrs) = split_attributes(raw);
        self.blocks.push(Block::new(
            BlockKind::Heading {
                level,
                text,
                id: attrs.id,
                classes: attrs.classes,
            },
            start,
            end,
            rule,
        ));
        self.push_inline_links(&[raw], end);
    }

    fn fenced_code(
        &mut self,
        lines: &[&str],
        idx: usize,
        marker: char,
        len: usize,
        info: &str,
    ) -> Result<usize, ParseError> {
        let start = self.line_no(idx);
        let close = lines[idx + 1..].iter().position(|line| {
            matches!(
                classify_line(line),
                LineKind::Fence { marker: m, len: l, info: "" } if m == marker && l >= len
            )
        });
        let Some(offset) = close else {
            return Err(ParseError::new(start, "code fence is never closed"));
        };

        let close_idx = idx + 1 + offset;
        self.blocks.push(Block::new(
            BlockKind::CodeBlock {
                language: fence_language(info),
            },
            start,
            self.line_no(close_idx),
            BlockRule::FencedCode,
        ));
        Ok(close_idx + 1)
    }

    fn indented_code(&mut self, lines: &[&str], idx: usize) -> usize {
        let mut end = idx;
        let mut next = idx + 1;
        while next < lines.len() {
            match classify_line(lines[next]) {
                LineKind::Indented => {
                    end = next;
                    next += 1;
                }
                LineKind::Blank => next += 1,
                _ => break,
            }
        }
        self.blocks.push(Block::new(
            BlockKind::CodeBlock { language: None },
            self.line_no(idx),
            self.line_no(end),
            BlockRule::IndentedCode,
        ));
        end + 1
    }

    /// A `===`/`---` line turns the pending paragraph into a heading. Without
    /// one, `---` is a thematic break and anything else is plain text.
    fn setext_or_break(&mut self, line: &str, idx: usize, level: u8) -> usize {
        let line_no = self.line_no(idx);
        if let Some(para) = self.paragraph.take() {
            let text = para.lines.join(" ");
            self.push_heading(level, &text, para.start, line_no, BlockRule::SetextHeading);
        } else if level == 2 && line.trim().len() >= 3 {
            self.blocks.push(Block::new(
                BlockKind::ThematicBreak,
                line_no,
                line_no,
                BlockRule::ThematicBreak,
            ));
        } else {
            self.paragraph = Some(PendingParagraph {
                start: line_no,
                lines: vec![line.trim().to_string()],
            });
        }
        idx + 1
    }

    fn block_quote(&mut self, lines: &[&str], idx: usize) -> Result<usize, ParseError> {
        let start = self.line_no(idx);
        let mut end_idx = idx;
        while end_idx + 1 < lines.len() {
            match classify_line(lines[end_idx + 1]) {
                LineKind::Quote => end_idx += 1,
                // Lazy continuation of a quoted paragraph
                LineKind::Text
                    if matches!(
                        classify_line(lexer::strip_quote_marker(lines[end_idx])),
                        LineKind::Text
                    ) =>
                {
                    end_idx += 1
                }
                _ => break,
            }
        }

        let inner: Vec<&str> = lines[idx..=end_idx]
            .iter()
            .map(|line| lexer::strip_quote_marker(line))
            .collect();
        let mut body = parse_blocks(&inner, start)?;

        // A `{: .kind}` line right after the quote names its callout kind
        let mut next = end_idx + 1;
        let mut annotation = None;
        if let Some(line) = lines.get(next) {
            if let LineKind::ClassAnnotation { classes } = classify_line(line) {
                annotation = classes.first().map(|c| c.to_string());
                next += 1;
            }
        }
        let end = self.line_no(next - 1);

        let title = match body.first() {
            Some(Block {
                kind:
                    BlockKind::Heading {
                        level,
                        text,
                        classes,
                        ..
                    },
                ..
            }) => Some((text.clone(), *level, classes.first().cloned())),
            _ => None,
        };

        let callout = match (&annotation, &title) {
            (Some(kind), _) => Some((kind.clone(), BlockRule::CalloutAnnotation)),
            (None, Some((_, _, Some(class)))) => Some((class.clone(), BlockRule::CalloutClass)),
            (None, Some((text, _, None))) => {
                callout_kind_for_title(text).map(|kind| (kind.to_string(), BlockRule::CalloutTitle))
            }
            (None, None) => None,
        };

        let block = match callout {
            Some((kind, rule)) => {
                if title.is_some() {
                    body.remove(0);
                }
                Block::new(
                    BlockKind::Callout {
                        kind,
                        title_level: title.as_ref().map(|(_, level, _)| *level),
                        title: title.map(|(text, _, _)| text),
                        body,
                    },
                    start,
                    end,
                    rule,
                )
            }
            None => Block::new(BlockKind::BlockQuote { body }, start, end, BlockRule::BlockQuote),
        };
        self.blocks.push(block);
        Ok(next)
    }

    fn list(&mut self, lines: &[&str], idx: usize, ordered: bool) -> usize {
        let base_indent = lexer::indent_width(lines[idx]);
        let mut items = 1;
        let mut end = idx;
        let mut next = idx + 1;
        let mut blank_run = false;

        while next < lines.len() {
            let line = lines[next];
            let indent = lexer::indent_width(line);
            match classify_line(line) {
                LineKind::Blank => {
                    blank_run = true;
                    next += 1;
                    continue;
                }
                LineKind::ListItem { ordered: o } if indent <= base_indent && o == ordered => {
                    items += 1;
                }
                _ if indent > base_indent => {}
                LineKind::Text | LineKind::Indented if !blank_run => {}
                _ => break,
            }
            blank_run = false;
            end = next;
            next += 1;
        }

        self.blocks.push(Block::new(
            BlockKind::List { ordered, items },
            self.line_no(idx),
            self.line_no(end),
            BlockRule::List,
        ));
        self.push_inline_links(&lines[idx..=end], self.line_no(idx));
        end + 1
    }

    /// `: text` after a one-line paragraph makes that line a defined term
    fn definition(&mut self, lines: &[&str], idx: usize, text: &str) -> usize {
        let term = match self.paragraph.take() {
            Some(para) if para.lines.len() == 1 => Some((para.start, para.lines[0].clone())),
            Some(para) => {
                self.paragraph = Some(para);
                None
            }
            None if self.after_blank => self.take_term_paragraph(),
            None => None,
        };

        let Some((start, term)) = term else {
            // Not a definition list after all; keep the line as text
            let line_no = self.line_no(idx);
            self.paragraph
                .get_or_insert_with(|| PendingParagraph {
                    start: line_no,
                    lines: Vec::new(),
                })
                .lines
                .push(lines[idx].trim().to_string());
            return idx + 1;
        };

        let mut body = vec![text.to_string()];
        let mut end = idx;
        while end + 1 < lines.len()
            && matches!(classify_line(lines[end + 1]), LineKind::Indented)
        {
            end += 1;
            body.push(lines[end].trim().to_string());
        }

        self.blocks.push(Block::new(
            BlockKind::Definition {
                term: term.clone(),
                text: body.join(" "),
            },
            start,
            self.line_no(end),
            BlockRule::DefinitionList,
        ));
        self.push_inline_links(&lines[idx..=end], self.line_no(idx));
        end + 1
    }

    /// Reclaim the last block as a term when it is a one-line paragraph
    /// (pandoc allows a blank line between term and definition)
    fn take_term_paragraph(&mut self) -> Option<(usize, String)> {
        let para_idx = self
            .blocks
            .iter()
            .rposition(|b| b.rule != BlockRule::InlineLink)?;
        let (start, term) = match &self.blocks[para_idx] {
            Block {
                kind: BlockKind::Paragraph { text },
                start_line,
                end_line,
                ..
            } if start_line == end_line => (*start_line, text.clone()),
            _ => return None,
        };
        // Links found in the term stay, the paragraph itself goes
        self.blocks.remove(para_idx);
        Some((start, term))
    }

    /// Apply a stray `{: .class}` line to the block above it. Only code
    /// blocks take anything from it (`.language-xxx`).
    fn annotate_previous(&mut self, classes: &[&str]) {
        let language = classes
            .iter()
            .find_map(|c| c.strip_prefix("language-"))
            .map(str::to_string);
        if let Some(Block {
            kind: BlockKind::CodeBlock { language: lang @ None },
            ..
        }) = self.blocks.last_mut()
        {
            *lang = language;
        }
    }
}

fn fence_language(info: &str) -> Option<String> {
    let word = info.split_whitespace().next()?;
    let word = word.trim_start_matches('{').trim_end_matches('}');
    let word = word.strip_prefix('.').unwrap_or(word);
    let word = word.strip_prefix("language-").unwrap_or(word);
    (!word.is_empty()).then(|| word.to_string())
}

fn callout_kind_for_title(title: &str) -> Option<&'static str> {
    let lower = title.trim().to_lowercase();
    CALLOUT_TITLES
        .iter()
        .find(|(known, _)| lower == *known)
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(blocks: &[Block]) -> Vec<&BlockKind> {
        blocks.iter().map(|b| &b.kind).collect()
    }

    #[test]
    fn test_parse_preamble() {
        let blocks = parse_document("---\nlayout: page\ntitle: \"Lesson\"\n---\nText.\n").unwrap();
        assert_eq!(
            blocks[0].kind,
            BlockKind::Metadata {
                key: "layout".to_string(),
                value: "page".to_string()
            }
        );
        assert_eq!(blocks[1].start_line, 3);
        assert_eq!(
            blocks[1].kind,
            BlockKind::Metadata {
                key: "title".to_string(),
                value: "Lesson".to_string()
            }
        );
        assert_eq!(blocks[2].start_line, 5);
        assert_eq!(blocks[2].rule, BlockRule::Paragraph);
    }

    #[test]
    fn test_unclosed_preamble_is_parse_error() {
        let err = parse_document("---\nlayout: page\n").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_preamble_that_is_not_a_mapping_is_parse_error() {
        let err = parse_document("---\nThis is a sentence\n---\n").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_invalid_yaml_preamble_reports_its_line() {
        let err = parse_document("---\nlayout: page\ntitle: [unclosed\n---\nText.\n").unwrap_err();
        assert!(err.line >= 3, "line {}", err.line);
        assert!(err.message.contains("not valid YAML"));
    }

    #[test]
    fn test_list_valued_preamble_key() {
        let src = "---\nlayout: episode\nobjectives:\n- \"Explain: the shell\"\n- Run a command\nminutes: 10\n---\nText.\n";
        let blocks = parse_document(src).unwrap();
        let metadata: Vec<_> = blocks
            .iter()
            .filter_map(|b| match &b.kind {
                BlockKind::Metadata { key, value } => Some((key.as_str(), value.as_str(), b.start_line)),
                _ => None,
            })
            .collect();
        assert_eq!(
            metadata,
            vec![
                ("layout", "episode", 2),
                ("objectives", "Explain: the shell, Run a command", 3),
                ("minutes", "10", 6),
            ]
        );
        assert_eq!(blocks[3].start_line, 8);
    }

    #[test]
    fn test_empty_preamble_has_no_metadata() {
        let blocks = parse_document("---\n# nothing yet\n---\nText.\n").unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].rule, BlockRule::Paragraph);
    }

    #[test]
    fn test_unterminated_fence_is_parse_error() {
        let err = parse_document("Intro\n\n```bash\nls -l\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("never closed"));
    }

    #[test]
    fn test_fenced_code_hides_markup() {
        let blocks = parse_document("```python\n# not a heading\n> not a quote\n```\n").unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0].kind,
            BlockKind::CodeBlock {
                language: Some("python".to_string())
            }
        );
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (1, 4));
    }

    #[test]
    fn test_annotation_sets_code_language() {
        let blocks = parse_document("~~~\nls\n~~~\n{: .language-bash}\n").unwrap();
        assert_eq!(
            blocks[0].kind,
            BlockKind::CodeBlock {
                language: Some("bash".to_string())
            }
        );
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let blocks = parse_document("## Topics\n\nSome text\nover two lines.\n\n## Other Resources\n").unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].heading_text(), Some("Topics"));
        assert_eq!((blocks[1].start_line, blocks[1].end_line), (3, 4));
        assert_eq!(blocks[2].heading_text(), Some("Other Resources"));
        assert_eq!(blocks[2].start_line, 6);
    }

    #[test]
    fn test_setext_heading_wins_over_thematic_break() {
        let blocks = parse_document("Topics\n------\n\n---\n").unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].heading_text(), Some("Topics"));
        assert_eq!(blocks[0].rule, BlockRule::SetextHeading);
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (1, 2));
        assert_eq!(blocks[1].kind, BlockKind::ThematicBreak);
    }

    #[test]
    fn test_callout_from_class() {
        let src = "> ## Learning Objectives {.objectives}\n>\n> *   Learn things.\n";
        let blocks = parse_document(src).unwrap();
        assert_eq!(blocks.len(), 1);
        match &blocks[0].kind {
            BlockKind::Callout {
                kind,
                title,
                title_level,
                body,
            } => {
                assert_eq!(kind, "objectives");
                assert_eq!(title.as_deref(), Some("Learning Objectives"));
                assert_eq!(*title_level, Some(2));
                assert_eq!(body.len(), 1);
                assert_eq!(body[0].start_line, 3);
            }
            other => panic!("expected callout, got {:?}", other),
        }
        assert_eq!(blocks[0].rule, BlockRule::CalloutClass);
    }

    #[test]
    fn test_callout_from_title_and_annotation() {
        let blocks = parse_document("> ## Prerequisites\n>\n> Shell basics.\n").unwrap();
        assert!(matches!(&blocks[0].kind, BlockKind::Callout { kind, .. } if kind == "prereq"));
        assert_eq!(blocks[0].rule, BlockRule::CalloutTitle);

        let blocks = parse_document("> ## Counting Files\n>\n> How many?\n{: .challenge}\n").unwrap();
        assert!(matches!(&blocks[0].kind, BlockKind::Callout { kind, .. } if kind == "challenge"));
        assert_eq!(blocks[0].rule, BlockRule::CalloutAnnotation);
        assert_eq!(blocks[0].end_line, 4);
    }

    #[test]
    fn test_plain_quote_is_not_callout() {
        let blocks = parse_document("> Somebody said this.\n").unwrap();
        assert!(matches!(&blocks[0].kind, BlockKind::BlockQuote { body } if body.len() == 1));
    }

    #[test]
    fn test_quote_lazy_continuation() {
        let src = "> ## Note {.callout}\n>\n> First line\nlazily continued.\n\nAfter.\n";
        let blocks = parse_document(src).unwrap();
        assert_eq!(blocks[0].end_line, 4);
        match &blocks[0].kind {
            BlockKind::Callout { body, .. } => assert_eq!(
                body[0].kind,
                BlockKind::Paragraph {
                    text: "First line\nlazily continued.".to_string()
                }
            ),
            other => panic!("expected callout, got {:?}", other),
        }
        assert_eq!(blocks[1].start_line, 6);
    }

    #[test]
    fn test_list_items_and_links() {
        let src = "1.  [One](01-one.html)\n2.  [Two](02-two.html)\n    continued\n\nAfter.\n";
        let blocks = parse_document(src).unwrap();
        assert_eq!(
            kinds(&blocks)[0],
            &BlockKind::List {
                ordered: true,
                items: 2
            }
        );
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (1, 3));
        assert_eq!(
            blocks[1].kind,
            BlockKind::Link {
                text: "One".to_string(),
                target: "01-one.html".to_string()
            }
        );
        assert_eq!(blocks[2].start_line, 2);
        assert_eq!(blocks[3].rule, BlockRule::Paragraph);
    }

    #[test]
    fn test_wrapped_link_in_paragraph() {
        let src = "Intro line.\nSee the [glossary\nentry](missing.html) here.\n";
        let blocks = parse_document(src).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[1].kind,
            BlockKind::Link {
                text: "glossary entry".to_string(),
                target: "missing.html".to_string()
            }
        );
        assert_eq!(blocks[1].start_line, 2);
    }

    #[test]
    fn test_definition_list() {
        let src = "## Glossary\n\nShell\n:   A program that runs commands.\n\nPrompt\n\n:   Characters shown\n    before input.\n";
        let blocks = parse_document(src).unwrap();
        let defs: Vec<_> = blocks
            .iter()
            .filter_map(|b| match &b.kind {
                BlockKind::Definition { term, text } => Some((term.as_str(), text.as_str(), b.start_line)),
                _ => None,
            })
            .collect();
        assert_eq!(
            defs,
            vec![
                ("Shell", "A program that runs commands.", 3),
                ("Prompt", "Characters shown before input.", 6),
            ]
        );
        assert!(!blocks.iter().any(|b| matches!(b.kind, BlockKind::Paragraph { .. })));
    }

    #[test]
    fn test_heading_count_matches_markers() {
        let src = "# One\n\ntext\n\n## Two\n\n```\n## inside code\n```\n\n### Three\n";
        let blocks = parse_document(src).unwrap();
        let headings = blocks.iter().filter(|b| b.heading_text().is_some()).count();
        assert_eq!(headings, 3);
    }

    #[test]
    fn test_link_definition_and_image() {
        let blocks = parse_document("![Plot](fig/plot.svg)\n\n[swc]: https://software-carpentry.org\n").unwrap();
        assert!(blocks.iter().any(|b| matches!(&b.kind, BlockKind::Image { target, .. } if target == "fig/plot.svg")));
        assert!(blocks.iter().any(|b| b.rule == BlockRule::LinkDefinition));
    }
}
