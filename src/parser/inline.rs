//! Inline helpers: links, attributes and anchor identifiers

use regex::Regex;
use std::sync::LazyLock;

static INLINE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(!?)\[([^\]]*)\]\(\s*<?([^)\s>]*)>?(?:\s+["'][^"']*["'])?\s*\)"#)
        .expect("valid regex")
});

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`+[^`]*`+").expect("valid regex"));

static TRAILING_ATTRS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\{([^{}]*)\}\s*$").expect("valid regex"));

/// A link or image found inside a line of text
#[derive(Debug, Clone, PartialEq)]
pub struct InlineRef {
    pub is_image: bool,
    pub text: String,
    pub target: String,
}

/// Find inline links and images in one line, skipping code spans
pub fn find_links(line: &str) -> Vec<InlineRef> {
    find_links_in_lines(&[line])
        .into_iter()
        .map(|(_, found)| found)
        .collect()
}

/// Find inline links and images in a run of lines, where a link's text may
/// wrap onto the next line. Each link comes with the offset of the line it
/// starts on.
pub fn find_links_in_lines<S: AsRef<str>>(lines: &[S]) -> Vec<(usize, InlineRef)> {
    let joined = lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");

    // Blank out code spans in place so match offsets stay valid
    let mut masked = joined.clone();
    for span in CODE_SPAN.find_iter(&joined) {
        let blank: String = span
            .as_str()
            .chars()
            .map(|c| match c {
                '\n' => "\n".to_string(),
                _ => " ".repeat(c.len_utf8()),
            })
            .collect();
        masked.replace_range(span.range(), &blank);
    }

    INLINE_LINK
        .captures_iter(&masked)
        .map(|caps| {
            let start = caps.get(0).map_or(0, |m| m.start());
            let line = masked[..start].matches('\n').count();
            let found = InlineRef {
                is_image: &caps[1] == "!",
                text: caps[2].split_whitespace().collect::<Vec<_>>().join(" "),
                target: caps[3].to_string(),
            };
            (line, found)
        })
        .collect()
}

/// Attributes attached to a heading with `{#id .class}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pub id: Option<String>,
    pub classes: Vec<String>,
}

/// Split trailing `{...}` attributes off a heading title
pub fn split_attributes(text: &str) -> (String, Attributes) {
    let Some(caps) = TRAILING_ATTRS.captures(text) else {
        return (text.trim().to_string(), Attributes::default());
    };

    let mut attrs = Attributes::default();
    for token in caps[1].split_whitespace() {
        if let Some(class) = token.strip_prefix('.') {
            attrs.classes.push(class.to_string());
        } else if let Some(id) = token.strip_prefix('#') {
            attrs.id = Some(id.to_string());
        }
    }

    let start = caps.get(0).map_or(text.len(), |m| m.start());
    (text[..start].trim().to_string(), attrs)
}

/// Anchor identifier generated for a heading (lowercase, punctuation dropped,
/// whitespace turned into hyphens, leading non-letters removed)
pub fn heading_anchor(text: &str) -> String {
    let mut anchor = String::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.') {
            anchor.extend(ch.to_lowercase());
        } else if ch.is_whitespace() {
            anchor.push('-');
        }
    }
    anchor
        .trim_start_matches(|c: char| !c.is_alphabetic())
        .to_string()
}

/// Fragment identifier for a glossary term, matching the rewrite filters:
/// lowercase, spaces become hyphens, quotes are removed
pub fn term_fragment(term: &str) -> String {
    term.to_lowercase()
        .replace(' ', "-")
        .replace(['\'', '"'], "")
}
