//! Line classifier
//!
//! Looks at one line in isolation and says what it could start. The block
//! parser decides what the line actually means from context.

use regex::Regex;
use std::sync::LazyLock;

static LINK_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[([^\]]+)\]:\s*<?([^\s>]+)>?(?:\s+["'(].*)?$"#).expect("valid regex")
});

static ORDERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,9}[.)](\s|$)").expect("valid regex"));

/// What a single line looks like
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind<'a> {
    Blank,
    /// Opening or closing code fence
    Fence {
        marker: char,
        len: usize,
        info: &'a str,
    },
    AtxHeading {
        level: u8,
        text: &'a str,
    },
    /// `===` or `---` directly under text
    SetextUnderline {
        level: u8,
    },
    ThematicBreak,
    Quote,
    ListItem {
        ordered: bool,
    },
    LinkDefinition {
        label: &'a str,
        target: &'a str,
    },
    /// `:   definition` line of a definition list
    DefinitionItem {
        text: &'a str,
    },
    /// kramdown-style `{: .class}` annotation
    ClassAnnotation {
        classes: Vec<&'a str>,
    },
    /// Indented four or more columns
    Indented,
    Text,
}

/// Classify a line of source text
pub fn classify_line(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }

    if indent_width(line) >= 4 {
        return LineKind::Indented;
    }

    let trimmed = line.trim_start();

    if let Some(fence) = fence(trimmed) {
        return fence;
    }
    if let Some(heading) = atx_heading(trimmed) {
        return heading;
    }
    if trimmed.starts_with('>') {
        return LineKind::Quote;
    }

    let body = trimmed.trim_end();
    if body.chars().all(|c| c == '=') {
        return LineKind::SetextUnderline { level: 1 };
    }
    if body.chars().all(|c| c == '-') {
        return LineKind::SetextUnderline { level: 2 };
    }
    if is_thematic_break(body) {
        return LineKind::ThematicBreak;
    }

    if let Some(list) = list_item(trimmed) {
        return list;
    }
    if let Some(caps) = LINK_DEFINITION.captures(trimmed) {
        if let (Some(label), Some(target)) = (caps.get(1), caps.get(2)) {
            // Footnote definitions are not links
            if !label.as_str().starts_with('^') {
                return LineKind::LinkDefinition {
                    label: label.as_str(),
                    target: target.as_str(),
                };
            }
        }
    }
    if let Some(rest) = trimmed.strip_prefix(':') {
        if rest.starts_with([' ', '\t']) {
            return LineKind::DefinitionItem { text: rest.trim() };
        }
    }
    if let Some(inner) = body.strip_prefix("{:").and_then(|s| s.strip_suffix('}')) {
        let classes = inner
            .split_whitespace()
            .filter_map(|tok| tok.strip_prefix('.'))
            .filter(|c| !c.is_empty())
            .collect();
        return LineKind::ClassAnnotation { classes };
    }

    LineKind::Text
}

/// Leading whitespace width with tabs expanded to four columns
pub fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4 - (width % 4),
            _ => break,
        }
    }
    width
}

/// Strip one level of block quote marker (`>` plus one optional space)
pub fn strip_quote_marker(line: &str) -> &str {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix('>') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => line,
    }
}

fn fence(trimmed: &str) -> Option<LineKind<'_>> {
    let marker = trimmed.chars().next()?;
    if marker != '`' && marker != '~' {
        return None;
    }
    let len = trimmed.chars().take_while(|&c| c == marker).count();
    if len < 3 {
        return None;
    }
    let info = trimmed[len..].trim();
    // A backtick fence's info string may not contain backticks
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some(LineKind::Fence { marker, len, info })
}

fn atx_heading(trimmed: &str) -> Option<LineKind<'_>> {
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }

    // Drop an optional closing sequence of #'s
    let mut text = rest.trim();
    let without_closing = text.trim_end_matches('#');
    if without_closing.is_empty() || without_closing.ends_with([' ', '\t']) {
        text = without_closing.trim_end();
    }

    Some(LineKind::AtxHeading {
        level: level as u8,
        text,
    })
}

fn is_thematic_break(body: &str) -> bool {
    let mut chars = body.chars().filter(|c| !c.is_whitespace());
    let Some(first) = chars.next() else {
        return false;
    };
    if !matches!(first, '-' | '*' | '_') {
        return false;
    }
    let mut count = 1;
    for c in chars {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

fn list_item(trimmed: &str) -> Option<LineKind<'_>> {
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    if matches!(first, '*' | '-' | '+') {
        return match chars.next() {
            None | Some(' ') | Some('\t') => Some(LineKind::ListItem { ordered: false }),
            _ => None,
        };
    }
    if ORDERED_MARKER.is_match(trimmed) {
        return Some(LineKind::ListItem { ordered: true });
    }
    None
}
