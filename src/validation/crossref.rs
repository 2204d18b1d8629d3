//! Cross-document checks
//!
//! Runs after every document of the lesson is loaded: glossary references,
//! relative links, anchors and image assets.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::core::{Diagnostic, Document, Role, RuleId};
use crate::parser::inline::term_fragment;
use crate::parser::BlockKind;

static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.-]*:|//)").expect("valid regex"));

/// What the lesson as a whole provides to links
#[derive(Debug, Clone, Default)]
pub struct LessonIndex {
    /// Every file in the lesson tree, normalized
    files: BTreeSet<PathBuf>,
    /// Anchors defined by each lesson document
    anchors: BTreeMap<PathBuf, BTreeSet<String>>,
    /// Fragments of terms defined in reference documents
    glossary: BTreeSet<String>,
    /// File stem glossary links point at
    glossary_stem: String,
}

impl LessonIndex {
    pub fn new<I, P>(documents: &[Document], files: I, glossary_stem: &str) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let files = files
            .into_iter()
            .map(|p| normalize_path(p.as_ref()))
            .collect();

        let anchors = documents
            .iter()
            .map(|doc| (normalize_path(doc.path()), doc.anchors()))
            .collect();

        let glossary = documents
            .iter()
            .filter(|doc| doc.role == Role::Reference)
            .flat_map(|doc| doc.defined_terms())
            .map(term_fragment)
            .collect();

        Self {
            files,
            anchors,
            glossary,
            glossary_stem: glossary_stem.to_string(),
        }
    }

    pub fn has_term(&self, fragment: &str) -> bool {
        self.glossary.contains(fragment)
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains(path) || self.anchors.contains_key(path)
    }
}

/// How a link target should be checked
#[derive(Debug, Clone, PartialEq)]
enum Target<'a> {
    /// External URL, template expression, directory, or site-absolute path
    Skip,
    /// `#fragment` within the same document
    SameDocument(&'a str),
    /// `reference.html#term`
    Glossary(&'a str),
    /// Relative file, with an optional fragment
    File {
        path: &'a str,
        fragment: Option<&'a str>,
    },
}

fn classify_target<'a>(target: &'a str, glossary_stem: &str) -> Target<'a> {
    if target.is_empty()
        || URL_SCHEME.is_match(target)
        || target.contains("{{")
        || target.contains("{%")
        || target.starts_with('/')
    {
        return Target::Skip;
    }

    let (file, fragment) = match target.split_once('#') {
        Some((file, fragment)) => (file, Some(fragment)),
        None => (target, None),
    };
    let file = file.split('?').next().unwrap_or(file);

    if file.is_empty() {
        return match fragment {
            Some(f) if !f.is_empty() => Target::SameDocument(f),
            _ => Target::Skip,
        };
    }
    if file.ends_with('/') {
        return Target::Skip;
    }

    let path = Path::new(file);
    let is_glossary = path.file_stem().and_then(|s| s.to_str()) == Some(glossary_stem)
        && matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("html" | "htm" | "md") | None
        );
    let fragment = fragment.filter(|f| !f.is_empty());
    if let (true, Some(fragment)) = (is_glossary, fragment) {
        return Target::Glossary(fragment);
    }

    Target::File {
        path: file,
        fragment,
    }
}

/// Check links and images of every document against the lesson index
pub fn cross_reference(documents: &[Document], index: &LessonIndex) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for document in documents {
        check_document(document, index, &mut diagnostics);
    }
    diagnostics
}

fn check_document(document: &Document, index: &LessonIndex, out: &mut Vec<Diagnostic>) {
    let own_path = normalize_path(document.path());
    let base = own_path.parent().map(Path::to_path_buf).unwrap_or_default();

    for block in document.references() {
        let (target, is_image) = match &block.kind {
            BlockKind::Link { target, .. } => (target.as_str(), false),
            BlockKind::Image { target, .. } => (target.as_str(), true),
            _ => continue,
        };
        let line = Some(block.start_line);

        match classify_target(target, &index.glossary_stem) {
            Target::Skip => {}
            Target::SameDocument(fragment) => {
                if !has_anchor(index, &own_path, fragment) {
                    out.push(Diagnostic::warning(
                        document.path(),
                        line,
                        RuleId::MissingAnchor,
                        format!("Link '{}' points to an anchor this document does not define", target),
                    ));
                }
            }
            Target::Glossary(fragment) => {
                if !index.has_term(fragment) {
                    out.push(Diagnostic::warning(
                        document.path(),
                        line,
                        RuleId::GlossaryReference,
                        format!(
                            "Glossary reference '{}' does not match any defined term",
                            target
                        ),
                    ));
                }
            }
            Target::File { path, fragment } => {
                let raw = normalize_path(&base.join(path));
                let source = markdown_source(&raw);
                let resolved = match &source {
                    Some(md) if index.file_exists(md) => Some(md.clone()),
                    _ if index.file_exists(&raw) => Some(raw.clone()),
                    _ => None,
                };

                match resolved {
                    None if is_image => out.push(Diagnostic::error(
                        document.path(),
                        line,
                        RuleId::MissingAsset,
                        format!("Could not find the image file '{}'", raw.display()),
                    )),
                    None => {
                        let expected = source.unwrap_or(raw);
                        out.push(Diagnostic::error(
                            document.path(),
                            line,
                            RuleId::BrokenLink,
                            format!(
                                "Link '{}' is broken: could not find '{}'",
                                target,
                                expected.display()
                            ),
                        ));
                    }
                    Some(found) => {
                        if let Some(fragment) = fragment {
                            if index.anchors.contains_key(&found)
                                && !has_anchor(index, &found, fragment)
                            {
                                out.push(Diagnostic::warning(
                                    document.path(),
                                    line,
                                    RuleId::MissingAnchor,
                                    format!(
                                        "Link '{}' points to anchor '{}' which '{}' does not define",
                                        target,
                                        fragment,
                                        found.display()
                                    ),
                                ));
                            }
                        }
                    }
                }
            }
        }
    }
}

fn has_anchor(index: &LessonIndex, document: &Path, fragment: &str) -> bool {
    index
        .anchors
        .get(document)
        .is_some_and(|anchors| anchors.contains(fragment))
}

/// `page.html` is generated from `page.md`
fn markdown_source(path: &Path) -> Option<PathBuf> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") => {
            Some(path.with_extension("md"))
        }
        _ => None,
    }
}

/// Lexically normalize a path: drop `.` and fold `..` where possible
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().map(|c| c.as_os_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str, role: Role, src: &str) -> Document {
        Document::load(path, role, src).expect("parse")
    }

    fn rules(diagnostics: &[Diagnostic]) -> Vec<RuleId> {
        diagnostics.iter().map(|d| d.rule).collect()
    }

    const REFERENCE: &str = "## Glossary\n\nShell\n:   A program that runs commands.\n\nCommand Line\n:   Where you type.\n";

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("./a/./b/../c.md")), PathBuf::from("a/c.md"));
        assert_eq!(normalize_path(Path::new("../x.md")), PathBuf::from("../x.md"));
        assert_eq!(normalize_path(Path::new("a/../../x.md")), PathBuf::from("../x.md"));
    }

    #[test]
    fn test_classify_target() {
        assert_eq!(classify_target("https://example.org", "reference"), Target::Skip);
        assert_eq!(classify_target("mailto:a@b.org", "reference"), Target::Skip);
        assert_eq!(classify_target("{{ page.root }}/x.html", "reference"), Target::Skip);
        assert_eq!(classify_target("#setup", "reference"), Target::SameDocument("setup"));
        assert_eq!(
            classify_target("reference.html#shell", "reference"),
            Target::Glossary("shell")
        );
        assert_eq!(
            classify_target("reference.html", "reference"),
            Target::File {
                path: "reference.html",
                fragment: None
            }
        );
        assert_eq!(
            classify_target("01-intro.html#setup", "reference"),
            Target::File {
                path: "01-intro.html",
                fragment: Some("setup")
            }
        );
    }

    #[test]
    fn test_unresolved_glossary_reference_warns_once() {
        let docs = vec![
            doc("reference.md", Role::Reference, REFERENCE),
            doc(
                "01-intro.md",
                Role::Episode,
                "Use the [shell](reference.html#shell) and a [prompt](reference.html#prompt).\n",
            ),
        ];
        let index = LessonIndex::new(&docs, ["reference.md", "01-intro.md"], "reference");
        let diagnostics = cross_reference(&docs, &index);
        assert_eq!(rules(&diagnostics), vec![RuleId::GlossaryReference]);
        assert_eq!(diagnostics[0].line, Some(1));
        assert!(diagnostics[0].message.contains("reference.html#prompt"));
    }

    #[test]
    fn test_defining_term_resolves_reference() {
        let with_term = format!("{}\nPrompt\n:   Shown before input.\n", REFERENCE);
        let docs = vec![
            doc("reference.md", Role::Reference, &with_term),
            doc("01-intro.md", Role::Episode, "A [prompt](reference.html#prompt).\n"),
        ];
        let index = LessonIndex::new(&docs, ["reference.md", "01-intro.md"], "reference");
        assert!(cross_reference(&docs, &index).is_empty());
        assert!(index.has_term("command-line"));
    }

    #[test]
    fn test_empty_fragment_links_to_glossary_file() {
        assert_eq!(
            classify_target("reference.html#", "reference"),
            Target::File {
                path: "reference.html",
                fragment: None
            }
        );

        let docs = vec![
            doc("reference.md", Role::Reference, REFERENCE),
            doc("01-intro.md", Role::Episode, "See the [glossary](reference.html#).\n"),
        ];
        let index = LessonIndex::new(&docs, ["reference.md", "01-intro.md"], "reference");
        assert!(cross_reference(&docs, &index).is_empty());
    }

    #[test]
    fn test_broken_links_and_assets() {
        let docs = vec![doc(
            "lesson/index.md",
            Role::Home,
            "[one](01-one.html) [two](02-two.html) [up](../README.md)\n\n![plot](fig/plot.png) ![gone](fig/gone.png)\n",
        )];
        let files = ["lesson/index.md", "lesson/01-one.md", "lesson/fig/plot.png", "README.md"];
        let index = LessonIndex::new(&docs, files, "reference");
        let diagnostics = cross_reference(&docs, &index);

        assert_eq!(rules(&diagnostics), vec![RuleId::BrokenLink, RuleId::MissingAsset]);
        assert!(diagnostics[0].message.contains("lesson/02-two.md"));
        assert_eq!(diagnostics[1].line, Some(3));
    }

    #[test]
    fn test_missing_anchors() {
        let docs = vec![
            doc("01-one.md", Role::Episode, "## Setup\n\n[ok](#setup) [bad](#nowhere)\n"),
            doc(
                "02-two.md",
                Role::Episode,
                "[ok](01-one.html#setup) [bad](01-one.html#teardown)\n",
            ),
        ];
        let index = LessonIndex::new(&docs, ["01-one.md", "02-two.md"], "reference");
        let diagnostics = cross_reference(&docs, &index);
        assert_eq!(
            rules(&diagnostics),
            vec![RuleId::MissingAnchor, RuleId::MissingAnchor]
        );
        assert_eq!(diagnostics[0].path, PathBuf::from("01-one.md"));
        assert!(diagnostics[1].message.contains("teardown"));
    }
}
