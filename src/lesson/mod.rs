//! Lesson Validation
//!
//! Discovers the documents of a lesson tree, classifies and loads them, runs
//! the per-document rules and then the cross-document pass.

pub mod classify;

pub use classify::{glob_to_regex, RoleTable};

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::core::{aggregate, Diagnostic, Document, Role, RuleId, ValidationResult};
use crate::error::{SchemaError, ValidateError};
use crate::schema::SchemaRegistry;
use crate::validation::{cross_reference, evaluate, evaluate_generic, normalize_path, LessonIndex};

/// Markdown files that are never lesson documents
pub const DEFAULT_IGNORE: &[&str] = &[
    "README.md",
    "LAYOUT.md",
    "DESIGN.md",
    "CONTRIBUTING.md",
    "CONDUCT.md",
    "LICENSE.md",
];

/// Knobs for a validation run
#[derive(Debug, Clone, PartialEq)]
pub struct ValidateOptions {
    /// Apply this role to every document instead of the role table
    pub role: Option<Role>,
    /// File names (or root-relative paths) skipped during discovery
    pub ignore: Vec<String>,
    /// Check the rule set's required files
    pub require_files: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            role: None,
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
            require_files: false,
        }
    }
}

/// Validate a lesson with the built-in rules and default options
pub fn validate(root: impl AsRef<Path>) -> Result<ValidationResult, ValidateError> {
    let registry = SchemaRegistry::builtin()?;
    Validator::new(registry, ValidateOptions::default())?.run(root.as_ref())
}

/// A rule set bound to run options
#[derive(Debug, Clone)]
pub struct Validator {
    registry: SchemaRegistry,
    roles: RoleTable,
    options: ValidateOptions,
}

/// A file discovered under the root
struct Entry {
    /// Where to read it from
    source: PathBuf,
    /// How it is named in reports and links
    path: PathBuf,
}

impl Validator {
    pub fn new(registry: SchemaRegistry, options: ValidateOptions) -> Result<Self, SchemaError> {
        let roles = RoleTable::compile(registry.classify_rules())?;
        Ok(Self {
            registry,
            roles,
            options,
        })
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Role a file would be validated as
    pub fn role_for(&self, path: &Path) -> Role {
        self.options
            .role
            .unwrap_or_else(|| self.roles.classify(path))
    }

    /// Validate every document under `root`
    pub fn run(&self, root: &Path) -> Result<ValidationResult, ValidateError> {
        let top_level: Vec<String> = fs::read_dir(root)
            .map_err(|err| ValidateError::io(root, err))?
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();

        let (files, candidates) = self.discover(root);

        let mut lists = Vec::new();
        let mut documents = Vec::new();
        for entry in &candidates {
            let role = self.role_for(&entry.path);
            log::debug!("{}: {}", entry.path.display(), role);

            let text = match fs::read_to_string(&entry.source) {
                Ok(text) => text,
                Err(err) => {
                    lists.push(vec![Diagnostic::error(
                        &entry.path,
                        None,
                        RuleId::UnreadableFile,
                        format!("Could not read file: {}", err),
                    )]);
                    continue;
                }
            };

            match Document::load(entry.path.clone(), role, &text) {
                Ok(document) => documents.push(document),
                Err(err) => lists.push(vec![Diagnostic::error(
                    &entry.path,
                    Some(err.line),
                    RuleId::ParseError,
                    format!("Could not parse document: {}", err.message),
                )]),
            }
        }

        for document in &documents {
            let diagnostics = match self.registry.schema_for(document.role) {
                Ok(schema) => evaluate(document, schema),
                Err(_) => evaluate_generic(document),
            };
            lists.push(diagnostics);
        }

        let index = LessonIndex::new(&documents, &files, self.registry.glossary_stem());
        lists.push(cross_reference(&documents, &index));

        if self.options.require_files {
            lists.push(self.check_required_files(root, &top_level)?);
        }

        let mut result = aggregate(lists);
        result.documents = candidates.len();

        log::info!(
            "Checked {} documents in {}: {} errors, {} warnings",
            result.documents,
            root.display(),
            result.error_count(),
            result.warning_count()
        );
        Ok(result)
    }

    /// Walk the tree in file-name order. Returns every file and the
    /// candidate documents.
    fn discover(&self, root: &Path) -> (Vec<PathBuf>, Vec<Entry>) {
        let mut files = Vec::new();
        let mut candidates = Vec::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = normalize_path(entry.path());
            files.push(path.clone());
            if self.is_candidate(root, entry.path()) {
                candidates.push(Entry {
                    source: entry.into_path(),
                    path,
                });
            }
        }

        (files, candidates)
    }

    fn is_candidate(&self, root: &Path, path: &Path) -> bool {
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            return false;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let relative = path.strip_prefix(root).unwrap_or(path);
        !self
            .options
            .ignore
            .iter()
            .any(|ignored| ignored == name || Path::new(ignored) == relative)
    }

    fn check_required_files(
        &self,
        root: &Path,
        top_level: &[String],
    ) -> Result<Vec<Diagnostic>, SchemaError> {
        let mut diagnostics = Vec::new();
        for pattern in self.registry.required_files() {
            let matcher = glob_to_regex(pattern)?;
            if !top_level.iter().any(|name| matcher.is_match(name)) {
                diagnostics.push(Diagnostic::error(
                    root,
                    None,
                    RuleId::MissingFile,
                    format!("Lesson is missing a required file matching '{}'", pattern),
                ));
            }
        }
        Ok(diagnostics)
    }
}

/// Hidden directories and Jekyll's `_site`, `_includes` and friends
fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || name.starts_with('_'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, name: &str, content: &str) {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn validator(options: ValidateOptions) -> Validator {
        Validator::new(SchemaRegistry::builtin().unwrap(), options).unwrap()
    }

    #[test]
    fn test_discovery_skips_hidden_and_underscore_dirs() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "notes.md", "Some notes.\n");
        write(dir.path(), "README.md", "");
        write(dir.path(), "_site/notes.md", "");
        write(dir.path(), ".git/notes.md", "");
        write(dir.path(), "extra/more.md", "More.\n");
        write(dir.path(), "fig/plot.png", "png");

        let (files, candidates) = validator(ValidateOptions::default()).discover(dir.path());
        let names: Vec<PathBuf> = candidates
            .iter()
            .map(|c| c.source.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("extra/more.md"), PathBuf::from("notes.md")]
        );
        assert_eq!(files.len(), 4);
    }

    #[test]
    fn test_forced_role_overrides_table() {
        let options = ValidateOptions {
            role: Some(Role::Faq),
            ..ValidateOptions::default()
        };
        assert_eq!(validator(options).role_for(Path::new("index.md")), Role::Faq);
        assert_eq!(
            validator(ValidateOptions::default()).role_for(Path::new("index.md")),
            Role::Home
        );
    }

    #[test]
    fn test_empty_other_document() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "setup.md", "\n");

        let result = validator(ValidateOptions::default()).run(dir.path()).unwrap();
        assert_eq!(result.documents, 1);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].rule, RuleId::EmptyDocument);
        assert_eq!(result.diagnostics[0].line, None);
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = validate(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ValidateError::Io { .. }));
    }

    #[test]
    fn test_required_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "index.md", "");
        write(dir.path(), "sub/01-intro.md", "");

        let options = ValidateOptions {
            require_files: true,
            ..ValidateOptions::default()
        };
        let result = validator(options).run(dir.path()).unwrap();
        let missing: Vec<&Diagnostic> = result
            .diagnostics
            .iter()
            .filter(|d| d.rule == RuleId::MissingFile)
            .collect();
        // 01-*.md, reference.md, discussion.md and instructors.md
        assert_eq!(missing.len(), 4);
        assert!(missing.iter().all(|d| d.path == dir.path() && d.line.is_none()));
        assert!(missing[0].message.contains("01-*.md"));
    }
}
