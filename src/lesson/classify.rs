//! Filename patterns: the role table and required-file globs

use std::path::Path;

use regex::Regex;

use crate::core::Role;
use crate::error::SchemaError;
use crate::schema::ClassifyRule;

/// Compiled filename → role table. The first matching row wins.
#[derive(Debug, Clone)]
pub struct RoleTable {
    rows: Vec<(Regex, Role)>,
}

impl RoleTable {
    pub fn compile(rules: &[ClassifyRule]) -> Result<Self, SchemaError> {
        let rows = rules
            .iter()
            .map(|rule| Ok((compile(&rule.pattern)?, rule.role)))
            .collect::<Result<Vec<_>, SchemaError>>()?;
        Ok(Self { rows })
    }

    /// Role for a file, from its file name only
    pub fn classify(&self, path: &Path) -> Role {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Role::Other;
        };
        self.rows
            .iter()
            .find(|(pattern, _)| pattern.is_match(name))
            .map(|(_, role)| *role)
            .unwrap_or(Role::Other)
    }
}

fn compile(pattern: &str) -> Result<Regex, SchemaError> {
    Regex::new(pattern).map_err(|source| SchemaError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Translate a `*`/`?` file glob into an anchored regex
pub fn glob_to_regex(glob: &str) -> Result<Regex, SchemaError> {
    let mut pattern = String::from("^");
    for c in glob.chars() {
        match c {
            '*' => pattern.push_str("[^/]*"),
            '?' => pattern.push_str("[^/]"),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    pattern.push('$');
    compile(&pattern)
}
