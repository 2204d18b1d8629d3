//! Schema Registry
//!
//! Immutable role → schema lookup, built once from a rule file.

use std::collections::HashMap;
use std::path::Path;

use super::types::{ClassifyRule, LessonRules, Schema, SchemaFile};
use crate::core::Role;
use crate::error::{SchemaError, UnknownRoleError};

/// Built-in rules embedded in the binary
const BUILTIN_RULES: &str = include_str!("../../resources/schemas/lesson.toml");

/// Read-only collection of schemas and lesson-wide rules
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<Role, Schema>,
    classify: Vec<ClassifyRule>,
    lesson: LessonRules,
}

impl SchemaRegistry {
    /// Registry holding the built-in rule set
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::from_toml(BUILTIN_RULES, "<built-in>")
    }

    /// Load a rule file from disk
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, &path.display().to_string())
    }

    /// Parse rule file content. `origin` names the source in errors.
    pub fn from_toml(content: &str, origin: &str) -> Result<Self, SchemaError> {
        let file: SchemaFile = toml::from_str(content).map_err(|source| SchemaError::Toml {
            origin: origin.to_string(),
            source,
        })?;
        Ok(Self::from(file))
    }

    /// Look up the schema for a role
    pub fn schema_for(&self, role: Role) -> Result<&Schema, UnknownRoleError> {
        self.schemas
            .get(&role)
            .ok_or_else(|| UnknownRoleError(role.to_string()))
    }

    /// Roles that have a schema, in declaration order of [`Role`]
    pub fn roles(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.schemas.contains_key(role))
            .collect()
    }

    /// Filename → role table, in priority order
    pub fn classify_rules(&self) -> &[ClassifyRule] {
        &self.classify
    }

    /// File stem of the glossary document
    pub fn glossary_stem(&self) -> &str {
        &self.lesson.glossary
    }

    /// Patterns of files every lesson must contain
    pub fn required_files(&self) -> &[String] {
        &self.lesson.required_files
    }
}

impl From<SchemaFile> for SchemaRegistry {
    fn from(file: SchemaFile) -> Self {
        let mut schemas = HashMap::new();
        for def in file.schemas {
            let role = def.role;
            if schemas.insert(role, Schema::from(def)).is_some() {
                log::warn!("Rule file defines role '{}' twice; the last one wins", role);
            }
        }

        Self {
            schemas,
            classify: file.classify,
            lesson: file.lesson,
        }
    }
}
