//! Lesson Checker
//!
//! Structural validation of lesson documents written in lightweight markup.
//!
//! This library provides:
//! - Block-level parsing of lesson documents
//! - Per-role schemas loaded from TOML rule files
//! - Rule evaluation and cross-document link checks
//! - Configuration management

pub mod config;
pub mod core;
pub mod error;
pub mod lesson;
pub mod parser;
pub mod schema;
pub mod validation;

// Re-exports for clean public API
pub use config::Config;
pub use crate::core::{Diagnostic, Document, Role, RuleId, Severity, ValidationResult};
pub use error::{ParseError, SchemaError, UnknownRoleError, ValidateError};
pub use lesson::{validate, ValidateOptions, Validator};
pub use schema::SchemaRegistry;
