//! Core Types
//!
//! Documents, diagnostics and the aggregated report.

pub mod diagnostics;
pub mod document;
pub mod report;

pub use diagnostics::{Diagnostic, RuleId, Severity};
pub use document::{Document, Role};
pub use report::{aggregate, ValidationResult};
