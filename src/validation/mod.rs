//! Validation Engine
//!
//! Per-document rule evaluation and the cross-document pass.

pub mod crossref;
pub mod engine;

pub use crossref::{cross_reference, normalize_path, LessonIndex};
pub use engine::{evaluate, evaluate_generic};
