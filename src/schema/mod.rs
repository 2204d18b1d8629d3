//! Lesson Schemas
//!
//! Per-role rules as data: required sections, callouts and metadata.

pub mod registry;
pub mod types;

pub use registry::SchemaRegistry;
pub use types::{
    CalloutRule, ClassifyRule, LeadingBlock, LessonRules, MatchMode, MetadataField,
    RequiredSection, Schema, SchemaFile, ValueKind,
};
