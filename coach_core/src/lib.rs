#![forbid(unsafe_code)]

//! Core domain model and business logic for the coach program generator.
//!
//! This crate provides:
//! - Domain types (catalog exercises, buckets, assessments, programs)
//! - Catalog and assessment stores
//! - Exercise categorization and corrective recommendations
//! - Template-driven program generation
//! - Persistence of generated programs (JSONL workout store)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod assessment;
pub mod categorize;
pub mod corrective;
pub mod resolver;
pub mod templates;
pub mod weights;
pub mod store;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, CatalogStore, CsvCatalog};
pub use config::Config;
pub use assessment::{AssessmentDir, AssessmentStore, NoAssessments};
pub use categorize::{categorize, BucketPools};
pub use store::{read_programs, save_program, JsonlSink, WorkoutSink};
pub use engine::{generate_program, generate_sections, GenerationRequest};
