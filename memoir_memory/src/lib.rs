#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod dedup;
pub mod extraction;
pub mod schema;

pub use extraction::catalog::{
    BuildError, DetectorDef, DetectorShape, EmotionDef, categorize, default_detectors,
    default_emotions,
};
pub use extraction::engine::{ExtractionConfig, Extractor};
pub use extraction::tagger::RuleBasedTagger;
pub use schema::{RecordValidator, SchemaError};
