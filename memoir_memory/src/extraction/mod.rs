//! Deterministic memory extraction.
//!
//! A static catalog of regex detectors finds preferences and emotional
//! patterns; an [`EntityTagger`](memoir_core::EntityTagger) supplies facts.

pub mod catalog;
pub mod engine;
pub mod tagger;
