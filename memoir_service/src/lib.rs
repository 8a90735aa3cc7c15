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

//! Memory and personality service.
//!
//! Puts the deterministic engines and the optional LLM assist behind one
//! facade. The LLM path is opt-in per request; when it cannot serve a
//! request the deterministic engine answers instead, and every record is
//! validated before it leaves the service.

mod service;

pub use service::{Extraction, Health, MemoryService, Method, Rewrite};
