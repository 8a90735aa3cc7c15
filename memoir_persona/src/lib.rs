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

mod engine;
pub mod guard;
mod responses;
pub mod strategy;

pub use engine::PersonalityEngine;
pub use guard::{IMPORTANT_PREFIX, extract_critical_tokens, preserve};
pub use responses::respond;
pub use strategy::{CalmMentor, RewriteStrategy, Therapist, WittyFriend, strategy_for};
