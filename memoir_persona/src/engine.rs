//! Personality engine facade.

use memoir_core::{Personality, Result};
use rand::Rng;
use tracing::debug;

use crate::guard::{extract_critical_tokens, preserve};
use crate::strategy::strategy_for;

/// Rewrites neutral text in one of the fixed personalities.
///
/// Stateless: each call draws from its own thread-local random source, so
/// one engine can be shared by any number of callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonalityEngine;

impl PersonalityEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Rewrite `text` for a personality key.
    ///
    /// # Errors
    /// Returns [`memoir_core::Error::InvalidPersonality`] for an unknown key,
    /// before any rewriting is done.
    pub fn rewrite(&self, text: &str, key: &str) -> Result<String> {
        let personality: Personality = key.parse()?;
        Ok(self.rewrite_with(text, personality, &mut rand::thread_rng()))
    }

    /// Rewrite with an explicit random source, then guard the critical
    /// tokens of the original text.
    pub fn rewrite_with<R: Rng>(
        &self,
        text: &str,
        personality: Personality,
        rng: &mut R,
    ) -> String {
        let tokens = extract_critical_tokens(text);
        let styled = strategy_for(personality).rewrite(text, rng);
        let guarded = preserve(&styled, &tokens);
        debug!(
            personality = %personality,
            critical_tokens = tokens.len(),
            appended = guarded.len() != styled.len(),
            "Rewrote text"
        );
        guarded
    }

    /// Guard an externally produced rewrite of `original`.
    #[must_use]
    pub fn guard(&self, original: &str, rewritten: &str) -> String {
        preserve(rewritten, &extract_critical_tokens(original))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_core::Error;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn unknown_key_is_rejected() {
        let engine = PersonalityEngine::new();
        for _ in 0..10 {
            assert!(matches!(
                engine.rewrite("anything", "unknown"),
                Err(Error::InvalidPersonality(key)) if key == "unknown"
            ));
        }
    }

    #[test]
    fn known_keys_rewrite() {
        let engine = PersonalityEngine::new();
        for personality in Personality::ALL {
            let out = engine
                .rewrite("your task is complete", personality.as_str())
                .unwrap_or_default();
            assert!(out.to_lowercase().contains("your task is complete"));
        }
    }

    #[test]
    fn guard_uses_tokens_of_the_original() {
        let engine = PersonalityEngine::new();
        let out = engine.guard("Call Ana at 3:00 PM", "call her later");
        assert_eq!(out, "call her later (Important: 3:00 PM, Call Ana)");
    }

    #[test]
    fn same_seed_same_output() {
        let engine = PersonalityEngine::new();
        let a = engine.rewrite_with("hi", Personality::Therapist, &mut StdRng::seed_from_u64(9));
        let b = engine.rewrite_with("hi", Personality::Therapist, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
