use memoir_core::Personality;
use rand::RngCore;
use rand::seq::SliceRandom;

use super::RewriteStrategy;

const VALIDATIONS: [&str; 4] = [
    "I hear you. ",
    "That makes sense. ",
    "I understand. ",
    "It's completely valid to feel this way. ",
];

const QUESTIONS: [&str; 4] = [
    " How does that sit with you?",
    " What feelings does that bring up?",
    " How are you processing that?",
    " What would support you right now?",
];

/// Validating voice: acknowledgement first, reflective question last.
#[derive(Debug, Clone, Copy, Default)]
pub struct Therapist;

impl RewriteStrategy for Therapist {
    fn personality(&self) -> Personality {
        Personality::Therapist
    }

    fn rewrite(&self, text: &str, rng: &mut dyn RngCore) -> String {
        let validation = VALIDATIONS.choose(rng).copied().unwrap_or_default();
        let question = QUESTIONS.choose(rng).copied().unwrap_or_default();
        format!("{validation}{}{question}", text.trim())
    }
}
