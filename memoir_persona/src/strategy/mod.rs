//! Rewrite strategies.
//!
//! One strategy per [`Personality`]. The set is closed: [`strategy_for`] is
//! the only way to obtain one, and it matches on the enum.

use memoir_core::Personality;
use rand::RngCore;

mod calm_mentor;
mod therapist;
mod witty_friend;

pub use calm_mentor::CalmMentor;
pub use therapist::Therapist;
pub use witty_friend::WittyFriend;
pub(crate) use witty_friend::EMOJIS;

/// A stylistic rewrite of neutral text.
///
/// The random source is passed in so callers control independence between
/// calls and tests can inject a seeded generator.
pub trait RewriteStrategy: Send + Sync {
    /// The personality this strategy voices.
    fn personality(&self) -> Personality;

    /// Rewrite `text`, choosing exactly one template from `rng`.
    fn rewrite(&self, text: &str, rng: &mut dyn RngCore) -> String;
}

/// Look up the strategy for a personality.
#[must_use]
pub fn strategy_for(personality: Personality) -> &'static dyn RewriteStrategy {
    match personality {
        Personality::CalmMentor => &CalmMentor,
        Personality::WittyFriend => &WittyFriend,
        Personality::Therapist => &Therapist,
    }
}
