use memoir_core::Personality;
use once_cell::sync::Lazy;
use rand::RngCore;
use rand::seq::SliceRandom;
use regex::Regex;

use super::RewriteStrategy;

pub const EMOJIS: [&str; 5] = ["😄", "👍", "✨", "🎯", "💡"];

/// Sign-offs placed before the emoji, so the output always ends with one.
const SIGN_OFFS: [&str; 4] = ["", " Pretty neat, right?", " Just saying!", " Hope that helps!"];

/// Whole-word greetings and answers swapped for casual ones.
static CASUAL: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\bHello\b", "Hey there"),
        (r"\bOkay\b", "Cool"),
        (r"\bYes\b", "Yep"),
        (r"\bNo\b", "Nah"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Casual voice with an emoji sign-off.
#[derive(Debug, Clone, Copy, Default)]
pub struct WittyFriend;

impl RewriteStrategy for WittyFriend {
    fn personality(&self) -> Personality {
        Personality::WittyFriend
    }

    fn rewrite(&self, text: &str, rng: &mut dyn RngCore) -> String {
        let casual = CASUAL
            .iter()
            .fold(text.trim().to_string(), |acc, (re, replacement)| {
                re.replace_all(&acc, *replacement).into_owned()
            });
        let emoji = EMOJIS.choose(rng).copied().unwrap_or("😄");
        let sign_off = SIGN_OFFS.choose(rng).copied().unwrap_or_default();
        format!("{casual}{sign_off} {emoji}")
    }
}
