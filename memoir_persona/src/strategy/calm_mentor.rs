use memoir_core::Personality;
use once_cell::sync::Lazy;
use rand::RngCore;
use rand::seq::SliceRandom;
use regex::Regex;

use super::RewriteStrategy;

const OPENERS: [&str; 4] = [
    "Take a moment to consider this: ",
    "Here's a thoughtful perspective: ",
    "Let me share something with you: ",
    "I'd encourage you to reflect on this: ",
];

/// Imperatives softened into suggestions, matched case-insensitively.
static SOFTENERS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\byou should\b", "you might consider"),
        (r"(?i)\byou must\b", "it would be wise to"),
        (r"(?i)\bdo this\b", "explore this approach"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Gentle, reflective voice: softened imperatives behind a mentor's opener.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalmMentor;

impl CalmMentor {
    fn soften(text: &str) -> String {
        SOFTENERS
            .iter()
            .fold(text.to_string(), |acc, (re, replacement)| {
                re.replace_all(&acc, *replacement).into_owned()
            })
    }
}

impl RewriteStrategy for CalmMentor {
    fn personality(&self) -> Personality {
        Personality::CalmMentor
    }

    fn rewrite(&self, text: &str, rng: &mut dyn RngCore) -> String {
        let opener = OPENERS.choose(rng).copied().unwrap_or_default();
        format!("{opener}{}", capitalize(&Self::soften(text.trim())))
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn softens_imperatives_in_any_case() {
        let mut rng = StdRng::seed_from_u64(7);
        let out = CalmMentor.rewrite("You should do this task. you MUST rest.", &mut rng);
        let lower = out.to_lowercase();
        assert!(lower.contains("you might consider explore this approach task"));
        assert!(lower.contains("it would be wise to rest"));
        assert!(!lower.contains("you should"));
    }

    #[test]
    fn starts_with_an_opener_and_keeps_the_rest_of_the_text() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let out = CalmMentor.rewrite("the deadline is March 15th", &mut rng);
            let opener = OPENERS
                .iter()
                .find(|o| out.starts_with(**o))
                .unwrap_or_else(|| panic!("no opener in {out:?}"));
            assert_eq!(&out[opener.len()..], "The deadline is March 15th");
        }
    }

    #[test]
    fn empty_text_yields_only_the_opener() {
        let mut rng = StdRng::seed_from_u64(3);
        let out = CalmMentor.rewrite("", &mut rng);
        assert!(OPENERS.contains(&out.as_str()));
    }
}
