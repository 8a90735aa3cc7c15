//! The pattern catalog.
//!
//! Detectors are plain data ([`DetectorDef`], [`EmotionDef`]) loaded from the
//! `extraction` section of the config file; [`DetectorDef::build`] compiles
//! them into matchers. All matching is case-insensitive.

use memoir_core::{EmotionalPattern, PreferenceCategory};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Confidence of a simple keyword detector.
pub const SIMPLE_CONFIDENCE: f32 = 0.85;
/// Confidence of an "allergic to X" statement.
pub const ALLERGY_CONFIDENCE: f32 = 0.95;
/// Confidence of a pet mention.
pub const PET_CONFIDENCE: f32 = 0.90;
/// Confidence of an emotional keyword.
pub const EMOTION_CONFIDENCE: f32 = 0.80;

/// Error type for detector building.
#[derive(Debug)]
pub enum BuildError {
    /// The regex pattern is invalid.
    Regex { detector: String, reason: String },

    /// The detector has no name.
    EmptyName,

    /// A parameterized detector lacks its capture group.
    MissingCapture { detector: String },

    /// The entity tagger could not be constructed.
    Tagger(String),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regex { detector, reason } => {
                write!(f, "invalid regex for detector '{detector}': {reason}")
            }
            Self::EmptyName => write!(f, "detector name must not be empty"),
            Self::MissingCapture { detector } => {
                write!(f, "detector '{detector}' needs a capture group for its value")
            }
            Self::Tagger(e) => write!(f, "failed to build entity tagger: {e}"),
        }
    }
}

impl std::error::Error for BuildError {}

/// How a detector turns a match into a preference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DetectorShape {
    /// The detector name is the value.
    #[default]
    Simple,
    /// Group 1 is the allergen: "allergic to <allergen>".
    Allergy,
    /// Group 1 is the pet type, optional group 2 its name.
    Pet,
}

/// Definition of a single preference detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorDef {
    /// Detector name; also the value of simple detectors.
    pub name: String,

    /// Regex, matched case-insensitively.
    pub pattern: String,

    #[serde(default)]
    pub shape: DetectorShape,

    /// Overrides [`categorize`] for simple detectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<PreferenceCategory>,
}

impl DetectorDef {
    #[must_use]
    pub fn simple(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            shape: DetectorShape::Simple,
            category: None,
        }
    }

    /// Compile into a [`Detector`].
    ///
    /// # Errors
    /// Returns an error if the name is empty, the regex is invalid, or a
    /// parameterized detector has no capture group.
    pub fn build(&self) -> Result<Detector, BuildError> {
        if self.name.trim().is_empty() {
            return Err(BuildError::EmptyName);
        }

        let regex = compile(&self.pattern).map_err(|e| BuildError::Regex {
            detector: self.name.clone(),
            reason: e.to_string(),
        })?;

        let rule = match self.shape {
            DetectorShape::Simple => ValueRule::Fixed {
                category: self.category.unwrap_or_else(|| categorize(&self.name)),
                value: self.name.replace(['_', '-'], " "),
            },
            DetectorShape::Allergy | DetectorShape::Pet => {
                if regex.captures_len() < 2 {
                    return Err(BuildError::MissingCapture {
                        detector: self.name.clone(),
                    });
                }
                if self.shape == DetectorShape::Allergy {
                    ValueRule::Allergy
                } else {
                    ValueRule::Pet
                }
            }
        };

        Ok(Detector {
            name: self.name.clone(),
            regex,
            rule,
        })
    }
}

#[derive(Debug, Clone)]
pub enum ValueRule {
    Fixed {
        category: PreferenceCategory,
        value: String,
    },
    Allergy,
    Pet,
}

/// A compiled preference detector.
#[derive(Debug, Clone)]
pub struct Detector {
    pub name: String,
    regex: Regex,
    rule: ValueRule,
}

/// The first match of a detector within one text.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// The matched text, used for the dedup key.
    pub matched: String,
    pub category: PreferenceCategory,
    pub value: String,
    pub confidence: f32,
}

impl Detector {
    /// Search `text` once; only the first match counts.
    #[must_use]
    pub fn detect(&self, text: &str) -> Option<Detection> {
        let caps = self.regex.captures(text)?;
        let matched = caps.get(0)?.as_str().to_string();

        let (category, value, confidence) = match &self.rule {
            ValueRule::Fixed { category, value } => (*category, value.clone(), SIMPLE_CONFIDENCE),
            ValueRule::Allergy => {
                let allergen = caps.get(1)?.as_str().to_lowercase();
                (
                    PreferenceCategory::Health,
                    format!("allergic to {allergen}"),
                    ALLERGY_CONFIDENCE,
                )
            }
            ValueRule::Pet => {
                let kind = caps.get(1)?.as_str().to_lowercase();
                let value = caps.get(2).map_or_else(
                    || format!("has {kind}"),
                    |name| format!("has {kind} named {}", name.as_str()),
                );
                (PreferenceCategory::Lifestyle, value, PET_CONFIDENCE)
            }
        };

        Some(Detection {
            matched,
            category,
            value,
            confidence,
        })
    }
}

/// Definition of an emotional-pattern detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionDef {
    pub pattern: EmotionalPattern,
    pub regex: String,
}

impl EmotionDef {
    /// # Errors
    /// Returns an error if the regex is invalid.
    pub fn build(&self) -> Result<EmotionDetector, BuildError> {
        let regex = compile(&self.regex).map_err(|e| BuildError::Regex {
            detector: self.pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(EmotionDetector {
            pattern: self.pattern,
            regex,
        })
    }
}

#[derive(Debug, Clone)]
pub struct EmotionDetector {
    pub pattern: EmotionalPattern,
    regex: Regex,
}

impl EmotionDetector {
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Category of a simple detector, by name.
#[must_use]
pub fn categorize(detector: &str) -> PreferenceCategory {
    match detector {
        "vegetarian" | "green tea" | "coffee lover" | "tea lover" => PreferenceCategory::Food,
        "lo-fi" => PreferenceCategory::Music,
        "async" | "hates meetings" | "works late" | "early bird" | "remote work" => {
            PreferenceCategory::WorkStyle
        }
        "linux" => PreferenceCategory::Technology,
        "short messages" | "prefer text" | "direct communication" => {
            PreferenceCategory::Communication
        }
        "introvert" | "extrovert" => PreferenceCategory::Personality,
        "exercise" => PreferenceCategory::Lifestyle,
        "reading" => PreferenceCategory::Hobby,
        _ => PreferenceCategory::General,
    }
}

/// Default preference detectors, in evaluation order.
#[must_use]
pub fn default_detectors() -> Vec<DetectorDef> {
    vec![
        DetectorDef::simple("vegetarian", r"\b(vegetarian|vegan|plant-based)\b"),
        DetectorDef::simple("lo-fi", r"\b(lo-?fi)\b"),
        DetectorDef::simple("green tea", r"\bgreen tea\b"),
        DetectorDef::simple("async", r"\b(async|asynchronous)\b"),
        DetectorDef::simple(
            "hates meetings",
            r"\b(hate|dislike|struggling with)\b.*\b(meetings?|standups?)\b",
        ),
        DetectorDef::simple("linux", r"\blinux\b"),
        DetectorDef {
            name: "allergic".to_string(),
            pattern: r"\ballergic to ([a-z]+)\b".to_string(),
            shape: DetectorShape::Allergy,
            category: None,
        },
        DetectorDef::simple(
            "short messages",
            r"\b(brief|short|concise)\b.*\b(messages?|communication)\b",
        ),
        DetectorDef::simple("works late", r"\b(work|working)\b.*\b(late|night)\b"),
        DetectorDef {
            name: "pet".to_string(),
            // The name must be capitalised: "my dog Max", "a cat named Luna".
            pattern: r"\b(cat|dog|pet)\b(?:,?\s+(?:named\s+|called\s+)?(?-i:([A-Z][a-z]+)))?"
                .to_string(),
            shape: DetectorShape::Pet,
            category: None,
        },
        DetectorDef::simple("prefer text", r"\bprefer\b.*\b(text|async|writing)\b"),
        DetectorDef::simple("direct communication", r"\bdirect\s+communication\b"),
        DetectorDef::simple("early bird", r"\b(morning person|early bird|wake up early)\b"),
        DetectorDef::simple("introvert", r"\b(introvert|introverted|prefer alone time)\b"),
        DetectorDef::simple("extrovert", r"\b(extrovert|extroverted|love socializing)\b"),
        DetectorDef::simple("remote work", r"\b(remote work|work from home|wfh)\b"),
        DetectorDef::simple("coffee lover", r"\b(love coffee|coffee addict|need coffee)\b"),
        DetectorDef::simple("tea lover", r"\b(love tea|tea person|prefer tea)\b"),
        DetectorDef::simple("exercise", r"\b(gym|workout|exercise|fitness)\b"),
        DetectorDef::simple("reading", r"\b(love reading|enjoy books|bookworm)\b"),
    ]
}

/// Default emotional-pattern detectors.
#[must_use]
pub fn default_emotions() -> Vec<EmotionDef> {
    let def = |pattern, regex: &str| EmotionDef {
        pattern,
        regex: regex.to_string(),
    };
    vec![
        def(
            EmotionalPattern::Stress,
            r"\b(stressed|anxious|overwhelmed|frustrated)\b",
        ),
        def(
            EmotionalPattern::Appreciation,
            r"\b(appreciate|grateful|thankful)\b",
        ),
        def(EmotionalPattern::Overthinking, r"\boverthink(ing)?\b"),
        def(
            EmotionalPattern::Excited,
            r"\b(excited|thrilled|looking forward)\b",
        ),
        def(EmotionalPattern::Tired, r"\b(tired|exhausted|burned out)\b"),
        def(EmotionalPattern::Happy, r"\b(happy|joyful|delighted)\b"),
        def(EmotionalPattern::Confused, r"\b(confused|unsure|uncertain)\b"),
    ]
}
