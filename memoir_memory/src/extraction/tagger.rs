//! Rule-based entity tagger.
//!
//! A model-free [`EntityTagger`] built from date/time expressions, gazetteers,
//! suffix rules and a few contextual cues. Candidates from every recogniser
//! are resolved like a span tagger: leftmost span first, then the longest,
//! then the most specific recogniser. Output is in text order and never
//! overlaps.

use memoir_core::{EntityCategory, EntityTagger, TaggedEntity};
use regex::{Regex, RegexBuilder};

const MONTHS: &str = "January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec";
const WEEKDAYS: &str = "Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday";

const LANGUAGES: &[&str] = &[
    "English", "Spanish", "French", "German", "Italian", "Portuguese", "Mandarin",
    "Cantonese", "Chinese", "Japanese", "Korean", "Hindi", "Arabic", "Russian", "Dutch",
    "Swedish", "Norwegian", "Danish", "Finnish", "Greek", "Turkish", "Polish", "Vietnamese",
    "Thai", "Hebrew", "Bengali", "Urdu", "Swahili", "Tagalog", "Indonesian", "Ukrainian",
];

const PLACES: &[&str] = &[
    "New York", "New York City", "San Francisco", "Los Angeles", "Seattle", "Chicago",
    "Boston", "Austin", "Denver", "Portland", "Miami", "Atlanta", "Toronto", "Vancouver",
    "Montreal", "London", "Manchester", "Edinburgh", "Dublin", "Paris", "Berlin", "Munich",
    "Amsterdam", "Madrid", "Barcelona", "Lisbon", "Rome", "Milan", "Vienna", "Zurich",
    "Stockholm", "Oslo", "Copenhagen", "Prague", "Warsaw", "Tokyo", "Kyoto", "Osaka", "Seoul",
    "Beijing", "Shanghai", "Hong Kong", "Singapore", "Bangkok", "Mumbai", "Delhi", "Bangalore",
    "Sydney", "Melbourne", "Auckland", "Dubai", "Cairo", "Nairobi", "Lagos", "Mexico City",
    "Buenos Aires", "Sao Paulo", "Rio de Janeiro", "United States", "USA", "United Kingdom",
    "UK", "Canada", "Mexico", "Brazil", "Argentina", "France", "Germany", "Spain", "Italy",
    "Portugal", "Ireland", "Netherlands", "Sweden", "Norway", "Japan", "China", "India",
    "Korea", "Australia", "New Zealand", "Kenya", "Nigeria", "Egypt", "California", "Texas",
    "Florida", "Oregon", "Washington", "Colorado", "Massachusetts",
];

const REGIONS: &[&str] = &[
    "Europe", "Asia", "Africa", "North America", "South America", "Antarctica",
    "Middle East", "Silicon Valley", "the Alps", "Alps", "Himalayas", "Rocky Mountains",
    "Mount Everest", "Pacific", "Atlantic", "Mediterranean", "Lake Tahoe", "Yosemite",
];

const ORGANIZATIONS: &[&str] = &[
    "Google", "Microsoft", "Apple", "Amazon", "Meta", "Facebook", "Netflix", "Spotify",
    "OpenAI", "Anthropic", "Tesla", "IBM", "Intel", "Nvidia", "NASA", "Stripe", "GitHub",
    "Mozilla", "Uber", "Airbnb", "Twitter", "LinkedIn", "Adobe", "Oracle", "Salesforce",
    "Shopify", "Red Hat", "Canonical", "Starbucks", "the UN", "WHO",
];

const PRODUCTS: &[&str] = &[
    "iPhone", "iPad", "MacBook", "MacBook Pro", "MacBook Air", "Apple Watch", "AirPods",
    "Kindle", "PlayStation", "Xbox", "Nintendo Switch", "Pixel", "Galaxy", "ThinkPad",
    "Android", "Windows", "Ubuntu", "Excel", "Photoshop", "Figma", "Notion", "Slack",
    "Zoom", "VS Code", "Vim", "Emacs", "ChatGPT",
];

const EVENTS: &[&str] = &[
    "Christmas", "Christmas Eve", "Thanksgiving", "Halloween", "Easter", "New Year's Eve",
    "New Year's Day", "New Year", "Olympics", "World Cup", "Super Bowl", "Black Friday",
    "Ramadan", "Eid", "Diwali", "Hanukkah", "Lunar New Year", "Valentine's Day",
];

/// Relations that introduce a person's name: "my sister Ana".
const PERSON_CUES: &str = "friend|best friend|boss|manager|colleague|coworker|partner|wife|husband|sister|brother|mom|mother|dad|father|son|daughter|therapist|doctor|roommate|girlfriend|boyfriend|cousin|aunt|uncle|neighbor|neighbour|mentor|teacher|coach";

/// Verbs of movement/residence that introduce a place: "moved to Lisbon".
const PLACE_CUES: &str = r"live in|living in|lived in|based in|moved to|moving to|move to|visiting|visited|visit|trip to|flying to|flight to|relocating to";

/// Capitalised words a cue rule must never emit.
const CUE_STOPWORDS: &[&str] = &[
    "I", "The", "A", "An", "My", "Our", "Your", "His", "Her", "Their", "This", "That", "Work",
    "Home", "Here", "There", "Today", "Tomorrow", "Yesterday", "Monday", "Tuesday",
    "Wednesday", "Thursday", "Friday", "Saturday", "Sunday", "January", "February", "March",
    "April", "May", "June", "July", "August", "September", "October", "November", "December",
];

/// Recogniser specificity; wins ties between spans of equal position and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Specificity {
    Cue = 0,
    Rule = 1,
    Gazetteer = 2,
}

#[derive(Debug, Clone)]
struct Recognizer {
    regex: Regex,
    category: EntityCategory,
    /// Capture group holding the entity (0 = whole match).
    group: usize,
    specificity: Specificity,
}

#[derive(Debug, Clone)]
struct Candidate {
    start: usize,
    end: usize,
    category: EntityCategory,
    specificity: Specificity,
}

/// Deterministic, model-free entity tagger.
#[derive(Debug, Clone)]
pub struct RuleBasedTagger {
    recognizers: Vec<Recognizer>,
}

impl RuleBasedTagger {
    /// Tagger with the built-in recognisers and gazetteers.
    ///
    /// # Errors
    /// Returns an error if a built-in pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        let mut recognizers = Vec::new();

        let rules = [
            // "March 15th", "Mar. 3, 2025"
            (
                format!(r"\b(?:{MONTHS})\.?\s+\d{{1,2}}(?:st|nd|rd|th)?(?:,?\s+\d{{4}})?\b"),
                EntityCategory::Date,
            ),
            // "3 June 2024", "June 2024", "15th of March"
            (
                format!(
                    r"\b(?:\d{{1,2}}(?:st|nd|rd|th)?\s+(?:of\s+)?)?(?:{MONTHS})\s+\d{{4}}\b|\b\d{{1,2}}(?:st|nd|rd|th)?\s+(?:of\s+)?(?:{MONTHS})\b"
                ),
                EntityCategory::Date,
            ),
            (
                r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b|\b\d{4}-\d{2}-\d{2}\b".to_string(),
                EntityCategory::Date,
            ),
            (
                format!(r"\b(?:(?i:next|last|this)\s+)?(?:{WEEKDAYS})s?\b"),
                EntityCategory::Date,
            ),
            (
                r"(?i)\b(?:today|tomorrow|yesterday|(?:next|last|this)\s+(?:week|weekend|month|year)|\d+\s+(?:days?|weeks?|months?|years?)\s+ago)\b".to_string(),
                EntityCategory::Date,
            ),
            (
                r"(?i)\b\d{1,2}:\d{2}(?:\s*[ap]m\b)?|\b\d{1,2}\s*[ap]m\b".to_string(),
                EntityCategory::Time,
            ),
            (
                r"(?i)\b(?:noon|midnight|tonight|this\s+(?:morning|afternoon|evening))\b".to_string(),
                EntityCategory::Time,
            ),
            (
                r"\b(?:[A-Z][A-Za-z&]*\s+){1,3}(?:Inc|Corp|Corporation|LLC|Ltd|Company|Group|Labs|University|College|Institute|Foundation|Bank|Hospital)\b\.?|\b(?:University|Bank|Institute|College)\s+of(?:\s+[A-Z][a-z]+)+".to_string(),
                EntityCategory::Org,
            ),
            (
                r"\b(?:[A-Z][A-Za-z']*\s+){1,3}(?:Conference|Festival|Summit|Marathon|Expo|Hackathon|Championship|Con)\b".to_string(),
                EntityCategory::Event,
            ),
            // Honorifics: "Dr. Patel", "Ms Rivera"
            (
                r"\b(?:Mr|Mrs|Ms|Mx|Dr|Prof)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?".to_string(),
                EntityCategory::Person,
            ),
        ];
        for (pattern, category) in rules {
            recognizers.push(Recognizer {
                regex: Regex::new(&pattern)?,
                category,
                group: 0,
                specificity: Specificity::Rule,
            });
        }

        let gazetteers = [
            (LANGUAGES, EntityCategory::Language),
            (PLACES, EntityCategory::Gpe),
            (REGIONS, EntityCategory::Loc),
            (ORGANIZATIONS, EntityCategory::Org),
            (PRODUCTS, EntityCategory::Product),
            (EVENTS, EntityCategory::Event),
        ];
        for (terms, category) in gazetteers {
            recognizers.push(Recognizer {
                regex: gazetteer(terms)?,
                category,
                group: 0,
                specificity: Specificity::Gazetteer,
            });
        }

        let name = r"([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)";
        let cues = [
            (
                format!(r"\b(?i:(?:my|our)\s+(?:{PERSON_CUES}),?)\s+{name}"),
                EntityCategory::Person,
            ),
            (
                format!(r"\b(?i:my\s+name\s+is|named|called)\s+{name}"),
                EntityCategory::Person,
            ),
            (format!(r"\b(?i:{PLACE_CUES})\s+{name}"), EntityCategory::Gpe),
        ];
        for (pattern, category) in cues {
            recognizers.push(Recognizer {
                regex: Regex::new(&pattern)?,
                category,
                group: 1,
                specificity: Specificity::Cue,
            });
        }

        Ok(Self { recognizers })
    }

    /// Add a gazetteer of extra terms for one category.
    ///
    /// # Errors
    /// Returns an error if the combined pattern fails to compile.
    pub fn with_terms(
        mut self,
        category: EntityCategory,
        terms: &[&str],
    ) -> Result<Self, regex::Error> {
        if !terms.is_empty() {
            self.recognizers.push(Recognizer {
                regex: gazetteer(terms)?,
                category,
                group: 0,
                specificity: Specificity::Gazetteer,
            });
        }
        Ok(self)
    }

    fn candidates(&self, text: &str) -> Vec<Candidate> {
        let mut found = Vec::new();
        for recognizer in &self.recognizers {
            for caps in recognizer.regex.captures_iter(text) {
                let Some(m) = caps.get(recognizer.group) else {
                    continue;
                };
                let span = m.as_str().trim_end_matches(['.', ',']);
                if span.is_empty() {
                    continue;
                }
                if recognizer.specificity == Specificity::Cue && is_stopword(span) {
                    continue;
                }
                found.push(Candidate {
                    start: m.start(),
                    end: m.start() + span.len(),
                    category: recognizer.category.clone(),
                    specificity: recognizer.specificity,
                });
            }
        }
        found
    }
}

impl EntityTagger for RuleBasedTagger {
    fn tag(&self, text: &str) -> anyhow::Result<Vec<TaggedEntity>> {
        let mut candidates = self.candidates(text);
        candidates.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then((b.end - b.start).cmp(&(a.end - a.start)))
                .then(b.specificity.cmp(&a.specificity))
        });

        let mut entities = Vec::new();
        let mut cursor = 0;
        for candidate in candidates {
            if candidate.start < cursor {
                continue;
            }
            cursor = candidate.end;
            entities.push(TaggedEntity::new(
                &text[candidate.start..candidate.end],
                candidate.category,
            ));
        }
        Ok(entities)
    }
}

/// Alternation of literal terms, longest first so "New York City" beats "New York".
fn gazetteer(terms: &[&str]) -> Result<Regex, regex::Error> {
    let mut sorted: Vec<&str> = terms.to_vec();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let alternation = sorted
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&format!(r"\b(?:{alternation})\b")).build()
}

fn is_stopword(span: &str) -> bool {
    let first = span.split_whitespace().next().unwrap_or(span);
    CUE_STOPWORDS.contains(&first)
        || LANGUAGES.contains(&span)
        || EVENTS.contains(&span)
}
