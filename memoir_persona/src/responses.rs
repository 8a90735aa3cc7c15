//! Memory-aware replies.
//!
//! Picks the most salient memory of a record and voices it through a
//! personality frame. Salience: the first emotional pattern, else the
//! highest-confidence preference, else the first fact.

use memoir_core::{
    EmotionalPattern, FactRecord, FactType, MemoryRecord, Personality, PreferenceCategory,
    PreferenceRecord,
};
use rand::RngCore;
use rand::seq::SliceRandom;

use crate::strategy::EMOJIS;

const CALM_FRAMES: [&str; 3] = [
    "I remember {memory}. Take whatever time you need with it.",
    "Thinking back, {memory}. Let's carry that forward thoughtfully.",
    "It stays with me that {memory}. There's no rush in how you approach it.",
];

const WITTY_FRAMES: [&str; 3] = [
    "Oh hey, not gonna lie, I remember {memory}!",
    "Ha, {memory}, right? I keep notes.",
    "Fun fact: {memory}. Told you I pay attention!",
];

const THERAPIST_FRAMES: [&str; 3] = [
    "I recall {memory}. How are you feeling about that now?",
    "Earlier, {memory}. What has that been like for you?",
    "I'm noticing {memory}. What would feel supportive around that?",
];

fn emotion_memory(pattern: EmotionalPattern) -> &'static str {
    match pattern {
        EmotionalPattern::Stress => "you've been feeling stressed lately",
        EmotionalPattern::Appreciation => "you've been feeling grateful",
        EmotionalPattern::Overthinking => "you've been overthinking things",
        EmotionalPattern::Excited => "you've been excited about what's ahead",
        EmotionalPattern::Tired => "you've been running low on energy",
        EmotionalPattern::Happy => "you've been in good spirits",
        EmotionalPattern::Confused => "some things have felt unclear to you",
    }
}

fn preference_memory(preference: &PreferenceRecord) -> String {
    let topic = match preference.category {
        PreferenceCategory::Food => "food",
        PreferenceCategory::Music => "music",
        PreferenceCategory::WorkStyle => "how you work",
        PreferenceCategory::Technology => "your tools",
        PreferenceCategory::Communication => "how you like to talk",
        PreferenceCategory::Personality => "who you are",
        PreferenceCategory::Lifestyle => "your routine",
        PreferenceCategory::Hobby => "what you enjoy",
        PreferenceCategory::Health => "your health",
        PreferenceCategory::General => "yourself",
    };
    format!("you told me about {topic}: {}", preference.value)
}

fn fact_memory(fact: &FactRecord) -> String {
    let value = &fact.value;
    match fact.fact_type {
        FactType::Location => format!("{value} is a place that matters to you"),
        FactType::Date | FactType::Time => format!("{value} is on your calendar"),
        FactType::Person => format!("{value} is someone in your life"),
        FactType::Organization => format!("you're connected to {value}"),
        FactType::Product => format!("you use {value}"),
        FactType::Event => format!("{value} is coming up for you"),
        FactType::Language => format!("you speak {value}"),
        FactType::General => format!("you mentioned {value}"),
    }
}

fn most_salient(record: &MemoryRecord) -> Option<String> {
    if let Some(emotion) = record.emotional_patterns.first() {
        return Some(emotion_memory(emotion.pattern).to_string());
    }
    let strongest = record.preferences.iter().reduce(|best, p| {
        if p.confidence > best.confidence { p } else { best }
    });
    if let Some(preference) = strongest {
        return Some(preference_memory(preference));
    }
    record.facts.first().map(fact_memory)
}

fn greeting(personality: Personality) -> &'static str {
    match personality {
        Personality::CalmMentor => "I'm here whenever you'd like to think something through.",
        Personality::WittyFriend => "Hey! Clean slate, nothing on file yet.",
        Personality::Therapist => "I'm here to listen. What's on your mind today?",
    }
}

/// Produce a personality-voiced reply grounded in `record`.
///
/// Witty replies end with an emoji and therapist replies end with a question,
/// matching the rewrite strategies.
#[must_use]
pub fn respond(record: &MemoryRecord, personality: Personality, rng: &mut dyn RngCore) -> String {
    let body = most_salient(record).map_or_else(
        || greeting(personality).to_string(),
        |memory| {
            let frames = match personality {
                Personality::CalmMentor => &CALM_FRAMES,
                Personality::WittyFriend => &WITTY_FRAMES,
                Personality::Therapist => &THERAPIST_FRAMES,
            };
            let frame = frames.choose(rng).copied().unwrap_or(frames[0]);
            frame.replace("{memory}", &memory)
        },
    );

    if personality == Personality::WittyFriend {
        let emoji = EMOJIS.choose(rng).copied().unwrap_or("😄");
        format!("{body} {emoji}")
    } else {
        body
    }
}
