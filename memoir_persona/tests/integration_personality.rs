//! Integration tests for the personality engine.
//!
//! These tests verify that:
//! - Critical tokens survive every personality
//! - The three personalities stay distinct over repeated trials
//! - Unknown keys are always rejected

#![expect(clippy::expect_used, reason = "Test failure should panic with context")]

use memoir_core::{Error, Personality};
use memoir_persona::{IMPORTANT_PREFIX, PersonalityEngine, extract_critical_tokens};
use rand::SeedableRng;
use rand::rngs::StdRng;

const EMOJIS: [&str; 5] = ["😄", "👍", "✨", "🎯", "💡"];

#[test]
fn test_calm_mentor_keeps_the_meeting_date() {
    let engine = PersonalityEngine::new();
    let out = engine
        .rewrite("The meeting is on March 15th at 3:00 PM", "calm_mentor")
        .expect("calm_mentor is a valid key");

    let lower = out.to_lowercase();
    assert!(lower.contains("march"));
    assert!(lower.contains("15"));
    assert!(lower.contains("3:00 pm"));
}

#[test]
fn test_critical_tokens_survive_every_personality() {
    let engine = PersonalityEngine::new();
    let texts = [
        "Hello Sam, the review is on 04/12/2025 at 10:30 AM.",
        "No, the flight to New York leaves December 2nd at 6:45 pm.",
        "Okay, you should call Dr Rivera before 9:00.",
        "Yes. Hello again, Maria Lopez!",
    ];
    let mut rng = StdRng::seed_from_u64(42);

    for text in texts {
        let tokens = extract_critical_tokens(text);
        assert!(!tokens.is_empty());
        for personality in Personality::ALL {
            for _ in 0..10 {
                let out = engine.rewrite_with(text, personality, &mut rng).to_lowercase();
                for token in &tokens {
                    assert!(
                        out.contains(&token.to_lowercase()),
                        "{token:?} missing from {personality} output {out:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_replaced_greetings_are_restored_by_the_guard() {
    let engine = PersonalityEngine::new();
    let mut rng = StdRng::seed_from_u64(3);
    let out = engine.rewrite_with("Hello there", Personality::WittyFriend, &mut rng);

    assert!(out.starts_with("Hey there there"));
    assert!(out.ends_with(&format!("{IMPORTANT_PREFIX}Hello)")));
}

#[test]
fn test_personalities_are_pairwise_distinct() {
    let engine = PersonalityEngine::new();
    let text = "Your task is complete. The deadline is March 15th.";

    for seed in 0..100 {
        let mut rng = StdRng::seed_from_u64(seed);
        let outputs: Vec<String> = Personality::ALL
            .into_iter()
            .map(|p| engine.rewrite_with(text, p, &mut rng))
            .collect();
        assert_ne!(outputs[0], outputs[1]);
        assert_ne!(outputs[0], outputs[2]);
        assert_ne!(outputs[1], outputs[2]);
    }
}

#[test]
fn test_structural_markers() {
    let engine = PersonalityEngine::new();
    let text = "your task is complete";

    for _ in 0..30 {
        let witty = engine.rewrite(text, "witty_friend").expect("valid key");
        assert!(EMOJIS.iter().any(|e| witty.ends_with(e)), "{witty:?}");

        let therapist = engine.rewrite(text, "therapist").expect("valid key");
        assert!(therapist.contains('?'));
        assert!(therapist.contains(text));

        let calm = engine.rewrite(text, "calm_mentor").expect("valid key");
        assert!(calm.ends_with("Your task is complete"));
    }
}

#[test]
fn test_unknown_keys_are_rejected_every_time() {
    let engine = PersonalityEngine::new();
    for key in ["unknown", "CalmMentor", "mentor", ""] {
        for text in ["", "Hello Sam", "The meeting is on March 15th"] {
            let result = engine.rewrite(text, key);
            assert!(
                matches!(result, Err(Error::InvalidPersonality(_))),
                "{key:?} should be rejected"
            );
        }
    }
}

#[test]
fn test_concurrent_rewrites_share_one_engine() {
    let engine = PersonalityEngine::new();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    (0..50)
                        .map(|_| {
                            engine
                                .rewrite("Meet Ana at 9:15", "therapist")
                                .expect("valid key")
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            let outputs = handle.join().expect("worker should not panic");
            assert!(outputs.iter().all(|o| o.contains("Meet Ana at 9:15")));
        }
    });
}
