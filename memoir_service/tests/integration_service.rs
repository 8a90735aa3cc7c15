//! Integration tests for the service facade.
//!
//! These tests verify that:
//! - The deterministic path serves requests without an assist
//! - Capability failures fall back and report the path actually used
//! - Invalid records and unknown personalities are hard failures

#![expect(clippy::expect_used, reason = "Test failure should panic with context")]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use memoir_core::{
    DEFAULT_USER_ID, Error, MemoryAssist, MemoryRecord, Message, Personality, PreferenceCategory,
    PreferenceRecord, Result, Role,
};
use memoir_service::{MemoryService, Method};

#[derive(Clone, Copy)]
enum Behaviour {
    /// Serves every request.
    Serve,
    /// Reports itself unavailable.
    Offline,
    /// Available, but every call fails.
    Failing,
    /// Returns a record with an out-of-range confidence.
    Invalid,
}

struct MockAssist(Behaviour);

impl MockAssist {
    fn record(confidence: f32) -> MemoryRecord {
        MemoryRecord {
            user_id: DEFAULT_USER_ID.to_string(),
            generated_at: Utc::now(),
            preferences: vec![PreferenceRecord {
                category: PreferenceCategory::Music,
                value: "jazz".to_string(),
                confidence,
                source_messages: vec![0],
            }],
            emotional_patterns: Vec::new(),
            facts: Vec::new(),
            raw_extractions: Vec::new(),
        }
    }
}

#[async_trait]
impl MemoryAssist for MockAssist {
    fn is_available(&self) -> bool {
        !matches!(self.0, Behaviour::Offline)
    }

    async fn extract_memories(&self, _messages: &[Message]) -> Result<MemoryRecord> {
        match self.0 {
            Behaviour::Serve => Ok(Self::record(0.7)),
            Behaviour::Invalid => Ok(Self::record(1.5)),
            Behaviour::Offline | Behaviour::Failing => {
                Err(Error::CapabilityUnavailable("model down".to_string()))
            }
        }
    }

    async fn rewrite(&self, _text: &str, _personality: Personality) -> Result<String> {
        match self.0 {
            Behaviour::Serve | Behaviour::Invalid => Ok("Sounds good, see you then!".to_string()),
            Behaviour::Offline | Behaviour::Failing => {
                Err(Error::CapabilityUnavailable("model down".to_string()))
            }
        }
    }
}

fn service(behaviour: Option<Behaviour>) -> MemoryService {
    let service = MemoryService::with_defaults().expect("default service should build");
    match behaviour {
        Some(b) => service.with_assist(Arc::new(MockAssist(b))),
        None => service,
    }
}

fn batch() -> Vec<Message> {
    vec![
        Message::user(0, "I'm vegetarian"),
        Message::user(1, "I'm vegetarian btw"),
        Message::new(2, Role::Assistant, "Noted!"),
    ]
}

#[tokio::test]
async fn test_deterministic_extraction_by_default() {
    let extraction = service(Some(Behaviour::Serve))
        .extract(&batch(), false)
        .await
        .expect("extraction should succeed");

    assert_eq!(extraction.method, Method::Deterministic);
    let vegetarian: Vec<_> = extraction
        .record
        .preferences
        .iter()
        .filter(|p| p.value.contains("vegetarian"))
        .collect();
    assert_eq!(vegetarian.len(), 1);
    assert_eq!(vegetarian[0].source_messages, vec![0]);
}

#[tokio::test]
async fn test_llm_extraction_when_requested() {
    let extraction = service(Some(Behaviour::Serve))
        .extract(&batch(), true)
        .await
        .expect("extraction should succeed");

    assert_eq!(extraction.method, Method::Llm);
    assert_eq!(extraction.record.preferences[0].value, "jazz");
}

#[tokio::test]
async fn test_fallback_reports_deterministic() {
    for behaviour in [None, Some(Behaviour::Offline), Some(Behaviour::Failing)] {
        let extraction = service(behaviour)
            .extract(&batch(), true)
            .await
            .expect("fallback should succeed");
        assert_eq!(extraction.method, Method::Deterministic);
        assert!(!extraction.record.preferences.is_empty());
    }
}

#[tokio::test]
async fn test_invalid_record_is_a_hard_failure() {
    let result = service(Some(Behaviour::Invalid)).extract(&batch(), true).await;
    assert!(matches!(result, Err(Error::SchemaViolation(_))));
}

#[tokio::test]
async fn test_rewrite_rejects_unknown_key_before_any_work() {
    for use_llm in [false, true] {
        let result = service(Some(Behaviour::Serve))
            .rewrite("Hello", "pirate", use_llm)
            .await;
        assert!(matches!(result, Err(Error::InvalidPersonality(_))));
    }
}

#[tokio::test]
async fn test_llm_rewrite_is_guarded() {
    let rewrite = service(Some(Behaviour::Serve))
        .rewrite("Lunch with Ana on March 15th at 12:30", "calm_mentor", true)
        .await
        .expect("rewrite should succeed");

    assert_eq!(rewrite.method, Method::Llm);
    assert_eq!(rewrite.personality, Personality::CalmMentor);
    assert!(rewrite.rewritten.starts_with("Sounds good, see you then!"));
    for token in ["March 15th", "12:30", "Lunch", "Ana"] {
        assert!(rewrite.rewritten.contains(token), "{token} missing");
    }
}

#[tokio::test]
async fn test_rewrite_falls_back() {
    let rewrite = service(Some(Behaviour::Failing))
        .rewrite("your order shipped", "therapist", true)
        .await
        .expect("fallback should succeed");

    assert_eq!(rewrite.method, Method::Deterministic);
    assert_eq!(rewrite.original, "your order shipped");
    assert!(rewrite.rewritten.contains("your order shipped"));
    assert!(rewrite.rewritten.ends_with('?'));
}

#[tokio::test]
async fn test_respond_uses_the_record() {
    let service = service(None);
    let extraction = service
        .extract(&[Message::user(0, "Work has me so stressed")], false)
        .await
        .expect("extraction should succeed");

    let reply = service
        .respond(&extraction.record, "therapist")
        .expect("therapist is a valid key");
    assert!(reply.contains("stressed"));
    assert!(service.respond(&extraction.record, "nope").is_err());
}

#[test]
fn test_health_reflects_assist() {
    let offline = service(Some(Behaviour::Offline)).health();
    assert!(!offline.llm_available);
    assert_eq!(offline.components["llm"], "unavailable");
    assert_eq!(offline.components["extractor"], "operational");

    let online = service(Some(Behaviour::Serve)).health();
    assert!(online.llm_available);

    let json = serde_json::to_value(&online).expect("health should serialize");
    assert_eq!(json["components"]["validator"], "operational");
}

#[test]
fn test_extract_batches_keeps_order() {
    let batches = vec![
        vec![Message::user(0, "I use Linux daily")],
        Vec::new(),
        vec![Message::user(3, "I'm an early bird")],
    ];
    let results = service(None).extract_batches(&batches);

    assert_eq!(results.len(), 3);
    let values: Vec<Vec<String>> = results
        .into_iter()
        .map(|r| {
            let extraction = r.expect("batch should extract");
            assert_eq!(extraction.method, Method::Deterministic);
            extraction
                .record
                .preferences
                .into_iter()
                .map(|p| p.value)
                .collect()
        })
        .collect();
    assert_eq!(values[0], vec!["linux"]);
    assert!(values[1].is_empty());
    assert_eq!(values[2], vec!["early bird"]);
}
