mod types;

pub use types::{
    DEFAULT_USER_ID, EmotionalPattern, EmotionalPatternRecord, FactRecord, FactType,
    MemoryRecord, PreferenceCategory, PreferenceRecord, RawExtraction,
};
