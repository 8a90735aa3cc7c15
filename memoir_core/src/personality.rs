use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The fixed set of rewriting styles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    CalmMentor,
    WittyFriend,
    Therapist,
}

impl Personality {
    pub const ALL: [Self; 3] = [Self::CalmMentor, Self::WittyFriend, Self::Therapist];

    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::CalmMentor => "calm_mentor",
            Self::WittyFriend => "witty_friend",
            Self::Therapist => "therapist",
        }
    }
}

impl std::fmt::Display for Personality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys are matched exactly; there is no default personality.
impl std::str::FromStr for Personality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::InvalidPersonality(s.to_string()))
    }
}
