//! Identifier value objects.
//!
//! Chat-platform identifiers are opaque strings (Discord snowflakes in
//! practice). Wrapping them keeps member, role and channel ids from being
//! mixed up at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// A guild member (user) identifier.
    MemberId
);

string_id!(
    /// A guild role identifier.
    RoleId
);

string_id!(
    /// A channel identifier. DM channels are channels too.
    ChannelId
);

/// Identifier of an outstanding panic vote.
///
/// Doubles as the correlation token embedded in cast-vote buttons, so it
/// round-trips through its string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteId(Uuid);

impl VoteId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The correlation token placed in outbound prompts.
    pub fn token(&self) -> String {
        self.0.to_string()
    }

    /// Parse a correlation token received from an inbound cast event.
    pub fn from_token(token: &str) -> Option<Self> {
        Uuid::parse_str(token.trim()).ok().map(Self)
    }
}

impl fmt::Display for VoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_id_token_roundtrip() {
        let id = VoteId::generate();
        assert_eq!(VoteId::from_token(&id.token()), Some(id));
        assert_eq!(VoteId::from_token(&format!("  {}\n", id.token())), Some(id));
    }

    #[test]
    fn test_vote_id_rejects_garbage() {
        assert_eq!(VoteId::from_token("not-a-vote"), None);
        assert_eq!(VoteId::from_token(""), None);
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(VoteId::generate(), VoteId::generate());
    }

    #[test]
    fn test_string_ids() {
        let member = MemberId::from("1234");
        assert_eq!(member.as_str(), "1234");
        assert_eq!(member.to_string(), "1234");
        assert!(!member.is_empty());
        assert!(RoleId::new("").is_empty());
    }
}
