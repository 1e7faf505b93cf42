//! Shared types for the voxrag workspace.
//!
//! This crate provides the domain types passed between the agent, the
//! retrieval layer, and the provider clients: chat roles and messages, the
//! per-session conversation context, and documents returned by vector search.
//!
//! Nothing here talks to the network. Crates that do (`voxrag-voice`,
//! `voxrag-retrieval`) depend on this one, never the other way around.

pub mod chat;
pub mod document;

pub use chat::{ChatContext, ChatMessage};
pub use document::{Document, ScoredDocument};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role tag on a conversation message.
///
/// Serialised in the lowercase form used by chat-completion APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Behavioural instructions and injected context markers.
    System,
    /// The human participant.
    User,
    /// The agent (model replies and injected knowledge).
    Assistant,
}

impl ChatRole {
    /// Returns the wire label for this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChatRole {
    type Err = ParseChatRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(ParseChatRoleError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown chat role string.
#[derive(Debug, Clone, Error)]
#[error("unknown chat role: {0}")]
pub struct ParseChatRoleError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [ChatRole::System, ChatRole::User, ChatRole::Assistant] {
            assert_eq!(role.as_str().parse::<ChatRole>().unwrap(), role);
        }
        assert!("tool".parse::<ChatRole>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
