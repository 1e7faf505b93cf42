use crate::config::{DispatchConfig, LiveKitConfig};
use crate::error::VoiceError;
use livekit_api::access_token::{AccessToken, VideoGrants};
use livekit_protocol::{RoomAgentDispatch, RoomConfiguration};
use serde::Serialize;
use std::time::Duration;

/// Credential and connection details handed back to a client.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub server_url: String,
    pub room_name: String,
    pub participant_token: String,
}

/// Mints room credentials for per-user rooms.
///
/// Holds the signing key for the lifetime of the process and is never
/// mutated after construction, so one instance is shared across requests.
#[derive(Debug)]
pub struct TokenIssuer {
    livekit: LiveKitConfig,
    dispatch: DispatchConfig,
}

impl TokenIssuer {
    pub fn new(livekit: LiveKitConfig, dispatch: DispatchConfig) -> Self {
        Self { livekit, dispatch }
    }

    pub fn server_url(&self) -> &str {
        &self.livekit.url
    }

    pub fn agent_name(&self) -> &str {
        &self.dispatch.agent_name
    }

    /// Room a given user id is routed into. One room per distinct id.
    pub fn room_name_for(&self, user_id: &str) -> String {
        format!("{}{}", self.dispatch.room_prefix, user_id)
    }

    /// Issues a join credential for `user_id`.
    ///
    /// The id is trimmed first; an empty result is rejected with
    /// [`VoiceError::InvalidIdentity`] before any token is built.
    pub fn issue(&self, user_id: &str) -> Result<IssuedToken, VoiceError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(VoiceError::InvalidIdentity);
        }

        let room_name = self.room_name_for(user_id);

        let token = AccessToken::with_api_key(&self.livekit.api_key, &self.livekit.api_secret)
            .with_identity(user_id)
            .with_name(user_id)
            .with_grants(self.grants_for(&room_name))
            .with_room_config(self.room_config_for(user_id))
            .with_ttl(Duration::from_secs(self.livekit.token_ttl_seconds));

        let participant_token = token.to_jwt()?;

        tracing::debug!(
            room = %room_name,
            agent = %self.dispatch.agent_name,
            "issued room credential"
        );

        Ok(IssuedToken {
            server_url: self.livekit.url.clone(),
            room_name,
            participant_token,
        })
    }

    fn grants_for(&self, room_name: &str) -> VideoGrants {
        if self.dispatch.explicit_grants {
            VideoGrants {
                room_join: true,
                room: room_name.to_string(),
                can_publish: true,
                can_subscribe: true,
                ..Default::default()
            }
        } else {
            VideoGrants {
                room_join: true,
                room: room_name.to_string(),
                ..Default::default()
            }
        }
    }

    fn room_config_for(&self, user_id: &str) -> RoomConfiguration {
        let metadata = if self.dispatch.include_metadata {
            dispatch_metadata(user_id)
        } else {
            String::new()
        };

        RoomConfiguration {
            agents: vec![RoomAgentDispatch {
                agent_name: self.dispatch.agent_name.clone(),
                metadata,
                ..Default::default()
            }],
            ..Default::default()
        }
    }
}

/// JSON metadata attached to the agent dispatch.
pub fn dispatch_metadata(user_id: &str) -> String {
    serde_json::json!({ "user_id": user_id }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            LiveKitConfig::new("wss://example.livekit.cloud", "devkey", "secret"),
            DispatchConfig::default(),
        )
    }

    #[test]
    fn room_name_is_prefix_plus_id() {
        assert_eq!(issuer().room_name_for("alice"), "user-alice");
    }

    #[test]
    fn blank_identity_is_rejected() {
        let issuer = issuer();
        assert!(matches!(issuer.issue(""), Err(VoiceError::InvalidIdentity)));
        assert!(matches!(issuer.issue("  \t\n"), Err(VoiceError::InvalidIdentity)));
    }

    #[test]
    fn identity_is_trimmed_before_deriving_room() {
        let issued = issuer().issue("  bob ").unwrap();
        assert_eq!(issued.room_name, "user-bob");
    }

    #[test]
    fn metadata_escapes_identity() {
        let meta = dispatch_metadata("a\"b");
        let value: serde_json::Value = serde_json::from_str(&meta).unwrap();
        assert_eq!(value["user_id"], "a\"b");
    }
}
