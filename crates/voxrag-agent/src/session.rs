//! One conversation between a user and an agent.

use crate::agent::Agent;
use std::sync::Arc;
use thiserror::Error;
use voxrag_types::{ChatContext, ChatMessage, ChatRole};
use voxrag_voice::{LanguageModel, SpeechSynthesizer, Transcriber, VoiceError};

/// Errors that end a single turn. The session itself stays usable.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transcription failed: {0}")]
    Transcription(#[source] VoiceError),

    #[error("reply generation failed: {0}")]
    Completion(#[source] VoiceError),
}

/// A completed user utterance.
#[derive(Debug, Clone)]
pub enum UserTurn {
    /// Already-transcribed text.
    Text(String),
    /// Encoded audio to transcribe first. `file_name` carries the container
    /// format via its extension.
    Audio { data: Vec<u8>, file_name: String },
}

/// What the agent said back.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    /// The user utterance this replies to. `None` for the greeting.
    pub transcript: Option<String>,
    pub text: String,
    /// Synthesized speech, when a synthesizer is attached and succeeded.
    pub audio: Option<Vec<u8>>,
}

/// Drives the turn loop for one user.
///
/// The persistent context holds user messages and agent replies only.
/// Anything the agent's hook injects lives in a per-turn copy.
pub struct AgentSession {
    agent: Arc<dyn Agent>,
    llm: Arc<dyn LanguageModel>,
    stt: Arc<dyn Transcriber>,
    tts: Option<Arc<dyn SpeechSynthesizer>>,
    greeting: String,
    chat_ctx: ChatContext,
    turns: u64,
}

impl AgentSession {
    pub fn new(
        agent: Arc<dyn Agent>,
        llm: Arc<dyn LanguageModel>,
        stt: Arc<dyn Transcriber>,
    ) -> Self {
        let chat_ctx = agent.initial_context();
        Self {
            agent,
            llm,
            stt,
            tts: None,
            greeting: "Greet the user and offer assistance.".to_string(),
            chat_ctx,
            turns: 0,
        }
    }

    pub fn with_synthesizer(mut self, tts: Arc<dyn SpeechSynthesizer>) -> Self {
        self.tts = Some(tts);
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    pub fn agent(&self) -> &dyn Agent {
        self.agent.as_ref()
    }

    pub fn chat_ctx(&self) -> &ChatContext {
        &self.chat_ctx
    }

    /// Completed user turns so far.
    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Generates and records the opening reply.
    pub async fn start(&mut self) -> Result<AgentReply, SessionError> {
        tracing::info!(agent = self.agent.name(), "session started");

        let mut messages = self.chat_ctx.with_instructions(self.agent.instructions());
        messages.push(ChatMessage::system(self.greeting.as_str()));

        let text = self
            .llm
            .complete(&messages)
            .await
            .map_err(SessionError::Completion)?;
        self.chat_ctx.add_message(ChatRole::Assistant, text.as_str());

        let audio = self.speak(&text).await;
        Ok(AgentReply {
            transcript: None,
            text,
            audio,
        })
    }

    /// Runs one user turn. Returns `Ok(None)` when the utterance is blank.
    pub async fn handle_turn(&mut self, turn: UserTurn) -> Result<Option<AgentReply>, SessionError> {
        let transcript = match turn {
            UserTurn::Text(text) => text,
            UserTurn::Audio { data, file_name } => self
                .stt
                .transcribe(data, &file_name)
                .await
                .map_err(SessionError::Transcription)?,
        };

        let transcript = transcript.trim();
        if transcript.is_empty() {
            tracing::debug!("blank utterance, no reply");
            return Ok(None);
        }

        let user_message = ChatMessage::user(transcript);
        let mut turn_ctx = self.chat_ctx.clone();
        self.agent
            .on_user_turn_completed(&mut turn_ctx, &user_message)
            .await;
        turn_ctx.push(user_message.clone());

        let text = self
            .llm
            .complete(&turn_ctx.with_instructions(self.agent.instructions()))
            .await
            .map_err(SessionError::Completion)?;

        self.chat_ctx.push(user_message);
        self.chat_ctx.add_message(ChatRole::Assistant, text.as_str());
        self.turns += 1;
        tracing::info!(turn = self.turns, reply_chars = text.len(), "turn complete");

        let audio = self.speak(&text).await;
        Ok(Some(AgentReply {
            transcript: Some(transcript.to_string()),
            text,
            audio,
        }))
    }

    /// Ends the session, logging its counters.
    pub fn close(self) {
        match self.agent.retrieval_stats() {
            Some(stats) => tracing::info!(
                agent = self.agent.name(),
                turns = self.turns,
                queries = stats.queries,
                matched = stats.matched,
                no_match = stats.no_match,
                skipped = stats.skipped,
                failed = stats.failed,
                "session closed"
            ),
            None => tracing::info!(agent = self.agent.name(), turns = self.turns, "session closed"),
        }
    }

    async fn speak(&self, text: &str) -> Option<Vec<u8>> {
        let tts = self.tts.as_ref()?;
        match tts.synthesize(text).await {
            Ok(audio) => Some(audio),
            Err(e) => {
                tracing::warn!(error = %e, "speech synthesis failed, replying with text only");
                None
            }
        }
    }
}

impl std::fmt::Debug for AgentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSession")
            .field("agent", &self.agent.name())
            .field("messages", &self.chat_ctx.len())
            .field("turns", &self.turns)
            .field("speech", &self.tts.is_some())
            .finish()
    }
}
