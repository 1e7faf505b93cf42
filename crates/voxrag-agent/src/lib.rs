//! Voice agent runtime for voxrag.
//!
//! An [`AgentSession`] runs the turn loop for one user: transcribe the
//! utterance, let the [`Agent`] enrich a per-turn copy of the conversation,
//! generate a reply, and optionally synthesize it. [`RagVoiceAgent`] is the
//! knowledge-base assistant whose hook retrieves the user's own documents
//! before every reply.

pub mod agent;
pub mod config;
pub mod console;
pub mod session;

pub use agent::{
    inject_knowledge, Agent, GenericAgent, RagVoiceAgent, KNOWLEDGE_HEADER, NO_KNOWLEDGE_MESSAGE,
    RAG_INSTRUCTIONS,
};
pub use config::{load_config, Config, ConfigError};
pub use console::{parse_line, run_console, ConsoleInput};
pub use session::{AgentReply, AgentSession, SessionError, UserTurn};
