//! Voice infrastructure for voxrag.
//!
//! Two concerns live here. The first is LiveKit room credentials: per-user
//! rooms, capability grants, and the agent-dispatch directive embedded in
//! each token. The second is the hosted speech and language provider:
//! transcription of user utterances, chat completion for replies, and
//! synthesis of the reply audio.
//!
//! Provider clients sit behind the [`LanguageModel`], [`Transcriber`] and
//! [`SpeechSynthesizer`] traits so sessions can be driven by fakes in tests.

mod http;

pub mod config;
pub mod error;
pub mod llm;
pub mod stt;
pub mod token;
pub mod tts;

pub use config::{DispatchConfig, LiveKitConfig, OpenAiConfig};
pub use error::VoiceError;
pub use llm::{LanguageModel, OpenAiChat};
pub use stt::{OpenAiTranscriber, Transcriber};
pub use token::{dispatch_metadata, IssuedToken, TokenIssuer};
pub use tts::{OpenAiSpeech, SpeechSynthesizer};
