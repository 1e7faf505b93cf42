//! Agent definitions and the retrieval-augmentation hook.

use async_trait::async_trait;
use voxrag_retrieval::{Retriever, StatsSnapshot};
use voxrag_types::{ChatContext, ChatMessage, ChatRole, Document};

/// Header placed before retrieved passages.
pub const KNOWLEDGE_HEADER: &str = "Knowledge base information:";

/// Injected when retrieval finds nothing usable for the turn.
pub const NO_KNOWLEDGE_MESSAGE: &str = "No relevant knowledge base information was found.";

/// Instructions for the knowledge-base voice assistant.
pub const RAG_INSTRUCTIONS: &str = "You are a voice AI assistant. \
Always speak only in English. \
Answer strictly from the provided knowledge base context. \
If the answer is not found in the context, say exactly: 'I do not know.' \
Use short spoken sentences.";

/// Behaviour plugged into an [`AgentSession`](crate::AgentSession).
#[async_trait]
pub trait Agent: Send + Sync {
    /// Name the agent is dispatched under.
    fn name(&self) -> &str;

    /// System instructions prepended to every LLM request.
    fn instructions(&self) -> &str;

    /// Context the session starts from.
    fn initial_context(&self) -> ChatContext {
        ChatContext::new()
    }

    /// Called once per completed user utterance, before the user message is
    /// appended and before the reply is generated. Messages added to
    /// `turn_ctx` are visible to this turn's reply only.
    async fn on_user_turn_completed(&self, _turn_ctx: &mut ChatContext, _new_message: &ChatMessage) {
    }

    /// Retrieval counters, for agents that retrieve.
    fn retrieval_stats(&self) -> Option<StatsSnapshot> {
        None
    }
}

/// Plain conversational agent with no per-turn hook.
#[derive(Debug, Clone)]
pub struct GenericAgent {
    name: String,
    instructions: String,
    initial_ctx: ChatContext,
}

impl GenericAgent {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            initial_ctx: ChatContext::new(),
        }
    }

    pub fn with_context(mut self, ctx: ChatContext) -> Self {
        self.initial_ctx = ctx;
        self
    }
}

#[async_trait]
impl Agent for GenericAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn instructions(&self) -> &str {
        &self.instructions
    }

    fn initial_context(&self) -> ChatContext {
        self.initial_ctx.clone()
    }
}

/// Voice assistant that grounds each reply in the user's own documents.
///
/// One instance per session. The [`Retriever`] is shared across sessions.
#[derive(Debug, Clone)]
pub struct RagVoiceAgent {
    name: String,
    user_id: String,
    retriever: Retriever,
}

impl RagVoiceAgent {
    pub fn new(user_id: impl Into<String>, retriever: Retriever) -> Self {
        Self {
            name: "voice-agent".to_string(),
            user_id: user_id.into(),
            retriever,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[async_trait]
impl Agent for RagVoiceAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn instructions(&self) -> &str {
        RAG_INSTRUCTIONS
    }

    async fn on_user_turn_completed(&self, turn_ctx: &mut ChatContext, new_message: &ChatMessage) {
        let outcome = self
            .retriever
            .retrieve(new_message.text_content(), &self.user_id)
            .await;
        tracing::debug!(
            user_id = %self.user_id,
            outcome = outcome.label(),
            documents = outcome.documents().len(),
            "retrieval finished"
        );
        inject_knowledge(turn_ctx, outcome.documents());
    }

    fn retrieval_stats(&self) -> Option<StatsSnapshot> {
        Some(self.retriever.stats().snapshot())
    }
}

/// Appends exactly one message describing `docs` to `turn_ctx`.
///
/// With documents: an assistant message holding [`KNOWLEDGE_HEADER`], a blank
/// line, then the passages separated by blank lines. Without: a system
/// message holding [`NO_KNOWLEDGE_MESSAGE`].
pub fn inject_knowledge(turn_ctx: &mut ChatContext, docs: &[Document]) {
    if docs.is_empty() {
        turn_ctx.add_message(ChatRole::System, NO_KNOWLEDGE_MESSAGE);
        return;
    }

    let passages = docs
        .iter()
        .map(|d| d.page_content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    turn_ctx.add_message(
        ChatRole::Assistant,
        format!("{}\n\n{}", KNOWLEDGE_HEADER, passages),
    );
}
