//! Conversational assistant: intent routing, reply generation, and the
//! per-user conversation buffer.
//!
//! The orchestration is a one-decision state machine: classify the message,
//! route to exactly one reply strategy, end. No cycles, no re-entry. The
//! entry point never returns an error — every failure path collapses into a
//! fixed safe-fallback reply with the conversation history left untouched.
//! All LLM calls go through llm_client — no direct Anthropic calls here.

pub mod filters;
pub mod handlers;
pub mod intent;
pub mod prompts;
pub mod session;

use std::sync::Arc;

use serde::Serialize;
use tracing::error;

use crate::assistant::filters::FilterAction;
use crate::assistant::intent::Intent;
use crate::assistant::prompts::{
    CHAT_PROMPT_TEMPLATE, CHAT_SYSTEM, HELP_PROMPT_TEMPLATE, HELP_SYSTEM,
};
use crate::assistant::session::{trim_to_cap, SessionStore};
use crate::llm_client::{CompletionBackend, LlmError};
use crate::models::chat::ConversationTurn;

/// Returned to the user when anything inside the state machine fails.
pub const FALLBACK_REPLY: &str = "I'm currently facing some issues processing requests. \
    You can still use manual filters while I recover.";

/// What one assistant query produces: a reply, and optionally a filter
/// instruction for the UI to apply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOutcome {
    pub reply: String,
    pub filter_actions: Option<FilterAction>,
}

/// Orchestration states. A run enters at `DetectIntent` and visits exactly
/// one action state; producing that action's outcome is the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    DetectIntent,
    FilterAction,
    HelpAction,
    ChatAction,
}

/// Pure routing rule out of `DetectIntent`. Everything that is not filter
/// control or a help-shaped question falls through to open chat.
fn decide(intent: Intent) -> State {
    match intent {
        Intent::FilterControl => State::FilterAction,
        Intent::ProductHelp | Intent::ApplicationQuery => State::HelpAction,
        _ => State::ChatAction,
    }
}

/// The conversational assistant. Owns the session store; constructed once at
/// startup and shared via `AppState`.
pub struct Assistant {
    backend: Arc<dyn CompletionBackend>,
    sessions: SessionStore,
}

impl Assistant {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            sessions: SessionStore::new(),
        }
    }

    /// Handles one user message. Never fails: any error inside the state
    /// machine yields the fixed fallback reply and leaves the user's history
    /// exactly as it was before the call.
    ///
    /// The per-user buffer lock is held across read, generation, and append,
    /// so two concurrent queries for the same user cannot interleave into a
    /// stale read or lost update.
    pub async fn process_query(&self, user_id: &str, message: &str) -> ChatOutcome {
        let buffer = self.sessions.buffer(user_id).await;
        let mut history = buffer.lock().await;

        match self.run(message, &history).await {
            Ok(outcome) => {
                history.push(ConversationTurn::user(message));
                history.push(ConversationTurn::assistant(outcome.reply.clone()));
                trim_to_cap(&mut history);
                outcome
            }
            Err(e) => {
                error!("Assistant run failed for user {user_id}: {e}");
                ChatOutcome {
                    reply: FALLBACK_REPLY.to_string(),
                    filter_actions: None,
                }
            }
        }
    }

    /// Drops all stored conversation turns for a user.
    pub async fn clear_history(&self, user_id: &str) {
        self.sessions.clear(user_id).await;
    }

    /// Snapshot of a user's stored history. Empty if unseen.
    pub async fn history(&self, user_id: &str) -> Vec<ConversationTurn> {
        self.sessions.get(user_id).await
    }

    /// One pass of the state machine. Classification absorbs its own
    /// failures; the help and chat generators propagate theirs up to
    /// `process_query`, which owns the fallback.
    async fn run(
        &self,
        message: &str,
        history: &[ConversationTurn],
    ) -> Result<ChatOutcome, LlmError> {
        let mut state = State::DetectIntent;
        loop {
            state = match state {
                State::DetectIntent => {
                    decide(intent::classify(self.backend.as_ref(), message).await)
                }
                State::FilterAction => return Ok(self.filter_action(message).await),
                State::HelpAction => return self.help_action(message).await,
                // The catch-all branch: unexpected intents route here too.
                State::ChatAction => return self.chat_action(message, history).await,
            };
        }
    }

    /// `filter_action` node: extract the filter instruction, acknowledge it
    /// deterministically. Extraction absorbs its own failures, so this node
    /// cannot fail.
    async fn filter_action(&self, message: &str) -> ChatOutcome {
        let extracted = filters::extract_filters(self.backend.as_ref(), message).await;
        ChatOutcome {
            reply: filters::filter_reply(&extracted),
            filter_actions: Some(extracted),
        }
    }

    /// `help_action` node: answer a product/usage question from the current
    /// message alone. History is deliberately not included.
    async fn help_action(&self, message: &str) -> Result<ChatOutcome, LlmError> {
        let prompt = HELP_PROMPT_TEMPLATE.replace("{message}", message);
        let reply = self.backend.complete(&prompt, HELP_SYSTEM).await?;
        Ok(ChatOutcome {
            reply,
            filter_actions: None,
        })
    }

    /// `chat_action` node: open-domain reply grounded in the stored
    /// conversation history.
    async fn chat_action(
        &self,
        message: &str,
        history: &[ConversationTurn],
    ) -> Result<ChatOutcome, LlmError> {
        let context = render_history(history);
        let prompt = CHAT_PROMPT_TEMPLATE
            .replace("{context}", &context)
            .replace("{message}", message);
        let reply = self.backend.complete(&prompt, CHAT_SYSTEM).await?;
        Ok(ChatOutcome {
            reply,
            filter_actions: None,
        })
    }
}

/// Renders history as `role: content` lines for the chat prompt.
fn render_history(history: &[ConversationTurn]) -> String {
    if history.is_empty() {
        return "No previous conversation".to_string();
    }
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::filters::WorkMode;
    use crate::assistant::session::MAX_TURNS;
    use crate::llm_client::testing::{FailingBackend, ScriptedBackend};

    fn assistant(backend: impl CompletionBackend + 'static) -> Assistant {
        Assistant::new(Arc::new(backend))
    }

    #[test]
    fn test_decide_routes_each_intent() {
        assert_eq!(decide(Intent::FilterControl), State::FilterAction);
        assert_eq!(decide(Intent::ProductHelp), State::HelpAction);
        assert_eq!(decide(Intent::ApplicationQuery), State::HelpAction);
        assert_eq!(decide(Intent::JobSearch), State::ChatAction);
        assert_eq!(decide(Intent::GeneralChat), State::ChatAction);
    }

    #[test]
    fn test_render_history_empty_placeholder() {
        assert_eq!(render_history(&[]), "No previous conversation");
    }

    #[test]
    fn test_render_history_role_prefixed_lines() {
        let history = vec![
            ConversationTurn::user("any remote roles?"),
            ConversationTurn::assistant("Plenty."),
        ];
        assert_eq!(
            render_history(&history),
            "user: any remote roles?\nassistant: Plenty."
        );
    }

    #[tokio::test]
    async fn test_filter_control_query_returns_filters_and_ack() {
        let assistant = assistant(ScriptedBackend::new([
            "FILTER_CONTROL",
            r#"{"workMode": "remote", "clear": false}"#,
        ]));

        let outcome = assistant.process_query("u1", "show me remote jobs").await;

        assert!(outcome.reply.contains("remote"), "reply: {}", outcome.reply);
        let filters = outcome.filter_actions.expect("filter actions expected");
        assert_eq!(filters.work_mode, Some(WorkMode::Remote));
    }

    #[tokio::test]
    async fn test_general_chat_query_uses_chat_generator() {
        let assistant = assistant(ScriptedBackend::new(["GENERAL_CHAT", "Hi there!"]));
        let outcome = assistant.process_query("u1", "hello").await;
        assert_eq!(outcome.reply, "Hi there!");
        assert!(outcome.filter_actions.is_none());
    }

    #[tokio::test]
    async fn test_product_help_and_application_query_use_help_generator() {
        for label in ["PRODUCT_HELP", "APPLICATION_QUERY"] {
            let assistant =
                assistant(ScriptedBackend::new([label, "Open the filters panel."]));
            let outcome = assistant.process_query("u1", "how do filters work?").await;
            assert_eq!(outcome.reply, "Open the filters panel.");
            assert!(outcome.filter_actions.is_none());
        }
    }

    #[tokio::test]
    async fn test_success_appends_both_turns() {
        let assistant = assistant(ScriptedBackend::new(["GENERAL_CHAT", "Hi!"]));
        assistant.process_query("u1", "hello").await;

        let history = assistant.history("u1").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], ConversationTurn::user("hello"));
        assert_eq!(history[1], ConversationTurn::assistant("Hi!"));
    }

    #[tokio::test]
    async fn test_generator_failure_yields_fallback_and_untouched_history() {
        // Seed one good exchange, then let the chat generator fail.
        let assistant = assistant(ScriptedBackend::new([
            "GENERAL_CHAT",
            "First reply.",
            "GENERAL_CHAT",
            // script exhausted: the second chat generation errors
        ]));

        assistant.process_query("u1", "first").await;
        let before = assistant.history("u1").await;

        let outcome = assistant.process_query("u1", "second").await;
        assert_eq!(outcome.reply, FALLBACK_REPLY);
        assert!(outcome.filter_actions.is_none());
        assert_eq!(assistant.history("u1").await, before);
    }

    #[tokio::test]
    async fn test_total_model_unavailability_still_replies() {
        let assistant = assistant(FailingBackend);
        let outcome = assistant.process_query("u1", "anything").await;
        // Classification degrades to chat, chat fails, entry point absorbs.
        assert_eq!(outcome.reply, FALLBACK_REPLY);
        assert!(outcome.filter_actions.is_none());
        assert!(assistant.history("u1").await.is_empty());
    }

    #[tokio::test]
    async fn test_history_caps_at_ten_turns_after_six_exchanges() {
        let mut script = Vec::new();
        for n in 1..=6 {
            script.push("GENERAL_CHAT".to_string());
            script.push(format!("reply {n}"));
        }
        let assistant = assistant(ScriptedBackend::new(script));

        for n in 1..=6 {
            assistant.process_query("u1", &format!("message {n}")).await;
        }

        let history = assistant.history("u1").await;
        assert_eq!(history.len(), MAX_TURNS);
        assert_eq!(history[0], ConversationTurn::user("message 2"));
        assert_eq!(history[9], ConversationTurn::assistant("reply 6"));
    }

    #[tokio::test]
    async fn test_chat_prompt_carries_history_context() {
        let backend = Arc::new(ScriptedBackend::new([
            "GENERAL_CHAT",
            "First reply.",
            "GENERAL_CHAT",
            "Second reply.",
        ]));
        let assistant = Assistant::new(backend.clone());

        assistant.process_query("u1", "first").await;
        assistant.process_query("u1", "second").await;

        let prompts = backend.prompts.lock().unwrap();
        // Call order: classify, chat, classify, chat.
        let second_chat_prompt = &prompts[3];
        assert!(second_chat_prompt.contains("user: first"));
        assert!(second_chat_prompt.contains("assistant: First reply."));
    }

    #[tokio::test]
    async fn test_concurrent_queries_for_same_user_serialize() {
        use std::sync::Mutex as StdMutex;
        use tokio::sync::Notify;

        // First chat generation parks on the gate while holding the user's
        // buffer lock; the second query must wait for it, then see the first
        // exchange in its own context.
        struct GatedBackend {
            gate: Arc<Notify>,
            calls: StdMutex<u32>,
            prompts: StdMutex<Vec<String>>,
        }

        #[async_trait::async_trait]
        impl CompletionBackend for GatedBackend {
            async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
                let call = {
                    let mut calls = self.calls.lock().unwrap();
                    *calls += 1;
                    *calls
                };
                self.prompts.lock().unwrap().push(prompt.to_string());
                match call {
                    1 | 3 => Ok("GENERAL_CHAT".to_string()),
                    2 => {
                        self.gate.notified().await;
                        Ok("slow reply".to_string())
                    }
                    _ => Ok("fast reply".to_string()),
                }
            }
        }

        let gate = Arc::new(Notify::new());
        let backend = Arc::new(GatedBackend {
            gate: gate.clone(),
            calls: StdMutex::new(0),
            prompts: StdMutex::new(Vec::new()),
        });
        let assistant = Arc::new(Assistant::new(backend.clone()));

        let slow = tokio::spawn({
            let assistant = assistant.clone();
            async move { assistant.process_query("u1", "slow message").await }
        });
        // Let the first query reach the parked generation before starting
        // the second.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let fast = tokio::spawn({
            let assistant = assistant.clone();
            async move { assistant.process_query("u1", "fast message").await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        // The second query is blocked behind the first; neither has finished.
        assert!(!slow.is_finished());
        assert!(!fast.is_finished());

        gate.notify_one();
        assert_eq!(slow.await.unwrap().reply, "slow reply");
        assert_eq!(fast.await.unwrap().reply, "fast reply");

        // Both exchanges landed, in order, with nothing lost.
        let history = assistant.history("u1").await;
        assert_eq!(
            history,
            vec![
                ConversationTurn::user("slow message"),
                ConversationTurn::assistant("slow reply"),
                ConversationTurn::user("fast message"),
                ConversationTurn::assistant("fast reply"),
            ]
        );

        // The second chat generation read the committed first exchange,
        // not a stale snapshot.
        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[3].contains("user: slow message"));
        assert!(prompts[3].contains("assistant: slow reply"));
    }

    #[tokio::test]
    async fn test_clear_history_resets_chat_context() {
        let backend = Arc::new(ScriptedBackend::new([
            "GENERAL_CHAT",
            "First reply.",
            "GENERAL_CHAT",
            "Fresh start.",
        ]));
        let assistant = Assistant::new(backend.clone());

        assistant.process_query("u1", "first").await;
        assistant.clear_history("u1").await;
        assert!(assistant.history("u1").await.is_empty());

        assistant.process_query("u1", "second").await;
        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[3].contains("No previous conversation"));
    }

    #[tokio::test]
    async fn test_help_prompt_excludes_history() {
        let backend = Arc::new(ScriptedBackend::new([
            "GENERAL_CHAT",
            "Earlier reply.",
            "PRODUCT_HELP",
            "Use the upload button.",
        ]));
        let assistant = Assistant::new(backend.clone());

        assistant.process_query("u1", "earlier message").await;
        assistant.process_query("u1", "how do I upload a resume?").await;

        let prompts = backend.prompts.lock().unwrap();
        assert!(!prompts[3].contains("Earlier reply."));
    }
}
