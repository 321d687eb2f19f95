//! Intent Classifier — single-shot classification of a user message into one
//! of five fixed labels. Any call failure or unrecognized label degrades to
//! `GeneralChat`; classification never blocks a reply.

use tracing::warn;

use crate::assistant::prompts::{INTENT_PROMPT_TEMPLATE, INTENT_SYSTEM};
use crate::llm_client::CompletionBackend;

/// What the user wants the assistant to do. Computed fresh per query;
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    FilterControl,
    ApplicationQuery,
    ProductHelp,
    JobSearch,
    GeneralChat,
}

impl Intent {
    /// Parses the exact label set the classification prompt offers.
    /// Anything else is `None` — the caller decides how to degrade.
    pub fn parse(label: &str) -> Option<Intent> {
        match label.trim() {
            "FILTER_CONTROL" => Some(Intent::FilterControl),
            "APPLICATION_QUERY" => Some(Intent::ApplicationQuery),
            "PRODUCT_HELP" => Some(Intent::ProductHelp),
            "JOB_SEARCH" => Some(Intent::JobSearch),
            "GENERAL_CHAT" => Some(Intent::GeneralChat),
            _ => None,
        }
    }
}

/// Classifies a message with one completion call. No retries.
///
/// A failed call and an off-list label are treated identically: both fall
/// back to `GeneralChat`. Graceful degradation is intentional here — a
/// mis-routed message still gets a conversational reply.
pub async fn classify(backend: &dyn CompletionBackend, message: &str) -> Intent {
    let prompt = INTENT_PROMPT_TEMPLATE.replace("{message}", message);

    match backend.complete(&prompt, INTENT_SYSTEM).await {
        Ok(label) => Intent::parse(&label).unwrap_or_else(|| {
            warn!("Unrecognized intent label {label:?}, defaulting to GENERAL_CHAT");
            Intent::GeneralChat
        }),
        Err(e) => {
            warn!("Intent classification failed ({e}), defaulting to GENERAL_CHAT");
            Intent::GeneralChat
        }
    }
}
