// All LLM prompt constants for the assistant module.
// Reuses cross-cutting fragments from llm_client::prompts.

pub use crate::llm_client::prompts::JSON_ONLY_SYSTEM as FILTER_SYSTEM;

/// System prompt for intent classification — one label, nothing else.
pub const INTENT_SYSTEM: &str = "You are an intent classifier for a job tracker product. \
    Respond with exactly one intent label from the provided list. \
    Do NOT add punctuation, quotes, or any other text.";

/// Intent classification prompt. Replace `{message}` before sending.
pub const INTENT_PROMPT_TEMPLATE: &str = r#"Classify the user's intent. Choose ONE:

- FILTER_CONTROL: change, apply, or clear job list filters
- APPLICATION_QUERY: questions about the user's tracked applications
- PRODUCT_HELP: how to use the job tracker product
- JOB_SEARCH: looking for jobs or job recommendations
- GENERAL_CHAT: anything else

User message:
{message}

Respond with ONLY the intent."#;

/// Filter extraction prompt. Replace `{message}` before sending.
/// Pairs with `FILTER_SYSTEM` (JSON-only).
pub const FILTER_PROMPT_TEMPLATE: &str = r#"Extract filters from the message. Return JSON only.

Return a JSON object with this EXACT schema (no extra fields):
{
  "workMode": "remote" | "hybrid" | "onsite" | null,
  "jobType": "full_time" | "part_time" | "contract" | "internship" | null,
  "location": "<string>" | null,
  "matchScore": "high" | "medium" | "all" | null,
  "clear": <boolean>
}

Set "clear" to true only if the user asks to remove or reset all filters.
Use null for anything the message does not mention.

Message:
{message}"#;

/// System prompt for product-help answers.
pub const HELP_SYSTEM: &str = "You are a Job Tracker assistant. \
    Answer questions about the product and the user's applications \
    briefly and clearly.";

/// Help prompt. Replace `{message}` before sending.
pub const HELP_PROMPT_TEMPLATE: &str = r#"User question:
{message}"#;

/// System prompt for open-domain chat.
pub const CHAT_SYSTEM: &str = "You are a friendly job assistant. \
    Keep replies short and helpful.";

/// Chat prompt. Replace `{context}` and `{message}` before sending.
pub const CHAT_PROMPT_TEMPLATE: &str = r#"Conversation:
{context}

User:
{message}"#;
