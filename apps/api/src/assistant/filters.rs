//! Filter Extractor — turns a free-text message into a structured UI filter
//! instruction, plus the deterministic acknowledgment reply built from it.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assistant::prompts::{FILTER_PROMPT_TEMPLATE, FILTER_SYSTEM};
use crate::llm_client::{self, CompletionBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkMode {
    Remote,
    Hybrid,
    Onsite,
}

impl WorkMode {
    fn label(&self) -> &'static str {
        match self {
            WorkMode::Remote => "remote",
            WorkMode::Hybrid => "hybrid",
            WorkMode::Onsite => "onsite",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

impl JobType {
    /// Wire value with the underscore replaced by a space, for replies.
    fn label(&self) -> &'static str {
        match self {
            JobType::FullTime => "full time",
            JobType::PartTime => "part time",
            JobType::Contract => "contract",
            JobType::Internship => "internship",
        }
    }
}

/// Match-score tier the UI can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    High,
    Medium,
    All,
}

/// Structured instruction to change active job-list filtering criteria.
///
/// Absent fields mean "unspecified, do not change". `clear = true` overrides
/// every other field and removes all active filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterAction {
    pub work_mode: Option<WorkMode>,
    pub job_type: Option<JobType>,
    pub location: Option<String>,
    pub match_score: Option<ScoreTier>,
    pub clear: bool,
}

/// Extracts a `FilterAction` with one strict-JSON completion call.
///
/// A failed call or unparseable JSON yields `FilterAction::default()` — the
/// "no filter change" instruction — never an error.
pub async fn extract_filters(backend: &dyn CompletionBackend, message: &str) -> FilterAction {
    let prompt = FILTER_PROMPT_TEMPLATE.replace("{message}", message);

    let text = match backend.complete(&prompt, FILTER_SYSTEM).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Filter extraction call failed ({e}), applying no filter change");
            return FilterAction::default();
        }
    };

    match llm_client::parse_json::<FilterAction>(&text) {
        Ok(filters) => filters,
        Err(e) => {
            warn!("Filter extraction returned unparseable JSON ({e}), applying no filter change");
            FilterAction::default()
        }
    }
}

/// Builds the acknowledgment reply for a filter change. Deterministic, no
/// model call.
pub fn filter_reply(filters: &FilterAction) -> String {
    if filters.clear {
        return "All filters have been cleared.".to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    if let Some(mode) = filters.work_mode {
        parts.push(mode.label().to_string());
    }
    if let Some(job_type) = filters.job_type {
        parts.push(job_type.label().to_string());
    }
    if let Some(location) = &filters.location {
        parts.push(format!("in {location}"));
    }
    if filters.match_score == Some(ScoreTier::High) {
        parts.push("high match score jobs".to_string());
    }

    if parts.is_empty() {
        "I couldn't detect any filter changes.".to_string()
    } else {
        format!("Updated filters: {}.", parts.join(", "))
    }
}
