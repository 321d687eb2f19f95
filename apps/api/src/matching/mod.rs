//! Match Engine — scores resume/job fit.
//!
//! Primary path is one structured LLM call per job; when that call fails or
//! returns unusable JSON, a deterministic keyword heuristic takes over, so a
//! scoring request always produces a well-formed result. Batch scoring fans
//! out under a bounded semaphore and returns jobs ranked by score.
//! All LLM calls go through llm_client — no direct Anthropic calls here.

pub mod handlers;
pub mod prompts;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, warn};

use crate::llm_client::{self, CompletionBackend};
use crate::matching::prompts::{MATCH_PROMPT_TEMPLATE, MATCH_SYSTEM};
use crate::models::job::Job;

/// Resume text beyond this many characters is not sent to the model.
const RESUME_CHAR_LIMIT: usize = 3000;

/// Vocabulary for the fallback heuristic, checked in this order.
const TECH_KEYWORDS: [&str; 18] = [
    "react",
    "node",
    "javascript",
    "python",
    "java",
    "typescript",
    "sql",
    "mongodb",
    "aws",
    "docker",
    "kubernetes",
    "api",
    "frontend",
    "backend",
    "fullstack",
    "devops",
    "ml",
    "ai",
];

/// Structured score and supporting detail for one resume/job pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub score: u32,
    pub matching_skills: Vec<String>,
    pub relevant_experience: Vec<String>,
    pub keyword_overlap: Vec<String>,
    pub explanation: String,
}

impl MatchResult {
    /// The defined result when there is nothing to score: no resume on file,
    /// or no job supplied.
    fn unscorable() -> Self {
        Self {
            score: 0,
            matching_skills: vec![],
            relevant_experience: vec![],
            keyword_overlap: vec![],
            explanation: "Unable to calculate match score".to_string(),
        }
    }
}

/// Coarse tier derived from a match score, used by the UI for badges and the
/// match-score filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLevel {
    High,
    Medium,
    Low,
}

pub fn match_level(score: u32) -> MatchLevel {
    if score > 70 {
        MatchLevel::High
    } else if score >= 40 {
        MatchLevel::Medium
    } else {
        MatchLevel::Low
    }
}

/// A job annotated with its match score and detail. Ephemeral output of
/// batch scoring.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredJob {
    #[serde(flatten)]
    pub job: Job,
    #[serde(rename = "matchScore")]
    pub match_score: u32,
    #[serde(rename = "matchLevel")]
    pub match_level: MatchLevel,
    #[serde(rename = "matchDetails")]
    pub match_details: MatchResult,
}

/// Raw model output before clamping and defaulting. The score is read as a
/// float so out-of-range values (150, -10) still parse and get clamped
/// instead of tripping the fallback.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatchResult {
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    matching_skills: Option<Vec<String>>,
    #[serde(default)]
    relevant_experience: Option<Vec<String>>,
    #[serde(default)]
    keyword_overlap: Option<Vec<String>>,
    #[serde(default)]
    explanation: Option<String>,
}

impl From<RawMatchResult> for MatchResult {
    fn from(raw: RawMatchResult) -> Self {
        let score = raw.score.unwrap_or(0.0).clamp(0.0, 100.0).round() as u32;
        Self {
            score,
            matching_skills: raw.matching_skills.unwrap_or_default(),
            relevant_experience: raw.relevant_experience.unwrap_or_default(),
            keyword_overlap: raw.keyword_overlap.unwrap_or_default(),
            explanation: raw
                .explanation
                .unwrap_or_else(|| "No explanation available".to_string()),
        }
    }
}

/// Scores resume/job fit. Cheap to clone; constructed once at startup and
/// shared via `AppState`.
#[derive(Clone)]
pub struct MatchEngine {
    backend: Arc<dyn CompletionBackend>,
    concurrency: usize,
}

impl MatchEngine {
    pub fn new(backend: Arc<dyn CompletionBackend>, concurrency: usize) -> Self {
        Self {
            backend,
            concurrency: concurrency.max(1),
        }
    }

    /// Scores one job against resume text. Never fails: a missing resume or
    /// job yields the zero-score default without any model call, and a
    /// failed or unparseable model call falls back to keyword matching.
    pub async fn score_job(&self, job: Option<&Job>, resume_text: Option<&str>) -> MatchResult {
        let (job, resume_text) = match (job, resume_text) {
            (Some(job), Some(resume)) if !resume.is_empty() => (job, resume),
            _ => return MatchResult::unscorable(),
        };

        let truncated: String = resume_text.chars().take(RESUME_CHAR_LIMIT).collect();
        let prompt = MATCH_PROMPT_TEMPLATE
            .replace("{job_title}", &job.title)
            .replace("{company}", &job.company)
            .replace("{job_description}", &job.description)
            .replace("{resume_text}", &truncated);

        let parsed = match self.backend.complete(&prompt, MATCH_SYSTEM).await {
            Ok(text) => llm_client::parse_json::<RawMatchResult>(&text),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(raw) => raw.into(),
            Err(e) => {
                warn!("AI matching failed ({e}), falling back to keyword matching");
                fallback_matching(job, resume_text)
            }
        }
    }

    /// Scores every job concurrently (bounded by the configured limit) and
    /// returns all of them sorted by score descending. Ties keep their
    /// original input order.
    pub async fn batch_score(&self, jobs: Vec<Job>, resume_text: &str) -> Vec<ScoredJob> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let resume: Arc<str> = Arc::from(resume_text);
        let mut tasks = JoinSet::new();

        for (index, job) in jobs.iter().cloned().enumerate() {
            let engine = self.clone();
            let semaphore = semaphore.clone();
            let resume = resume.clone();
            tasks.spawn(async move {
                // Closing the semaphore is the only acquire failure, and it
                // never closes while tasks are in flight.
                let _permit = semaphore.acquire().await;
                let details = engine.score_job(Some(&job), Some(&resume)).await;
                (index, details)
            });
        }

        let mut details_by_index: Vec<Option<MatchResult>> = vec![None; jobs.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, details)) => details_by_index[index] = Some(details),
                Err(e) => error!("Scoring task crashed: {e}"),
            }
        }

        // A crashed task leaves a hole at its index; fill it with the
        // zero-score result so every input job is present in the output.
        let mut scored: Vec<(usize, ScoredJob)> = jobs
            .into_iter()
            .zip(details_by_index)
            .enumerate()
            .map(|(index, (job, details))| {
                let details = details.unwrap_or_else(MatchResult::unscorable);
                (
                    index,
                    ScoredJob {
                        match_score: details.score,
                        match_level: match_level(details.score),
                        match_details: details,
                        job,
                    },
                )
            })
            .collect();

        // Score descending; original input index breaks ties.
        scored.sort_by(|(ia, a), (ib, b)| {
            b.match_score.cmp(&a.match_score).then(ia.cmp(ib))
        });
        scored.into_iter().map(|(_, job)| job).collect()
    }
}

/// Deterministic keyword heuristic used when the model path fails: the
/// vocabulary subset present in both the resume and the job description
/// (case-insensitive substring match), ten points per hit plus a base of 20,
/// capped at 100.
fn fallback_matching(job: &Job, resume_text: &str) -> MatchResult {
    let resume_lower = resume_text.to_lowercase();
    let desc_lower = job.description.to_lowercase();

    let matching: Vec<String> = TECH_KEYWORDS
        .iter()
        .filter(|kw| resume_lower.contains(*kw) && desc_lower.contains(*kw))
        .map(|kw| kw.to_string())
        .collect();

    let score = (matching.len() as u32 * 10 + 20).min(100);

    MatchResult {
        score,
        explanation: format!(
            "Found {} matching keywords between your resume and this job posting.",
            matching.len()
        ),
        matching_skills: matching.clone(),
        relevant_experience: vec!["Basic keyword analysis performed".to_string()],
        keyword_overlap: matching,
    }
}
