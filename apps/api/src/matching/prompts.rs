// All LLM prompt constants for the matching module.

/// System prompt for match scoring — expert matcher, JSON-only output.
pub const MATCH_SYSTEM: &str = "You are an expert job matching AI. \
    Analyze how well a candidate's resume matches a job posting. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Match scoring prompt. Replace `{job_title}`, `{company}`,
/// `{job_description}`, and `{resume_text}` before sending.
///
/// The weighting rubric documents intent for the model; the returned score is
/// not independently re-derived from it.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"Analyze how well the candidate's resume matches this job posting.

Job Title: {job_title}
Company: {company}
Job Description: {job_description}

Candidate Resume:
{resume_text}

Provide a detailed analysis in the following JSON format:
{
  "score": <number between 0-100>,
  "matchingSkills": [<list of skills from resume that match the job>],
  "relevantExperience": [<relevant work experience or projects from resume>],
  "keywordOverlap": [<important keywords that appear in both resume and job description>],
  "explanation": "<detailed explanation of the match score>"
}

Score based on:
- Technical skills match (40%)
- Experience relevance (30%)
- Keyword overlap (20%)
- Overall profile fit (10%)

Return ONLY valid JSON, no additional text."#;
