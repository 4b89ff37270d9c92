// LLM prompt templates for the screening pipeline.
// Placeholders in `{braces}` are filled by PromptTemplate::render; the JSON
// examples inside each template are the schema the reply must follow.

use crate::llm_client::prompts::PromptTemplate;

pub const KEYWORD_EXTRACTION: PromptTemplate = PromptTemplate {
    system: "You are an expert resume screening assistant. \
        Extract the most relevant keywords or short phrases from the recruiter's prompt that \
        would help evaluate a candidate's fit for a job. Include both skills and additional \
        context (e.g., collaboration needs, working style, department info). \
        Output only clear, standalone keywords or phrases (maximum 6 words each). \
        Extract any keyword of relevance to the client, including recruiter-specific \
        preferences and context requirements even where they are sensitive. \
        You MUST respond with valid JSON only. Do NOT use markdown code fences.",
    user: r#"Recruiter prompt:
{job_description}

Return a JSON object with this EXACT schema (no extra fields):
{"keywords": ["SQL", "3+ years experience", "cross-functional collaboration"]}"#,
};

pub const KEYWORD_CATEGORIZATION: PromptTemplate = PromptTemplate {
    system: "You are a helpful assistant that classifies a flat list of resume-related \
        keywords into 4 categories: \
        1. Technical Skills \
        2. Soft Skills / Personality Traits \
        3. Extracurricular / Culture Fit \
        4. Recruiter Requirements (like diversity hiring, inter department collab etc.) \
        Only use the keywords given. Every keyword must appear in exactly one category. \
        You MUST respond with valid JSON only. Do NOT use markdown code fences.",
    user: r#"Here are the keywords: {keywords}

Return a JSON object with this EXACT schema (no extra fields):
{
  "technical": ["technical skills and tools required by the job"],
  "soft_skills": ["soft skills or personality traits"],
  "extracurricular": ["extracurricular activities or culture fit indicators"],
  "recruiter_requirements": ["recruiter-specific requirements that fit no other category"]
}"#,
};

pub const RESUME_SCORING: PromptTemplate = PromptTemplate {
    system: "You are a resume evaluation assistant. \
        You MUST respond with valid JSON only. Do NOT use markdown code fences.",
    user: r#"Your task is to:

1. Extract the candidate's full name from the resume text.
2. Evaluate the resume based on four filter categories: technical, soft skills, extracurricular, and client needs.
3. Assign an integer score out of 10 for technical, soft skills, and extracurricular, and an integer score out of 3 for client needs.
4. Provide one-line reasoning for each score.
5. If NO FILTERS are provided do a general scoring for each category except client need, and make the client need score 0.

You must also consider the level of strictness provided.

Resume Text:
{resume_text}

Filters:
Technical Keywords: {technical}
Soft Skills Keywords: {soft_skills}
Extracurricular Keywords: {extracurricular}
Client Need: {client_need}

Strictness Level: {strictness}

Return a JSON object with this EXACT schema (no extra fields):
{
  "name": "Full Name",
  "technical_score": 0,
  "technical_reason": "one line",
  "softskills_score": 0,
  "softskills_reason": "one line",
  "extracurricular_score": 0,
  "extracurricular_reason": "one line",
  "client_need_score": 0,
  "client_need_reason": "one line"
}"#,
};

pub const RECOMMENDATION: PromptTemplate = PromptTemplate {
    system: "You are an expert HR assistant. Given a list of candidate scores, identify the \
        top N candidates based on their overall fit for a job. The list is already sorted by \
        aggregate_score, highest first; treat that order as a ranking hint. \
        Prioritize candidates with higher technical_score, then softskills_score, then \
        extracurricular_score and client_need_score. \
        Provide a brief, compelling reason for each recommendation. \
        Return at most N candidates. \
        You MUST respond with valid JSON only. Do NOT use markdown code fences.",
    user: r#"Here are the candidate scores: {candidate_scores_json}
Number of recommendations to provide: {num_recommendations}

Return a JSON object with this EXACT schema (no extra fields):
{
  "recommendations": [
    {"name": "Candidate Name", "reason": "brief reason based on their scores", "aggregate_score": 7.1}
  ]
}"#,
};
