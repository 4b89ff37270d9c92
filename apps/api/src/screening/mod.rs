// Resume screening: keyword extraction → categorization → scoring → aggregate,
// batch fan-out, and LLM-ranked recommendations.
// All LLM calls go through llm_client; no direct API calls here.

pub mod batch;
pub mod handlers;
pub mod keywords;
pub mod models;
pub mod prompts;
pub mod recommend;
pub mod scorer;
pub mod upload;
