// Résumé analysis: PDF text extraction, LLM interpretation, and the
// per-session controller that sequences them.
// All LLM calls go through llm_client; nothing here talks to Anthropic directly.

pub mod analyzer;
pub mod controller;
pub mod extractor;
pub mod handlers;
pub mod prompts;
pub mod session;
