//! Résumé analyzer: turns extracted text into an `AnalyzedRecord`.
//!
//! Default: `LlmResumeAnalyzer` (Claude via `LlmClient`).
//! Controllers hold an `Arc<dyn ResumeAnalyzer>`, so tests swap in fakes.

use async_trait::async_trait;
use tracing::info;

use crate::analysis::prompts::{RESUME_ANALYSIS_PROMPT, RESUME_ANALYSIS_SYSTEM};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::resume::AnalyzedRecord;

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, resume_text: &str) -> Result<AnalyzedRecord, LlmError>;
}

#[derive(Clone)]
pub struct LlmResumeAnalyzer {
    llm: LlmClient,
}

impl LlmResumeAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeAnalyzer for LlmResumeAnalyzer {
    async fn analyze(&self, resume_text: &str) -> Result<AnalyzedRecord, LlmError> {
        let prompt = build_prompt(resume_text);
        let system = format!("{RESUME_ANALYSIS_SYSTEM} {JSON_ONLY_SYSTEM}");
        info!("Requesting resume analysis ({} chars)", resume_text.len());
        self.llm
            .call_json::<AnalyzedRecord>(&prompt, &system)
            .await
    }
}

fn build_prompt(resume_text: &str) -> String {
    RESUME_ANALYSIS_PROMPT.replace("{resume_text}", resume_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::Skills;
    use axum::{routing::post, Json, Router};
    use serde_json::json;

    #[test]
    fn test_prompt_embeds_text_and_schema() {
        let prompt = build_prompt("Jane Doe\nRust engineer");
        assert!(prompt.contains("Jane Doe\nRust engineer"));
        assert!(prompt.contains("customSections"));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let analyzer = LlmResumeAnalyzer::new(LlmClient::new(None));
        let err = analyzer.analyze("some text").await.unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured));
    }

    #[tokio::test]
    async fn test_analyze_decodes_record_from_noisy_reply() {
        let reply = "Here is the result: {\"name\":\"A\",\"skills\":[\"Rust\"]} Thanks!";
        let app = Router::new().route(
            "/v1/messages",
            post(move || async move {
                Json(json!({
                    "content": [{"type": "text", "text": reply}],
                    "usage": {"input_tokens": 3, "output_tokens": 3}
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let llm = LlmClient::new(Some("key".to_string()))
            .with_endpoint(format!("http://{addr}/v1/messages"));
        let record = LlmResumeAnalyzer::new(llm).analyze("text").await.unwrap();
        assert_eq!(record.name.as_deref(), Some("A"));
        assert_eq!(record.skills, Some(Skills::Flat(vec!["Rust".to_string()])));
    }
}
