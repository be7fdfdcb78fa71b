//! Reasoning collaborator: turns a prompt into a judgment.
//!
//! Whatever comes back is untrusted text. [`parse_verdict`] accepts exactly one
//! JSON object and nothing else, no markdown fences and no surrounding prose.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::data_models::{Stance, Verdict};
use crate::error::{FactCheckError, Result};

pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

#[async_trait]
pub trait ReasoningModel: Send + Sync {
    /// Sends `prompt` and returns the raw text of the reply.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub struct GeminiModel {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GeminiModel {
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Result<GeminiModel> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FactCheckError::ReasoningCallFailed(format!("failed to build HTTP client: {e}")))?;
        Ok(GeminiModel {
            client,
            endpoint: GEMINI_ENDPOINT.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl ReasoningModel for GeminiModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "calling gemini");
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FactCheckError::ReasoningCallFailed(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FactCheckError::ReasoningCallFailed(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FactCheckError::ReasoningCallFailed(format!("response read failed: {}", e.without_url())))?;

        extract_candidate_text(&body)
    }
}

/// Concatenated text parts of the first candidate of a `generateContent` reply.
pub fn extract_candidate_text(body: &str) -> Result<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| FactCheckError::ReasoningCallFailed(format!("unexpected response: {e}")))?;

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .ok_or_else(|| FactCheckError::ReasoningCallFailed("response has no candidates".to_string()))?;

    Ok(text)
}

#[derive(Deserialize)]
struct RawJudgment {
    stance: String,
    confidence: f64,
    explanation: String,
    top_sources: Vec<String>,
}

/// Strictly parses the model's reply into a [`Verdict`].
///
/// All four keys are required. `confidence` is rounded and clamped to 0..=100,
/// and a stance outside the four known values becomes `insufficient`.
pub fn parse_verdict(raw: &str) -> Result<Verdict> {
    let judgment: RawJudgment =
        serde_json::from_str(raw).map_err(|e| FactCheckError::MalformedJudgment(e.to_string()))?;

    Ok(Verdict {
        stance: Stance::from_label(&judgment.stance),
        confidence: judgment.confidence.round().clamp(0.0, 100.0) as u8,
        explanation: judgment.explanation,
        top_sources: judgment.top_sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_verdict() {
        let raw = r#"{"stance": "refutes", "confidence": 82, "explanation": "Sources contradict it.", "top_sources": ["https://reuters.com/a", "https://bbc.com/b"]}"#;
        let v = parse_verdict(raw).unwrap();
        assert_eq!(v.stance, Stance::Refutes);
        assert_eq!(v.confidence, 82);
        assert_eq!(v.explanation, "Sources contradict it.");
        assert_eq!(v.top_sources.len(), 2);
    }

    #[test]
    fn test_parse_tolerates_surrounding_whitespace() {
        let raw = "\n  {\"stance\":\"supports\",\"confidence\":70,\"explanation\":\"ok\",\"top_sources\":[]}\n";
        assert_eq!(parse_verdict(raw).unwrap().stance, Stance::Supports);
    }

    #[test]
    fn test_parse_unknown_stance_is_insufficient() {
        let raw = r#"{"stance": "likely true", "confidence": 60, "explanation": "", "top_sources": []}"#;
        assert_eq!(parse_verdict(raw).unwrap().stance, Stance::Insufficient);
    }

    #[test]
    fn test_parse_confidence_clamped_and_rounded() {
        let high = r#"{"stance": "supports", "confidence": 140, "explanation": "", "top_sources": []}"#;
        assert_eq!(parse_verdict(high).unwrap().confidence, 100);
        let low = r#"{"stance": "supports", "confidence": -3, "explanation": "", "top_sources": []}"#;
        assert_eq!(parse_verdict(low).unwrap().confidence, 0);
        let frac = r#"{"stance": "supports", "confidence": 72.6, "explanation": "", "top_sources": []}"#;
        assert_eq!(parse_verdict(frac).unwrap().confidence, 73);
    }

    #[test]
    fn test_parse_not_json() {
        let err = parse_verdict("not json").unwrap_err();
        assert!(matches!(err, FactCheckError::MalformedJudgment(_)));
    }

    #[test]
    fn test_parse_rejects_markdown_fence() {
        let raw = "```json\n{\"stance\":\"supports\",\"confidence\":70,\"explanation\":\"ok\",\"top_sources\":[]}\n```";
        assert!(parse_verdict(raw).is_err());
    }

    #[test]
    fn test_parse_rejects_trailing_prose() {
        let raw = r#"{"stance":"supports","confidence":70,"explanation":"ok","top_sources":[]} Hope this helps!"#;
        assert!(parse_verdict(raw).is_err());
    }

    #[test]
    fn test_parse_missing_key() {
        let raw = r#"{"stance": "supports", "confidence": 70, "explanation": "ok"}"#;
        let err = parse_verdict(raw).unwrap_err();
        assert!(err.to_string().contains("top_sources"));
    }

    #[test]
    fn test_parse_wrong_type() {
        let raw = r#"{"stance": "supports", "confidence": "high", "explanation": "ok", "top_sources": []}"#;
        assert!(parse_verdict(raw).is_err());
    }

    #[test]
    fn test_extract_candidate_text() {
        let body = r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]}"#;
        assert_eq!(extract_candidate_text(body).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_extract_no_candidates() {
        let err = extract_candidate_text(r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err, FactCheckError::ReasoningCallFailed(_)));
    }

    #[test]
    fn test_url() {
        let model = GeminiModel::new("k", "gemini-2.5-flash-lite", Duration::from_secs(5))
            .unwrap()
            .with_endpoint("http://localhost:9999/v1beta/");
        assert_eq!(
            model.url(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash-lite:generateContent"
        );
    }
}
