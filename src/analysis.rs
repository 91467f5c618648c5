use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// What gets sent to the backend for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub text: String,
    pub tts_enabled: bool,
}

/// Structured result returned by the backend for a submitted text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub nouns: Vec<String>,
    pub keywords: Vec<String>,
    pub named_entities: Vec<(String, String)>,
    pub sentiment_score: f64,
    pub sentiment_label: String,
    pub image_path: Option<String>,
    pub audio_path: Option<String>,
}

/// The analysis call did not produce a result. The reason is opaque and
/// shown to the user verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisFailure {
    pub reason: String,
}

impl AnalysisFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

pub type AnalysisOutcome = std::result::Result<AnalysisResult, AnalysisFailure>;

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a text for analysis. Any non-success outcome (transport,
    /// status, backend-reported error) is folded into an `AnalysisFailure`.
    pub async fn submit(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        self.submit_inner(request)
            .await
            .map_err(|e| AnalysisFailure::new(e.to_string()))
    }

    async fn submit_inner(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let url = format!("{}/process_text", self.base_url);

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "analysis request failed with status: {}",
                response.status()
            ));
        }

        // The backend reports application-level failures as an `error`
        // field in an otherwise 200 response.
        let body = response.bytes().await?;
        if let Ok(ErrorBody { error: Some(msg) }) = serde_json::from_slice::<ErrorBody>(&body) {
            return Err(anyhow!(msg));
        }

        let result: AnalysisResult = serde_json::from_slice(&body)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_deserializes_backend_payload() {
        let payload = r#"{
            "nouns": ["fire", "water"],
            "keywords": ["flight"],
            "named_entities": [["Paris", "LOC"]],
            "sentiment_score": 0.42,
            "sentiment_label": "positive",
            "image_path": "img1",
            "audio_path": null
        }"#;

        let result: AnalysisResult = serde_json::from_str(payload).unwrap();
        assert_eq!(result.nouns, vec!["fire", "water"]);
        assert_eq!(
            result.named_entities,
            vec![("Paris".to_string(), "LOC".to_string())]
        );
        assert_eq!(result.image_path.as_deref(), Some("img1"));
        assert!(result.audio_path.is_none());
    }

    #[test]
    fn test_error_body_detected() {
        let body = br#"{"error": "model not loaded"}"#;
        let parsed: ErrorBody = serde_json::from_slice(body).unwrap();
        assert_eq!(parsed.error.as_deref(), Some("model not loaded"));
    }

    #[test]
    fn test_request_serializes_wire_fields() {
        let request = AnalysisRequest {
            text: "a short text".to_string(),
            tts_enabled: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["text"], "a short text");
        assert_eq!(json["tts_enabled"], true);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = AnalysisClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }
}
