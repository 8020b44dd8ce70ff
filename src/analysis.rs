//! Client for the external career-analysis service.
//!
//! All outbound analysis calls go through [`AnalysisClient`]; handlers never
//! talk to the service directly, which keeps the seam mockable in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::AnalysisConfig;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analysis service returned status {status}")]
    Api { status: u16 },
}

/// Structured career-fit analysis for one resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub strengths: Vec<String>,
    pub suggested_careers: Vec<String>,
    pub next_steps: Vec<String>,
}

/// Analysis plus the optional follow-up URL the service recommends.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub analysis: Analysis,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    resume_url: &'a str,
}

#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, resume_url: &str) -> Result<AnalysisOutcome, AnalysisError>;
}

/// HTTP client for the Gemini analysis endpoint. One request per upload, no
/// retries: a failed analysis surfaces to the caller as a server error.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(cfg: &AnalysisConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AnalysisClient for GeminiClient {
    async fn analyze(&self, resume_url: &str) -> Result<AnalysisOutcome, AnalysisError> {
        let url = format!("{}/analyze", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&AnalyzeRequest { resume_url })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Api {
                status: status.as_u16(),
            });
        }

        let outcome: AnalysisOutcome = response.json().await?;
        debug!(
            careers = outcome.analysis.suggested_careers.len(),
            redirect = outcome.redirect_url.is_some(),
            "analysis received"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_decodes_service_payload() {
        let raw = r#"{
            "analysis": {
                "strengths": ["Problem Solving"],
                "suggestedCareers": ["Software Engineer"],
                "nextSteps": ["Learn React"]
            },
            "redirectUrl": "https://careers.example.com/roadmap/42"
        }"#;
        let outcome: AnalysisOutcome = serde_json::from_str(raw).unwrap();
        assert_eq!(outcome.analysis.suggested_careers, ["Software Engineer"]);
        assert_eq!(
            outcome.redirect_url.as_deref(),
            Some("https://careers.example.com/roadmap/42")
        );
    }

    #[test]
    fn redirect_url_is_optional() {
        let raw = r#"{
            "analysis": {"strengths": [], "suggestedCareers": [], "nextSteps": []}
        }"#;
        let outcome: AnalysisOutcome = serde_json::from_str(raw).unwrap();
        assert!(outcome.redirect_url.is_none());
    }

    #[test]
    fn analysis_serializes_camel_case() {
        let analysis = Analysis {
            strengths: vec!["Communication".into()],
            suggested_careers: vec!["Data Analyst".into()],
            next_steps: vec!["Learn SQL".into()],
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json.get("suggestedCareers").is_some());
        assert!(json.get("nextSteps").is_some());
    }
}
