// src/services/ai.rs

//! AI fallback parsing.
//!
//! Consulted only after the heuristics come up empty. The service is an
//! external HTTP endpoint taking a JSON task and answering with whichever of
//! `url`, `coaches` or `bio` the task asked for.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{AiConfig, BioDetails, CoachRecord};

/// Fallback parser for pages the heuristics could not read.
#[async_trait]
pub trait AiFallback: Send + Sync {
    /// URL the page links to for `instruction`, possibly relative.
    async fn find_url(&self, html: &str, instruction: &str) -> Result<Option<String>>;

    /// Coach records listed on a coaches or roster page.
    async fn extract_coaches(&self, html: &str, school_name: &str) -> Result<Vec<CoachRecord>>;

    /// Profile details from a coach's bio page.
    async fn extract_bio(&self, html: &str, coach_name: &str, school_name: &str)
    -> Result<BioDetails>;
}

#[derive(Debug, Serialize)]
struct AiRequest<'a> {
    task: &'a str,
    instruction: &'a str,
    html: &'a str,
    context: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct AiResponse {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    coaches: Option<Vec<CoachRecord>>,
    #[serde(default)]
    bio: Option<BioDetails>,
    #[serde(default)]
    error: Option<String>,
}

/// JSON-over-HTTP client for the AI parsing endpoint.
pub struct HttpAiParser {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    max_html_chars: usize,
}

impl HttpAiParser {
    /// Build a parser from `[ai]`. Returns `None` when the fallback is disabled.
    pub fn from_config(config: &AiConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        if config.endpoint.trim().is_empty() {
            return Err(AppError::config("ai.endpoint is not set"));
        }

        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            log::warn!(
                "{} is not set; calling the AI endpoint without credentials",
                config.api_key_env
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Some(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            max_html_chars: config.max_html_chars,
        }))
    }

    async fn call(
        &self,
        task: &str,
        instruction: &str,
        html: &str,
        context: serde_json::Value,
    ) -> Result<AiResponse> {
        let request = AiRequest {
            task,
            instruction,
            html: truncate_chars(html, self.max_html_chars),
            context,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        log::info!("Calling AI fallback for task '{}'", task);
        let response: AiResponse = builder
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AppError::ai(format!("{task}: {e}")))?
            .json()
            .await?;

        match response.error {
            Some(error) => Err(AppError::ai(format!("{task}: {error}"))),
            None => Ok(response),
        }
    }
}

#[async_trait]
impl AiFallback for HttpAiParser {
    async fn find_url(&self, html: &str, instruction: &str) -> Result<Option<String>> {
        let response = self
            .call("find_url", instruction, html, serde_json::json!({}))
            .await?;
        Ok(response.url.filter(|u| !u.trim().is_empty()))
    }

    async fn extract_coaches(&self, html: &str, school_name: &str) -> Result<Vec<CoachRecord>> {
        let instruction = "Extract every coach or staff member listed on this page with name, \
                           position, profile link, email and phone.";
        let response = self
            .call(
                "extract_coaches",
                instruction,
                html,
                serde_json::json!({ "school_name": school_name }),
            )
            .await?;
        Ok(response.coaches.unwrap_or_default())
    }

    async fn extract_bio(
        &self,
        html: &str,
        coach_name: &str,
        school_name: &str,
    ) -> Result<BioDetails> {
        let instruction = "Extract the biography, education, coaching experience and contact \
                           details of this coach.";
        let response = self
            .call(
                "extract_bio",
                instruction,
                html,
                serde_json::json!({ "coach_name": coach_name, "school_name": school_name }),
            )
            .await?;
        Ok(response.bio.unwrap_or_default())
    }
}

/// At most `max` characters of `text`, cut on a character boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_config_builds_nothing() {
        let parser = HttpAiParser::from_config(&AiConfig::default()).unwrap();
        assert!(parser.is_none());
    }

    #[test]
    fn test_enabled_without_endpoint_is_config_error() {
        let config = AiConfig {
            enabled: true,
            ..AiConfig::default()
        };
        assert!(matches!(
            HttpAiParser::from_config(&config),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn test_response_accepts_upstream_coach_fields() {
        let body = r#"{"coaches":[{"name":"Jo Park","title":"Head Coach","fullBioLink":"/bio/jo"}]}"#;
        let response: AiResponse = serde_json::from_str(body).unwrap();
        let coaches = response.coaches.unwrap();
        assert_eq!(coaches[0].position.as_deref(), Some("Head Coach"));
        assert_eq!(coaches[0].profile_url.as_deref(), Some("/bio/jo"));
        assert!(response.url.is_none());
    }
}
