//! # External Content Generation
//!
//! A [`ContentGenerator`] turns the captured intent plus the required-section
//! list into a section-keyed JSON report. The orchestrator tolerates reports
//! missing any subset of sections; enforcement fills the gaps.
//!
//! [`OpenAiGenerator`] calls the OpenAI Responses API with JSON-object output.
//! [`DisabledGenerator`] stands in when ingestion is turned off and always
//! returns an empty report.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use diiac_core::TierRequirement;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::config::GovernanceConfig;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors from the external generation call.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("content generator request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("content generator timed out after {0:?}")]
    Timeout(Duration),

    #[error("content generator returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("content generator returned no output text")]
    EmptyOutput,

    #[error("content generator output is not a JSON object: {0}")]
    Unparseable(String),

    #[error("content generator misconfigured: {0}")]
    Config(String),
}

/// Input for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    /// The captured intent document.
    pub context: &'a Value,
    pub requirement: &'a TierRequirement,
}

/// Produces a report for a governed execution.
pub trait ContentGenerator: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn generate<'a>(
        &'a self,
        request: GenerationRequest<'a>,
    ) -> BoxFuture<'a, Result<Value, GenerationError>>;
}

/// Generator used when external ingestion is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGenerator;

impl ContentGenerator for DisabledGenerator {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn generate<'a>(
        &'a self,
        _request: GenerationRequest<'a>,
    ) -> BoxFuture<'a, Result<Value, GenerationError>> {
        Box::pin(async { Ok(Value::Object(Map::new())) })
    }
}

/// Instructions sent ahead of the intent document.
pub fn system_prompt(requirement: &TierRequirement) -> String {
    format!(
        "You are an enterprise strategy assistant operating under governance constraints.\n\
         Respond with a single JSON object and nothing else.\n\
         The object MUST contain these top-level sections: {}.\n\
         Every section must itself be a JSON object.\n\
         Additional sections are allowed where they add depth.\n\
         Write board-ready content. No markdown and no commentary outside the JSON.",
        requirement.sections().join(", ")
    )
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: [InputMessage<'a>; 2],
    text: Value,
}

#[derive(Serialize)]
struct InputMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Client for the OpenAI Responses API.
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl OpenAiGenerator {
    /// Build a client from configuration. Requires an API key.
    pub fn new(config: &GovernanceConfig) -> Result<Self, GenerationError> {
        let key = config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| GenerationError::Config("OPENAI_API_KEY is not set".into()))?;
        let http = reqwest::Client::builder()
            .timeout(config.generation_timeout())
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                let mut auth =
                    reqwest::header::HeaderValue::from_str(&format!("Bearer {}", key.as_str()))
                        .map_err(|_| {
                            GenerationError::Config("API key is not a valid header value".into())
                        })?;
                auth.set_sensitive(true);
                headers.insert(reqwest::header::AUTHORIZATION, auth);
                headers
            })
            .build()
            .map_err(GenerationError::Http)?;
        Ok(Self {
            http,
            endpoint: format!("{}/responses", config.openai_base_url),
            model: config.openai_model.clone(),
            timeout: config.generation_timeout(),
        })
    }

    async fn call(&self, request: GenerationRequest<'_>) -> Result<Value, GenerationError> {
        let prompt = system_prompt(request.requirement);
        let user = request.context.to_string();
        let body = ResponsesRequest {
            model: &self.model,
            input: [
                InputMessage {
                    role: "system",
                    content: &prompt,
                },
                InputMessage {
                    role: "user",
                    content: &user,
                },
            ],
            text: json!({ "format": { "type": "json_object" } }),
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let payload: Value = resp.json().await.map_err(|e| self.send_error(e))?;
        let text = output_text(&payload).ok_or(GenerationError::EmptyOutput)?;
        parse_report(&text)
    }

    fn send_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout(self.timeout)
        } else {
            GenerationError::Http(e)
        }
    }
}

impl ContentGenerator for OpenAiGenerator {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn generate<'a>(
        &'a self,
        request: GenerationRequest<'a>,
    ) -> BoxFuture<'a, Result<Value, GenerationError>> {
        Box::pin(self.call(request))
    }
}

/// Concatenated output text of a Responses API payload.
///
/// Uses the top-level `output_text` convenience field when present, else
/// joins every `output_text` content part of every output message.
fn output_text(payload: &Value) -> Option<String> {
    if let Some(text) = payload.get("output_text").and_then(Value::as_str) {
        return (!text.is_empty()).then(|| text.to_string());
    }
    let text: String = payload
        .get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    (!text.is_empty()).then_some(text)
}

fn parse_report(text: &str) -> Result<Value, GenerationError> {
    match serde_json::from_str::<Value>(text) {
        Ok(v @ Value::Object(_)) => Ok(v),
        Ok(other) => Err(GenerationError::Unparseable(format!(
            "expected an object, got {}",
            json_type(&other)
        ))),
        Err(e) => Err(GenerationError::Unparseable(e.to_string())),
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diiac_core::{PolicyLevel, ReasoningLevel, TierPolicy};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zeroize::Zeroizing;

    fn config_for(server: &MockServer) -> GovernanceConfig {
        let mut cfg = GovernanceConfig::with_workspace("/unused");
        cfg.llm_enabled = true;
        cfg.openai_api_key = Some(Zeroizing::new("test-key".to_string()));
        cfg.openai_base_url = server.uri();
        cfg.generation_timeout_secs = 5;
        cfg
    }

    fn r2p1() -> TierRequirement {
        TierPolicy::required_sections(ReasoningLevel::R2, PolicyLevel::P1)
    }

    #[test]
    fn prompt_lists_required_sections() {
        let prompt = system_prompt(&TierPolicy::required_sections(
            ReasoningLevel::R3,
            PolicyLevel::P3,
        ));
        assert!(prompt.contains(
            "executive_summary, strategic_context, market_analysis, regulatory_position"
        ));
    }

    #[test]
    fn output_text_from_message_parts() {
        let payload = json!({
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "content": [
                    {"type": "output_text", "text": "{\"executive_"},
                    {"type": "output_text", "text": "summary\": {}}"}
                ]}
            ]
        });
        assert_eq!(
            output_text(&payload).as_deref(),
            Some("{\"executive_summary\": {}}")
        );
        assert!(output_text(&json!({"output": []})).is_none());
    }

    #[tokio::test]
    async fn disabled_generator_returns_empty_object() {
        let req = r2p1();
        let ctx = json!({"intent": "x"});
        let out = DisabledGenerator
            .generate(GenerationRequest {
                context: &ctx,
                requirement: &req,
            })
            .await
            .unwrap();
        assert_eq!(out, json!({}));
    }

    #[tokio::test]
    async fn openai_posts_prompt_and_parses_report() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "text": {"format": {"type": "json_object"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output_text": "{\"executive_summary\": {\"headline\": \"Enter Singapore first\"}}"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generator = OpenAiGenerator::new(&config_for(&server)).unwrap();
        let req = r2p1();
        let ctx = json!({"intent": "Expand into APAC market"});
        let report = generator
            .generate(GenerationRequest {
                context: &ctx,
                requirement: &req,
            })
            .await
            .unwrap();
        assert_eq!(
            report["executive_summary"]["headline"],
            "Enter Singapore first"
        );
    }

    #[tokio::test]
    async fn openai_error_status_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let generator = OpenAiGenerator::new(&config_for(&server)).unwrap();
        let req = r2p1();
        let ctx = json!({});
        let err = generator
            .generate(GenerationRequest {
                context: &ctx,
                requirement: &req,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn non_object_output_is_unparseable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"output_text": "[1, 2]"})),
            )
            .mount(&server)
            .await;

        let generator = OpenAiGenerator::new(&config_for(&server)).unwrap();
        let req = r2p1();
        let ctx = json!({});
        let err = generator
            .generate(GenerationRequest {
                context: &ctx,
                requirement: &req,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Unparseable(_)));
    }

    #[test]
    fn missing_key_is_config_error() {
        let cfg = GovernanceConfig::with_workspace("/unused");
        assert!(matches!(
            OpenAiGenerator::new(&cfg),
            Err(GenerationError::Config(_))
        ));
    }
}
