//! Anthropic Messages API client.

use std::time::Instant;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use prospectbrief_shared::{BriefError, ClientSettings, Result};

use crate::{GenerationRequest, GenerationService, Tool};

/// User-Agent string for generation requests.
const USER_AGENT: &str = concat!("prospectbrief/", env!("CARGO_PKG_VERSION"));

/// Identifier of the server-side web search tool.
const WEB_SEARCH_TOOL_TYPE: &str = "web_search_20250305";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSpec>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ToolSpec {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
    max_uses: u32,
}

impl From<Tool> for ToolSpec {
    fn from(tool: Tool) -> Self {
        match tool {
            Tool::WebSearch { max_uses } => Self {
                kind: WEB_SEARCH_TOOL_TYPE,
                name: "web_search",
                max_uses,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

/// Response segments. Only text is kept; tool use and search results are skipped.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking-per-call client for `POST /v1/messages`.
#[derive(Clone)]
pub struct AnthropicClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    api_version: String,
}

impl AnthropicClient {
    /// Build a client from resolved settings.
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let endpoint = settings.base_url.join("v1/messages").map_err(|e| {
            BriefError::config(format!("invalid base_url '{}': {e}", settings.base_url))
        })?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| BriefError::Generation(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_version: settings.api_version.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GenerationService for AnthropicClient {
    #[instrument(skip_all, fields(model = %self.model, max_tokens = request.max_tokens, tools = request.tools.len()))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        request.validate()?;

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: [Message {
                role: "user",
                content: &request.content,
            }],
            tools: request.tools.iter().copied().map(ToolSpec::from).collect(),
        };

        let start = Instant::now();
        let response = self
            .http
            .post(self.endpoint.clone())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| BriefError::Generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &text));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| BriefError::Generation(format!("malformed response: {e}")))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                tokens_in = usage.input_tokens,
                tokens_out = usage.output_tokens,
                latency_ms = start.elapsed().as_millis() as u64,
                "generation complete"
            );
        }

        collect_text(parsed.content)
    }
}

/// Concatenate text segments in response order.
fn collect_text(blocks: Vec<ContentBlock>) -> Result<String> {
    let mut text = String::new();
    let mut segments = 0;
    for block in blocks {
        if let ContentBlock::Text { text: segment } = block {
            text.push_str(&segment);
            segments += 1;
        }
    }

    if segments == 0 {
        return Err(BriefError::Generation(
            "malformed response: no text segments".into(),
        ));
    }
    Ok(text)
}

/// Map a non-success HTTP status to a generation failure.
fn status_error(status: StatusCode, body: &str) -> BriefError {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!(%status, "generation service rate limit hit");
        return BriefError::Generation(format!("rate limited (HTTP {status}): {detail}"));
    }
    BriefError::Generation(format!("HTTP {status}: {detail}"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn settings(base: &str) -> ClientSettings {
        ClientSettings {
            api_key: "test-key".into(),
            model: "test-model".into(),
            base_url: Url::parse(base).unwrap(),
            api_version: "2023-06-01".into(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn request_serializes_web_search_tool() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: 1000,
            system: "sys",
            messages: [Message {
                role: "user",
                content: "hi",
            }],
            tools: vec![Tool::WebSearch { max_uses: 3 }.into()],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["tools"][0]["type"], "web_search_20250305");
        assert_eq!(json["tools"][0]["name"], "web_search");
        assert_eq!(json["tools"][0]["max_uses"], 3);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn request_omits_empty_tools() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: 800,
            system: "sys",
            messages: [Message {
                role: "user",
                content: "hi",
            }],
            tools: vec![],
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("tools"));
    }

    #[test]
    fn response_skips_non_text_blocks() {
        let json = r#"{"content":[
            {"type":"text","text":"Acme sells "},
            {"type":"server_tool_use","id":"t1","name":"web_search","input":{"query":"acme"}},
            {"type":"web_search_tool_result","tool_use_id":"t1","content":[]},
            {"type":"text","text":"to developers.","citations":[]}
        ]}"#;
        let parsed: MessagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(collect_text(parsed.content).unwrap(), "Acme sells to developers.");
    }

    #[test]
    fn response_without_text_is_malformed() {
        let json = r#"{"content":[{"type":"server_tool_use","id":"t1","name":"web_search","input":{}}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(json).unwrap();
        let err = collect_text(parsed.content).unwrap_err();
        assert!(err.to_string().contains("no text segments"));
    }

    #[tokio::test]
    async fn generate_posts_messages_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "max_tokens": 800,
                "system": "match cases",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "Case A fits."}],
                "usage": {"input_tokens": 12, "output_tokens": 4}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AnthropicClient::new(&settings(&server.uri())).unwrap();
        let request = GenerationRequest::new("match cases", "Match cases for Acme", 800);
        let text = client.generate(&request).await.unwrap();
        assert_eq!(text, "Case A fits.");
    }

    #[tokio::test]
    async fn generate_reports_rate_limit() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "type": "error",
                "error": {"type": "rate_limit_error", "message": "slow down"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AnthropicClient::new(&settings(&server.uri())).unwrap();
        let request = GenerationRequest::new("sys", "content", 100);
        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, BriefError::Generation(_)));
        assert!(err.to_string().contains("rate limited"));
        assert!(err.to_string().contains("slow down"));
    }

    #[tokio::test]
    async fn generate_reports_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let client = AnthropicClient::new(&settings(&server.uri())).unwrap();
        let request = GenerationRequest::new("sys", "content", 100);
        let err = client.generate(&request).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 500"));
        assert!(err.to_string().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn generate_rejects_invalid_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = AnthropicClient::new(&settings(&server.uri())).unwrap();
        let request = GenerationRequest::new("sys", "content", 100);
        let err = client.generate(&request).await.unwrap_err();
        assert!(err.to_string().contains("malformed response"));
    }

    #[tokio::test]
    async fn empty_request_never_reaches_service() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = AnthropicClient::new(&settings(&server.uri())).unwrap();
        let request = GenerationRequest::new("sys", "", 100);
        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, BriefError::ContractViolation { .. }));
    }
}
