use crate::error::{LookupError, Result};
use crate::result::{Citation, RankQuery, RankingOutcome};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Anything that can estimate where a domain ranks for a keyword using one credential.
#[async_trait]
pub trait RankLookup: Send + Sync {
    async fn lookup_rank(&self, query: &RankQuery, api_key: &str) -> Result<RankingOutcome>;
}

#[async_trait]
impl<T: RankLookup + ?Sized> RankLookup for Arc<T> {
    async fn lookup_rank(&self, query: &RankQuery, api_key: &str) -> Result<RankingOutcome> {
        (**self).lookup_rank(query, api_key).await
    }
}

pub struct GeminiClient {
    client: Client,
    api_base: Url,
    model: String,
}

impl GeminiClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Rankwatch/0.1 (https://github.com/trapdoorsec/rankwatch)")
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.clamp(1, 30)))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        let api_base = Url::parse(DEFAULT_API_BASE)
            .map_err(|e| LookupError::InvalidEndpoint(e.to_string()))?;

        Ok(Self {
            client,
            api_base,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: &str) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with a slash
        let normalized = if api_base.ends_with('/') {
            api_base.to_string()
        } else {
            format!("{}/", api_base)
        };
        self.api_base = Url::parse(&normalized)
            .map_err(|e| LookupError::InvalidEndpoint(format!("{}: {}", api_base, e)))?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> Result<Url> {
        self.api_base
            .join(&format!("models/{}:generateContent", self.model))
            .map_err(|e| LookupError::InvalidEndpoint(e.to_string()))
    }

    async fn generate(&self, prompt: String, api_key: &str) -> Result<RankingOutcome> {
        let endpoint = self.endpoint()?;
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };

        let start = Instant::now();
        let response = self
            .client
            .post(endpoint)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(
            "generateContent answered {} in {}ms",
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| LookupError::ParseError(e.to_string()))?;

        outcome_from_response(parsed)
    }
}

#[async_trait]
impl RankLookup for GeminiClient {
    async fn lookup_rank(&self, query: &RankQuery, api_key: &str) -> Result<RankingOutcome> {
        if api_key.trim().is_empty() {
            return Err(LookupError::MissingKey);
        }

        info!(
            "Looking up rank of {} for \"{}\" ({}, {})",
            query.domain, query.keyword, query.device, query.country
        );

        self.generate(build_prompt(query), api_key)
            .await
            .map_err(|e| e.for_keyword(&query.keyword))
    }
}

/// The instruction sent to the model. The answer format is what `interpret` later reads back.
pub fn build_prompt(query: &RankQuery) -> String {
    let city_line = query
        .city
        .as_ref()
        .map(|city| format!("City: {}", city))
        .unwrap_or_default();

    format!(
        r#"
Act as a professional SEO analyst.
Your task is to determine the search engine ranking of a specific website for a given keyword with specific search parameters.

Keyword: "{keyword}"
Website (Domain): {domain}
Device: {device}
Country: {country}
{city_line}

Using the Google Search tool, find the current ranking position of the website "{domain}" for the exact search query "{keyword}". The search must be performed as if it were from a **{device}** device located {location}.

Provide a concise answer. First, state the rank as a number (e.g., "Rank: 1", "Rank: 15"). Then, provide the specific URL from "{domain}" that is ranking.

If the website is not found within the top 50 search results, clearly state that it is "Not found in top 50 results."
"#,
        keyword = query.keyword,
        domain = query.domain,
        device = query.device,
        country = query.country,
        city_line = city_line,
        location = query.location_phrase(),
    )
}

fn api_error(code: u16, body: &str) -> LookupError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => LookupError::Api {
            code: envelope.error.code.unwrap_or(code),
            status: envelope.error.status.unwrap_or_else(|| "ERROR".to_string()),
            message: envelope.error.message,
        },
        Err(_) => LookupError::Api {
            code,
            status: "HTTP_ERROR".to_string(),
            message: body.chars().take(200).collect(),
        },
    }
}

fn outcome_from_response(response: GenerateResponse) -> Result<RankingOutcome> {
    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        LookupError::EmptyResponse(reason)
    })?;

    let ranking_text: String = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let citations = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter_map(|web| {
            web.uri.map(|url| Citation {
                url,
                title: web.title,
            })
        })
        .collect();

    Ok(RankingOutcome {
        ranking_text,
        citations,
    })
}

// Wire types for generateContent

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Device;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    const ENDPOINT_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn query(city: Option<&str>) -> RankQuery {
        RankQuery {
            keyword: "best coffee makers".to_string(),
            domain: "coffee.example".to_string(),
            device: Device::Mobile,
            country: "Vietnam".to_string(),
            city: city.map(str::to_string),
        }
    }

    async fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::with_timeout(5)
            .unwrap()
            .with_api_base(&format!("{}/v1beta", server.uri()))
            .unwrap()
    }

    #[test]
    fn test_prompt_mentions_city_when_present() {
        let prompt = build_prompt(&query(Some("Hanoi")));
        assert!(prompt.contains("City: Hanoi"));
        assert!(prompt.contains("located in the city of Hanoi, Vietnam"));
        assert!(prompt.contains("**mobile** device"));
        assert!(prompt.contains("Not found in top 50 results."));
    }

    #[test]
    fn test_prompt_without_city() {
        let prompt = build_prompt(&query(None));
        assert!(!prompt.contains("City:"));
        assert!(prompt.contains("located in Vietnam"));
    }

    #[test]
    fn test_endpoint_joins_model() {
        let client = GeminiClient::new()
            .unwrap()
            .with_model("gemini-2.0-flash")
            .with_api_base("https://proxy.local/api")
            .unwrap();
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "https://proxy.local/api/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_lookup_collects_text_and_citations() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT_PATH))
            .and(header("x-goog-api-key", "good-key"))
            .and(body_partial_json(json!({"tools": [{"google_search": {}}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [
                        {"text": "Rank: 4. "},
                        {"text": "https://coffee.example/makers"}
                    ]},
                    "groundingMetadata": {"groundingChunks": [
                        {"web": {"uri": "https://coffee.example/makers", "title": "coffee.example"}},
                        {"web": {"title": "no uri here"}},
                        {"retrievedContext": {}}
                    ]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let outcome = client.lookup_rank(&query(None), "good-key").await.unwrap();

        assert_eq!(outcome.ranking_text, "Rank: 4. https://coffee.example/makers");
        assert_eq!(outcome.citations.len(), 1);
        assert_eq!(outcome.citations[0].url, "https://coffee.example/makers");
        assert_eq!(outcome.citations[0].title.as_deref(), Some("coffee.example"));
    }

    #[tokio::test]
    async fn test_api_error_message_is_wrapped_with_keyword() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .lookup_rank(&query(None), "bad-key")
            .await
            .unwrap_err()
            .to_string();

        assert!(err.starts_with("Failed to get ranking from Gemini API for \"best coffee makers\""));
        assert!(err.contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_quota_error_without_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.lookup_rank(&query(None), "key").await.unwrap_err();

        match err {
            LookupError::Keyword { source, .. } => match *source {
                LookupError::Api { code, ref message, .. } => {
                    assert_eq!(code, 429);
                    assert_eq!(message, "quota exhausted");
                }
                other => panic!("unexpected inner error: {other:?}"),
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_key_fails_without_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.lookup_rank(&query(None), "   ").await.unwrap_err();
        assert!(matches!(err, LookupError::MissingKey));
    }

    #[tokio::test]
    async fn test_no_candidates_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.lookup_rank(&query(None), "key").await.unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
