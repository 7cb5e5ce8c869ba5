use crate::traffic_log;
use crate::{ChatMessage, ChatPayload, LlmError, ProviderKind, parse_response};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{Level, event, instrument};

/// A fully built HTTP call: endpoint, headers and JSON body.
///
/// Adapters produce these without touching the network so request shapes can
/// be inspected in tests.
#[derive(Clone, Debug)]
pub struct PreparedRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: Value,
}

impl PreparedRequest {
    /// The URL without its query string, safe to log when the key travels as a parameter.
    pub fn endpoint(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
    provider: ProviderKind,
}

impl Client {
    pub fn new(provider: ProviderKind) -> Self {
        Client {
            client: reqwest::Client::new(),
            provider,
        }
    }

    #[instrument(level = "debug", skip(self, request), fields(provider = %self.provider, endpoint = request.endpoint()))]
    pub async fn post(&self, request: &PreparedRequest) -> Result<Value, LlmError> {
        let provider = self.provider;
        // The URL may carry an API key, so it is dropped from transport errors
        let network = |source: reqwest::Error| LlmError::Network {
            provider,
            source: source.without_url(),
        };

        let response = self
            .client
            .post(&request.url)
            .headers(request.headers.clone())
            .json(&request.body)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        let text = response.text().await.map_err(network)?;
        if !status.is_success() {
            let detail = error_detail(&text, status);
            event!(Level::DEBUG, status = status.as_u16(), detail);
            return Err(LlmError::Transport {
                provider,
                status: status.as_u16(),
                detail,
            });
        }
        event!(Level::TRACE, response = text);

        serde_json::from_str(&text).map_err(|_| LlmError::ResponseFormat { provider, path: "$" })
    }

    /// Send a prepared chat call and turn the reply into an assistant message.
    pub async fn chat(&self, model: &str, request: &PreparedRequest) -> Result<ChatMessage, LlmError> {
        traffic_log::log_request(self.provider, model, &request.body);

        let result = self.post(request).await.and_then(|body| {
            traffic_log::log_response(self.provider, model, &body);
            parse_response(self.provider, &body)
        });

        match result {
            Ok(text) => Ok(ChatMessage::assistant(ChatPayload::text(text))),
            Err(e) => {
                traffic_log::log_error(self.provider, model, &e);
                Err(e)
            }
        }
    }
}

/// Pull the most useful message out of an error body: `error.message`, then
/// `message`, then the status reason phrase.
fn error_detail(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/error/message")
                .or_else(|| json.pointer("/message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
}
