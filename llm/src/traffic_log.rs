//! Traffic logging for LLM API calls
//!
//! Emits request/response summaries under the `fanout::traffic` target.
//! Content is truncated to avoid leaking private data in logs.

use crate::{LlmError, ProviderKind};
use tracing::debug;

/// Maximum characters to log for content (to protect privacy)
const MAX_CONTENT_LOG_CHARS: usize = 200;

/// Truncate a string for logging, adding ellipsis if truncated
fn truncate_for_log(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}... ({} chars total)", truncated, char_count)
    }
}

fn summarize(body: &impl serde::Serialize) -> String {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "<serialization error>".to_string());
    truncate_for_log(&json, MAX_CONTENT_LOG_CHARS)
}

/// Log an LLM request (truncated summary only)
pub fn log_request(provider: ProviderKind, model: &str, request: &impl serde::Serialize) {
    log_traffic("REQUEST", provider, model, &summarize(request));
}

/// Log an LLM response (truncated summary only)
pub fn log_response(provider: ProviderKind, model: &str, response: &impl serde::Serialize) {
    log_traffic("RESPONSE", provider, model, &summarize(response));
}

/// Log an LLM error
pub fn log_error(provider: ProviderKind, model: &str, error: &LlmError) {
    log_traffic("ERROR", provider, model, &error.to_string());
}

fn log_traffic(event_type: &str, provider: ProviderKind, model: &str, message: &str) {
    debug!(target: "fanout::traffic", event = event_type, provider = provider.id(), model, "{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_untouched() {
        assert_eq!(truncate_for_log("hello", 10), "hello");
    }

    #[test]
    fn test_long_content_truncated_by_chars() {
        let long = "é".repeat(250);
        let out = truncate_for_log(&long, MAX_CONTENT_LOG_CHARS);
        assert!(out.starts_with(&"é".repeat(200)));
        assert!(out.ends_with("... (250 chars total)"));
    }
}
