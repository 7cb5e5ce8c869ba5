use serde::{Deserialize, Serialize};

use crate::{ChatRequest, ContentBlock, LlmError, ProviderKind};

pub(crate) const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 5000;

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl From<crate::api::Role> for Role {
    fn from(value: crate::api::Role) -> Self {
        match value {
            crate::api::Role::User => Role::User,
            crate::api::Role::Assistant => Role::Assistant,
        }
    }
}

/// Claude image source, always inline base64 here
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ImageSource {
    Base64 { media_type: String, data: String },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum Content {
    Text { text: String },
    Image { source: ImageSource },
}

impl From<&ContentBlock> for Content {
    fn from(block: &ContentBlock) -> Self {
        match block {
            ContentBlock::Text { text } => Content::Text { text: text.clone() },
            ContentBlock::Image {
                mime_type, data, ..
            } => Content::Image {
                source: ImageSource::Base64 {
                    media_type: mime_type.clone(),
                    data: data.clone(),
                },
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct InputMessage {
    pub(crate) role: Role,
    pub(crate) content: Vec<Content>,
}

impl From<&crate::ChatMessage> for InputMessage {
    fn from(msg: &crate::ChatMessage) -> Self {
        InputMessage {
            role: msg.role.into(),
            content: msg.payload.content.iter().map(Content::from).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct MessagesRequest {
    pub(crate) model: String,
    pub(crate) messages: Vec<InputMessage>,
    pub(crate) max_tokens: u32,
}

impl MessagesRequest {
    pub(crate) fn from_request(model: &str, request: &ChatRequest) -> Self {
        MessagesRequest {
            model: model.to_string(),
            messages: request.messages.iter().map(InputMessage::from).collect(),
            max_tokens: MAX_TOKENS,
        }
    }
}

/// Response content blocks. Only text is read.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ResponseContent {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    pub(crate) content: Vec<ResponseContent>,
}

/// Reply text at `content[0].text`.
pub(crate) fn parse_response(body: &serde_json::Value) -> Result<String, LlmError> {
    MessagesResponse::deserialize(body)
        .ok()
        .and_then(|response| match response.content.into_iter().next() {
            Some(ResponseContent::Text { text }) => Some(text),
            _ => None,
        })
        .ok_or(LlmError::ResponseFormat {
            provider: ProviderKind::Claude,
            path: "content[0].text",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChatMessage, ChatPayload};
    use serde_json::json;

    #[test]
    fn test_images_become_base64_sources() {
        let image = ContentBlock::Image {
            name: "chart.webp".to_string(),
            mime_type: "image/webp".to_string(),
            data: "UklGRg==".to_string(),
        };
        let request = ChatRequest::with_prompt(
            &[ChatMessage::user("hi".into()), ChatMessage::assistant("hey".into())],
            ChatPayload::with_images("describe", vec![image]),
        );
        let body = serde_json::to_value(MessagesRequest::from_request("claude-3-opus", &request)).unwrap();

        assert_eq!(body["max_tokens"], 5000);
        assert!(body.get("max_completion_tokens").is_none());
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["messages"][0]["content"][0], json!({"type": "text", "text": "hi"}));

        let content = &body["messages"][2]["content"];
        assert_eq!(content[0], json!({"type": "text", "text": "describe"}));
        assert_eq!(
            content[1],
            json!({"type": "image", "source": {"type": "base64", "media_type": "image/webp", "data": "UklGRg=="}})
        );
    }

    #[test]
    fn test_parse_reads_first_block_only() {
        let body = json!({"content": [{"type": "text", "text": "answer"}, {"type": "text", "text": "more"}]});
        assert_eq!(parse_response(&body).unwrap(), "answer");

        let body = json!({"content": [
            {"type": "tool_use", "id": "toolu_1", "name": "lookup", "input": {}},
            {"type": "text", "text": "answer"}
        ]});
        let err = parse_response(&body).unwrap_err();
        assert!(matches!(err, LlmError::ResponseFormat { path: "content[0].text", .. }));
    }

    #[test]
    fn test_parse_missing_text() {
        let err = parse_response(&json!({"content": []})).unwrap_err();
        assert!(matches!(err, LlmError::ResponseFormat { provider: ProviderKind::Claude, .. }));
    }
}
