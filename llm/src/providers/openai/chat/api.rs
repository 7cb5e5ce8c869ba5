use serde::{Deserialize, Serialize};

use crate::{ChatRequest, ContentBlock, ImageRef, LlmError, ProviderKind};

/// Completion token ceiling sent with every request.
pub(crate) const MAX_TOKENS: u32 = 5000;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
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

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct ImageUrl {
    pub(crate) url: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// A plain string for text-only turns, a part list once images are involved.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub(crate) enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Message {
    pub(crate) role: Role,
    pub(crate) content: MessageContent,
}

impl From<&crate::ChatMessage> for Message {
    fn from(msg: &crate::ChatMessage) -> Self {
        let content = if msg.payload.has_images() {
            MessageContent::Parts(
                msg.payload
                    .content
                    .iter()
                    .map(|block| match block {
                        ContentBlock::Text { text } => ContentPart::Text { text: text.clone() },
                        ContentBlock::Image {
                            name,
                            mime_type,
                            data,
                        } => ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: ImageRef {
                                    name,
                                    mime_type,
                                    data,
                                }
                                .data_url(),
                            },
                        },
                    })
                    .collect(),
            )
        } else {
            MessageContent::Text(msg.get_text())
        };

        Message {
            role: msg.role.into(),
            content,
        }
    }
}

/// Newer model families reject `max_tokens` and expect `max_completion_tokens`.
pub(crate) fn uses_completion_token_field(model: &str) -> bool {
    ["gpt-5", "gpt-4o", "o4-mini"]
        .iter()
        .any(|family| model.contains(family))
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub(crate) model: String,
    pub(crate) messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) temperature: Option<f32>,
}

impl ChatCompletionRequest {
    pub(crate) fn from_request(model: &str, request: &ChatRequest) -> Self {
        let (max_tokens, max_completion_tokens) = if uses_completion_token_field(model) {
            (None, Some(MAX_TOKENS))
        } else {
            (Some(MAX_TOKENS), None)
        };

        ChatCompletionRequest {
            model: model.to_string(),
            messages: request.messages.iter().map(Message::from).collect(),
            max_tokens,
            max_completion_tokens,
            temperature: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct ResponseMessage {
    #[serde(default)]
    pub(crate) content: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct Choice {
    #[serde(default)]
    pub(crate) message: Option<ResponseMessage>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub(crate) choices: Vec<Choice>,
}

/// Reply text at `choices[0].message.content`, shared with OpenAI-compatible providers.
pub(crate) fn parse_response(provider: ProviderKind, body: &serde_json::Value) -> Result<String, LlmError> {
    ChatCompletionResponse::deserialize(body)
        .ok()
        .and_then(|response| response.choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(LlmError::ResponseFormat {
            provider,
            path: "choices[0].message.content",
        })
}
