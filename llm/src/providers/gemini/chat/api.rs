use serde::{Deserialize, Serialize};

use crate::{ChatRequest, ContentBlock, LlmError, ProviderKind};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl From<crate::api::Role> for Role {
    fn from(value: crate::api::Role) -> Self {
        match value {
            crate::api::Role::User => Role::User,
            crate::api::Role::Assistant => Role::Model,
        }
    }
}

/// Gemini inline data for images
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub(crate) mime_type: String,
    pub(crate) data: String, // base64-encoded
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum Part {
    Text(String),
    InlineData(InlineData),
}

impl From<&ContentBlock> for Part {
    fn from(block: &ContentBlock) -> Self {
        match block {
            ContentBlock::Text { text } => Part::Text(text.clone()),
            ContentBlock::Image {
                mime_type, data, ..
            } => Part::InlineData(InlineData {
                mime_type: mime_type.clone(),
                data: data.clone(),
            }),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Content {
    pub(crate) role: Role,
    pub(crate) parts: Vec<Part>,
}

impl From<&crate::ChatMessage> for Content {
    fn from(msg: &crate::ChatMessage) -> Self {
        Content {
            role: msg.role.into(),
            parts: msg.payload.content.iter().map(Part::from).collect(),
        }
    }
}

/// Sampling settings sent with every Gemini request.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2000,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub(crate) contents: Vec<Content>,
    pub(crate) generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    pub(crate) fn from_request(request: &ChatRequest, generation_config: &GenerationConfig) -> Self {
        GenerateContentRequest {
            contents: request.messages.iter().map(Content::from).collect(),
            generation_config: generation_config.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub(crate) text: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct ResponseContent {
    #[serde(default)]
    pub(crate) parts: Vec<ResponsePart>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub(crate) content: Option<ResponseContent>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

/// Reply text at `candidates[0].content.parts[0].text`.
pub(crate) fn parse_response(body: &serde_json::Value) -> Result<String, LlmError> {
    GenerateContentResponse::deserialize(body)
        .ok()
        .and_then(|response| response.candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or(LlmError::ResponseFormat {
            provider: ProviderKind::Gemini,
            path: "candidates[0].content.parts[0].text",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChatMessage, ChatPayload};
    use serde_json::json;

    #[test]
    fn test_roles_remapped_and_images_inlined() {
        let history = vec![
            ChatMessage::user("q1".into()),
            ChatMessage::assistant("a1".into()),
        ];
        let image = ContentBlock::Image {
            name: "shot.png".to_string(),
            mime_type: "image/png".to_string(),
            data: "iVBORw0KGgo=".to_string(),
        };
        let request = ChatRequest::with_prompt(&history, ChatPayload::with_images("q2", vec![image]));
        let body = serde_json::to_value(GenerateContentRequest::from_request(
            &request,
            &GenerationConfig::default(),
        ))
        .unwrap();

        let roles: Vec<&str> = body["contents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["user", "model", "user"]);

        let parts = &body["contents"][2]["parts"];
        assert_eq!(parts[0], json!({"text": "q2"}));
        assert_eq!(parts[1], json!({"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}));
    }

    #[test]
    fn test_generation_config_shape() {
        let request = ChatRequest::new(&[ChatMessage::user("hi".into())]);
        let body = serde_json::to_value(GenerateContentRequest::from_request(
            &request,
            &GenerationConfig::default(),
        ))
        .unwrap();
        let config = &body["generationConfig"];
        assert_eq!(config["topK"], 40);
        assert_eq!(config["maxOutputTokens"], 2000);
        assert!((config["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((config["topP"].as_f64().unwrap() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_parse_response() {
        let body = json!({"candidates": [{"content": {"role": "model", "parts": [{"text": "hi there"}]}}]});
        assert_eq!(parse_response(&body).unwrap(), "hi there");

        let blocked = json!({"candidates": [{"finishReason": "SAFETY"}]});
        assert!(matches!(
            parse_response(&blocked),
            Err(LlmError::ResponseFormat { provider: ProviderKind::Gemini, .. })
        ));
    }
}
