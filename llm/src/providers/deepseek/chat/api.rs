use crate::providers::openai::chat::api::{ChatCompletionRequest, MAX_TOKENS, Message, MessageContent};
use crate::{ChatMessage, ChatRequest};

const TEMPERATURE: f32 = 0.7;

/// DeepSeek only accepts text, so attached images become a note naming them.
fn text_only(msg: &ChatMessage) -> Message {
    let mut text = msg.get_text();
    let images = msg.payload.get_images();
    if !images.is_empty() {
        let names = images.iter().map(|image| image.name).collect::<Vec<_>>().join(", ");
        text.push_str(&format!(
            "\n\n[Note: image files were uploaded ({}), but DeepSeek does not support image analysis yet. \
             Please describe the image content so I can help analyze it.]",
            names
        ));
    }

    Message {
        role: msg.role.into(),
        content: MessageContent::Text(text),
    }
}

pub(crate) fn from_request(model: &str, request: &ChatRequest) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: request.messages.iter().map(text_only).collect(),
        max_tokens: Some(MAX_TOKENS),
        max_completion_tokens: None,
        temperature: Some(TEMPERATURE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChatPayload, ContentBlock};

    #[test]
    fn test_images_become_a_text_note() {
        let image = ContentBlock::Image {
            name: "diagram.png".to_string(),
            mime_type: "image/png".to_string(),
            data: "iVBORw0KGgo=".to_string(),
        };
        let request = ChatRequest::with_prompt(
            &[ChatMessage::assistant("earlier".into())],
            ChatPayload::with_images("explain", vec![image]),
        );
        let body = serde_json::to_value(from_request("deepseek-chat", &request)).unwrap();

        assert_eq!(body["max_tokens"], 5000);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!(body.get("max_completion_tokens").is_none());

        let last = &body["messages"][1];
        assert_eq!(last["role"], "user");
        let content = last["content"].as_str().expect("content is a plain string");
        assert!(content.starts_with("explain"));
        assert!(content.contains("diagram.png"));
        assert!(content.contains("does not support image analysis"));

        let raw = body.to_string();
        assert!(!raw.contains("iVBORw0KGgo="));
        assert!(!raw.contains("image_url"));
    }

    #[test]
    fn test_text_turns_unchanged() {
        let request = ChatRequest::new(&[ChatMessage::user("plain".into())]);
        let body = serde_json::to_value(from_request("deepseek-chat", &request)).unwrap();
        assert_eq!(body["messages"][0]["content"], "plain");
    }
}
