//! Chat message types for the OpenAI-compatible completion API.

use serde::{Deserialize, Serialize};

/// One turn of the conversation sent to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        ChatMessage {
            role: "system".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        ChatMessage {
            role: "assistant".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }

    /// User turn with mixed content parts (text plus screenshot).
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: MessageContent::Parts(parts),
        }
    }
}

/// Message content (string or array).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Content part for multimodal messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Image reference carried inline as a data URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ImageUrl {
    /// High-detail data URL for a base64 PNG screenshot.
    pub fn png_data(base64_png: &str) -> Self {
        ImageUrl {
            url: format!("data:image/png;base64,{base64_png}"),
            detail: Some("high".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message_serializes_as_plain_string() {
        let msg = ChatMessage::system("be brief");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "be brief");
    }

    #[test]
    fn test_image_part_wire_shape() {
        let msg = ChatMessage::user_parts(vec![
            ContentPart::Text {
                text: "what next?".into(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl::png_data("aGVsbG8="),
            },
        ]);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(
            json["content"][1]["image_url"]["url"],
            "data:image/png;base64,aGVsbG8="
        );
        assert_eq!(json["content"][1]["image_url"]["detail"], "high");
    }
}
