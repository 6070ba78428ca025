//! Public chat endpoint types

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Inbound message from a chat widget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub chatbot_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_id: Option<String>,
    #[serde(default)]
    pub streaming: bool,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chatbot_id.trim().is_empty() {
            return Err(DomainError::validation("chatbotId is required"));
        }

        if self.message.trim().is_empty() {
            return Err(DomainError::validation("message is required"));
        }

        Ok(())
    }
}

/// Blocking reply
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
    pub tokens_used: u32,
}

/// Last frame of a stream that failed after the first chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamErrorFrame {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_camel_case_and_defaults() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"chatbotId": "bot1", "message": "hello"}"#).unwrap();

        assert_eq!(request.chatbot_id, "bot1");
        assert!(request.conversation_id.is_none());
        assert!(request.visitor_id.is_none());
        assert!(!request.streaming);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_optional_fields() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"chatbotId": "bot1", "message": "hi", "conversationId": "c1", "visitorId": "v9", "streaming": true}"#,
        )
        .unwrap();

        assert_eq!(request.conversation_id.as_deref(), Some("c1"));
        assert_eq!(request.visitor_id.as_deref(), Some("v9"));
        assert!(request.streaming);
    }

    #[test]
    fn test_blank_fields_rejected() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"chatbotId": "bot1", "message": "   "}"#).unwrap();
        assert!(matches!(request.validate(), Err(DomainError::Validation { .. })));

        let request: ChatRequest =
            serde_json::from_str(r#"{"chatbotId": "", "message": "hi"}"#).unwrap();
        assert!(matches!(request.validate(), Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_response_wire_shape() {
        let response = ChatResponse {
            response: "hi there".to_string(),
            conversation_id: "c1".to_string(),
            tokens_used: 12,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"response": "hi there", "conversationId": "c1", "tokensUsed": 12})
        );
    }
}
