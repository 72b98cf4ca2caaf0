mod anthropic;
pub mod message;
mod openai;

pub use anthropic::Anthropic;
pub use openai::OpenAi;

use enum_dispatch::enum_dispatch;
use message::ChatMessage;
use serde_json::{json, Value};

#[enum_dispatch]
pub trait Provider {
    /// Endpoint path for chat/message completions (default: OpenAI-style)
    fn chat_endpoint(&self) -> &'static str {
        "/v1/chat/completions"
    }

    /// Provider-specific headers for the chat endpoint (default: Bearer token)
    fn chat_headers(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![("Authorization", format!("Bearer {}", api_key))]
    }

    /// Build the request body for a chat completion (default: OpenAI-style)
    fn build_chat_body(&self, model_id: &str, messages: &[ChatMessage]) -> Value {
        json!({
            "model": model_id,
            "messages": messages
        })
    }

    /// Parse the assistant's content from the response (default: OpenAI-style)
    fn parse_chat_content<'a>(&self, response: &'a Value) -> Option<&'a str> {
        response["choices"][0]["message"]["content"].as_str()
    }
}

#[enum_dispatch(Provider)]
#[derive(Debug, Clone)]
pub enum ApiProvider {
    OpenAi,
    Anthropic,
}

impl ApiProvider {
    /// Detect the appropriate provider based on domain.
    /// Anything not recognised is assumed to speak the OpenAI protocol.
    pub fn from_domain(domain: &str) -> Self {
        if domain.contains("anthropic") {
            Anthropic.into()
        } else {
            OpenAi.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_detection() {
        assert!(matches!(
            ApiProvider::from_domain("api.anthropic.com"),
            ApiProvider::Anthropic(_)
        ));
        assert!(matches!(
            ApiProvider::from_domain("api.openai.com"),
            ApiProvider::OpenAi(_)
        ));
        assert!(matches!(
            ApiProvider::from_domain("localhost"),
            ApiProvider::OpenAi(_)
        ));
    }

    #[test]
    fn test_openai_round_trip_shape() {
        let provider = ApiProvider::from_domain("api.openai.com");
        let body = provider.build_chat_body("gpt-4o", &[ChatMessage::user("hi")]);
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["content"], "hi");

        let response = json!({"choices": [{"message": {"role": "assistant", "content": "GREEN"}}]});
        assert_eq!(provider.parse_chat_content(&response), Some("GREEN"));
        assert_eq!(provider.chat_endpoint(), "/v1/chat/completions");
    }
}
