use super::message::{ChatMessage, ChatMessageRole};
use super::Provider;
use serde_json::{json, Value};

#[derive(Debug, Clone, Default)]
pub struct Anthropic;

impl Anthropic {
    const API_VERSION: &'static str = "2023-06-01";
    const MAX_TOKENS: u32 = 64;
}

impl Provider for Anthropic {
    fn chat_endpoint(&self) -> &'static str {
        "/v1/messages"
    }

    fn chat_headers(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![
            ("x-api-key", api_key.to_string()),
            ("anthropic-version", Self::API_VERSION.to_string()),
        ]
    }

    // System instructions travel in a top-level field, not in `messages`.
    fn build_chat_body(&self, model_id: &str, messages: &[ChatMessage]) -> Value {
        let system = messages
            .iter()
            .filter(|m| m.role() == ChatMessageRole::System)
            .map(|m| m.content())
            .collect::<Vec<_>>()
            .join("\n");
        let conversation: Vec<&ChatMessage> = messages
            .iter()
            .filter(|m| m.role() != ChatMessageRole::System)
            .collect();

        let mut body = json!({
            "model": model_id,
            "max_tokens": Self::MAX_TOKENS,
            "messages": conversation,
            "stream": false,
        });
        if !system.is_empty() {
            body["system"] = Value::String(system);
        }
        body
    }

    fn parse_chat_content<'a>(&self, response: &'a Value) -> Option<&'a str> {
        response["content"][0]["text"].as_str()
    }
}
