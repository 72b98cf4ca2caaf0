use super::Provider;

/// OpenAI and every server speaking its chat-completions protocol.
#[derive(Debug, Clone, Default)]
pub struct OpenAi;

impl Provider for OpenAi {}
