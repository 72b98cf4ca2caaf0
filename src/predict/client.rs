use super::prompt::{build_prediction_prompt, normalize_prediction, SYSTEM_PROMPT};
use super::Predictor;
use crate::config::ModelConfig;
use crate::error::PredictionError;
use crate::ledger::RoundEntry;
use crate::providers::message::ChatMessage;
use crate::providers::{ApiProvider, Provider};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Error bodies longer than this are cut before they reach the user.
const MAX_ERROR_BODY: usize = 300;

/// Predictor backed by a chat-completion API.
pub struct ModelPredictor {
    config: ModelConfig,
    provider: ApiProvider,
    client: Client,
}

impl ModelPredictor {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let provider = ApiProvider::from_domain(&config.server.domain);
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            config,
            provider,
            client,
        })
    }

    fn chat_url(&self) -> String {
        let route = self
            .config
            .chat_route
            .as_deref()
            .unwrap_or_else(|| self.provider.chat_endpoint());
        format!(
            "{}/{}",
            self.config.server.base_url(),
            route.trim_start_matches('/')
        )
    }

    async fn send(&self, body: Value) -> Result<Value, PredictionError> {
        let mut request = self
            .client
            .post(self.chat_url())
            .header("accept", "application/json")
            .json(&body);
        for (name, value) in self.provider.chat_headers(&self.config.api_key) {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(PredictionError::Status { status, body });
        }

        response.json::<Value>().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, err: reqwest::Error) -> PredictionError {
        if err.is_timeout() {
            PredictionError::Timeout(self.config.timeout)
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl Predictor for ModelPredictor {
    fn name(&self) -> &str {
        &self.config.model_id
    }

    async fn predict(&self, recent: &[RoundEntry]) -> Result<String, PredictionError> {
        if recent.is_empty() {
            return Err(PredictionError::InsufficientHistory { have: 0, need: 1 });
        }

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_prediction_prompt(recent)),
        ];
        let body = self
            .provider
            .build_chat_body(&self.config.model_id, &messages);
        trace!("Prediction request body:\n{}", body);

        let started = Instant::now();
        let timeout = self.config.timeout;
        let response = tokio::time::timeout(timeout, self.send(body))
            .await
            .map_err(|_| PredictionError::Timeout(timeout))??;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Prediction response received"
        );

        let content = self.provider.parse_chat_content(&response).ok_or_else(|| {
            PredictionError::MalformedResponse("response carries no assistant content".into())
        })?;
        let prediction = normalize_prediction(content).ok_or_else(|| {
            PredictionError::MalformedResponse("assistant content is empty".into())
        })?;

        info!(
            rounds = recent.len(),
            model = %self.config.model_id,
            prediction = %prediction,
            "Prediction ready"
        );

        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::ledger::RoundStatus;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn history(n: u64) -> Vec<RoundEntry> {
        (1..=n)
            .map(|round| RoundEntry {
                round,
                status: RoundStatus::Win,
                color: "RED".to_string(),
                timestamp: "2025-06-10 21:14:03".to_string(),
                source: "Coinryze".to_string(),
            })
            .collect()
    }

    fn predictor_for(domain: &str, port: u16, timeout: Duration) -> ModelPredictor {
        let server = ServerConfig::builder()
            .domain(domain)
            .port(port)
            .plaintext(true)
            .build()
            .unwrap();
        let config = ModelConfig::builder()
            .server(server)
            .api_key("test-key")
            .model_id("gpt-4o")
            .timeout(timeout)
            .build()
            .unwrap();
        ModelPredictor::new(config).unwrap()
    }

    /// Read one HTTP request (headers plus body) and return it as text.
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Answer a single request with `status` and `body`, handing the request text back.
    async fn serve_once(status: &'static str, body: String) -> (u16, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });
        (port, handle)
    }

    #[tokio::test]
    async fn test_prediction_round_trip() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":" violet "}}]}"#;
        let (port, server) = serve_once("200 OK", body.to_string()).await;
        let predictor = predictor_for("127.0.0.1", port, Duration::from_secs(5));

        let prediction = predictor.predict(&history(5)).await.unwrap();
        assert_eq!(prediction, "VIOLET");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/chat/completions HTTP/1.1"));
        assert!(request
            .to_ascii_lowercase()
            .contains("authorization: bearer test-key"));
        assert!(request.contains("You are a helpful predictor."));
        assert!(request.contains("- RED (WIN)"));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let (port, _server) =
            serve_once("401 Unauthorized", r#"{"error":"bad key"}"#.to_string()).await;
        let predictor = predictor_for("127.0.0.1", port, Duration::from_secs(5));

        let err = predictor.predict(&history(5)).await.unwrap_err();
        match err {
            PredictionError::Status { status, body } => {
                assert_eq!(status.as_u16(), 401);
                assert!(body.contains("bad key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_content_is_malformed() {
        let (port, _server) = serve_once("200 OK", r#"{"choices":[]}"#.to_string()).await;
        let predictor = predictor_for("127.0.0.1", port, Duration::from_secs(5));

        assert!(matches!(
            predictor.predict(&history(5)).await,
            Err(PredictionError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });
        let predictor = predictor_for("127.0.0.1", port, Duration::from_millis(200));

        assert!(matches!(
            predictor.predict(&history(5)).await,
            Err(PredictionError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_history_is_rejected_without_a_request() {
        let predictor = predictor_for("127.0.0.1", 9, Duration::from_secs(1));

        assert!(matches!(
            predictor.predict(&[]).await,
            Err(PredictionError::InsufficientHistory { have: 0, .. })
        ));
    }

    #[test]
    fn test_chat_url_uses_custom_route() {
        let server = ServerConfig::builder().domain("api.anthropic.com").build().unwrap();
        let config = ModelConfig::builder()
            .server(server)
            .chat_route("/custom/messages")
            .api_key("k")
            .model_id("m")
            .build()
            .unwrap();
        let predictor = ModelPredictor::new(config).unwrap();

        assert_eq!(predictor.chat_url(), "https://api.anthropic.com:443/custom/messages");
    }
}
