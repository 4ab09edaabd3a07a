//! Mock provider for tests and offline use.
//!
//! Replies with a scripted answer, can be told to fail or to stall, and keeps
//! every request it receives so callers can assert on the exact messages.

use std::sync::Mutex;
use std::time::Duration;

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use sanad_core::{AppError, AppResult};

/// What the mock does when asked to complete.
#[derive(Debug, Clone)]
enum MockBehavior {
    Reply(String),
    Fail(String),
}

/// Scripted remote model.
#[derive(Debug)]
pub struct MockLlmClient {
    behavior: MockBehavior,
    delay: Option<Duration>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    /// Mock that always answers with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            behavior: MockBehavior::Reply(reply.into()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Mock that always fails with `RemoteUnavailable`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            behavior: MockBehavior::Fail(reason.into()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Number of completions attempted.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(request.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            MockBehavior::Reply(reply) => Ok(LlmResponse {
                content: reply.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(0, 0),
            }),
            MockBehavior::Fail(reason) => Err(AppError::RemoteUnavailable(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    #[tokio::test]
    async fn test_mock_replies_and_records() {
        let mock = MockLlmClient::new("scripted");
        let request = LlmRequest::new("m", vec![ChatMessage::user("q")]);

        let response = mock.complete(&request).await.unwrap();
        assert_eq!(response.content, "scripted");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.requests()[0].messages[0].content, "q");
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockLlmClient::failing("503 upstream");
        let request = LlmRequest::new("m", vec![]);

        let err = mock.complete(&request).await.unwrap_err();
        assert!(matches!(err, AppError::RemoteUnavailable(_)));
    }
}
