//! Shared test doubles for agent tests.

use crate::event::{AgentEvent, EventSink};
use askpdf_core::error::{ProviderError, ToolError};
use askpdf_core::message::Message;
use askpdf_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use askpdf_core::tool::Tool;
use std::sync::{Arc, Mutex};

/// A mock provider that returns a sequence of scripted replies.
///
/// Each call to `complete` returns the next reply and records the request.
/// Panics if more calls are made than replies provided.
pub struct ScriptedProvider {
    replies: Vec<String>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let n = requests.len();
        let Some(reply) = self.replies.get(n) else {
            panic!(
                "ScriptedProvider: no more replies (call #{n}, have {})",
                self.replies.len()
            );
        };
        requests.push(request);
        Ok(make_reply(reply))
    }
}

/// A provider whose every call fails.
pub struct FailingProvider;

#[async_trait::async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

pub fn make_reply(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A tool with a fixed result that records every input it receives.
pub struct RecordingTool {
    name: String,
    description: String,
    result: Result<String, String>,
    pub calls: Mutex<Vec<String>>,
}

impl RecordingTool {
    pub fn new(name: &str, result: &str) -> Self {
        Self {
            name: name.into(),
            description: format!("{name} test tool"),
            result: Ok(result.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Stand-in for the real retriever, with its description.
    pub fn ask_pdf(result: &str) -> Self {
        Self {
            description: "Takes a question and answers it using the uploaded PDF data.".into(),
            ..Self::new("ask_pdf", result)
        }
    }

    pub fn failing(name: &str, reason: &str) -> Self {
        Self {
            result: Err(reason.into()),
            ..Self::new(name, "")
        }
    }
}

#[async_trait::async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        self.calls.lock().unwrap().push(input.to_string());
        self.result.clone().map_err(|reason| ToolError::ExecutionFailed {
            tool_name: self.name.clone(),
            reason,
        })
    }
}

/// Lets a test keep a handle on a tool after registering it.
pub struct Shared<T>(pub Arc<T>);

#[async_trait::async_trait]
impl<T: Tool> Tool for Shared<T> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn description(&self) -> &str {
        self.0.description()
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        self.0.call(input).await
    }
}

/// Collects events for assertions.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<AgentEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn on_event(&self, event: &AgentEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
