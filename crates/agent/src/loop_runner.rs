//! The agent reasoning loop implementation.

use crate::event::{AgentEvent, EventSink};
use crate::prompt::JSON_FORMAT;
use crate::session::Session;
use askpdf_core::error::StepError;
use askpdf_core::message::Message;
use askpdf_core::provider::{Provider, ProviderRequest, ResponseFormat};
use askpdf_core::step::{Step, StepRecord};
use askpdf_core::tool::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model produced an `output` step.
    Answer(String),

    /// `max_steps` model requests were made without an `output` step.
    StepLimitReached { steps: u32 },
}

/// Drives one model and one tool registry through the step protocol.
pub struct AgentLoop {
    /// The model provider to use
    provider: Arc<dyn Provider>,

    /// The chat model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Default max tokens per response
    max_tokens: Option<u32>,

    /// Tool registry, shared read-only
    tools: Arc<ToolRegistry>,

    /// Maximum model requests per turn
    max_steps: u32,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            max_steps: 10,
        }
    }

    /// Set the maximum number of model requests per turn.
    pub fn with_max_steps(mut self, max: u32) -> Self {
        self.max_steps = max.max(1);
        self
    }

    /// Set the default max tokens per model response.
    pub fn with_max_tokens(mut self, max: Option<u32>) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Start a session whose system prompt lists this loop's tools.
    pub fn new_session(&self) -> Session {
        Session::new(crate::prompt::system_prompt(&self.tools))
    }

    /// Answer one user question.
    ///
    /// Appends the question and every step of the exchange to `session`.
    /// Provider failures are returned as errors; the transcript keeps
    /// whatever was appended before the failure.
    pub async fn process(
        &self,
        session: &mut Session,
        input: &str,
        sink: &dyn EventSink,
    ) -> Result<TurnOutcome, askpdf_core::Error> {
        session.push_user(input);

        info!(
            conversation_id = %session.id(),
            messages = session.len(),
            "Processing question"
        );

        for step_no in 1..=self.max_steps {
            debug!(conversation_id = %session.id(), step = step_no, "Agent loop step");

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: session.messages().to_vec(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                response_format: ResponseFormat::JsonObject,
            };

            let response = self.provider.complete(request).await?;

            if let Some(usage) = &response.usage {
                debug!(
                    model = %response.model,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    total_tokens = usage.total_tokens,
                    "Model usage"
                );
            }

            let raw = response.message.content;
            let record = match StepRecord::parse(&raw) {
                Ok(record) => record,
                Err(e) => {
                    self.reject(session, Message::assistant(raw.clone()), &raw, &e, sink);
                    continue;
                }
            };

            session.push(record.to_message());

            match record.step {
                Step::Plan => {
                    debug!(content = %record.content_str(), "Plan");
                    sink.on_event(&AgentEvent::Plan {
                        content: record.content_str().to_string(),
                    });
                }
                Step::Observe => {
                    debug!("Model emitted an observe step, continuing");
                }
                Step::Action => {
                    let Some(name) = record.function.as_deref() else {
                        // The record is already in the transcript; only the correction is added.
                        let e = StepError::MissingFunction;
                        warn!(error = %e, "Unusable model reply");
                        session.push(Message::user(correction(&e)));
                        sink.on_event(&AgentEvent::MalformedReply {
                            raw,
                            reason: e.to_string(),
                        });
                        continue;
                    };
                    let input = record.input.as_deref().unwrap_or_default();
                    self.act(session, name, input, sink).await;
                }
                Step::Output => {
                    let answer = record.content.unwrap_or_default();
                    info!(conversation_id = %session.id(), steps = step_no, "Answer ready");
                    sink.on_event(&AgentEvent::Answer {
                        content: answer.clone(),
                    });
                    return Ok(TurnOutcome::Answer(answer));
                }
            }
        }

        warn!(
            conversation_id = %session.id(),
            steps = self.max_steps,
            "Max steps reached without an answer"
        );
        sink.on_event(&AgentEvent::StepLimitReached {
            steps: self.max_steps,
        });
        Ok(TurnOutcome::StepLimitReached {
            steps: self.max_steps,
        })
    }

    /// Run a tool and record its result, or its absence, as an `observe` step.
    async fn act(&self, session: &mut Session, name: &str, input: &str, sink: &dyn EventSink) {
        if !self.tools.contains(name) {
            warn!(tool = %name, "Model requested an unknown tool");
            let available = self.tools.names().join(", ");
            let content = format!("Error: tool '{name}' is not available. Available tools: {available}");
            session.push(StepRecord::observe(content).to_message());
            sink.on_event(&AgentEvent::UnknownTool { name: name.into() });
            return;
        }

        sink.on_event(&AgentEvent::ToolCall {
            name: name.into(),
            input: input.into(),
        });

        let start = std::time::Instant::now();
        let result = self.tools.execute(name, input).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(output) => {
                debug!(tool = %name, duration_ms, chars = output.len(), "Tool executed");
                session.push(StepRecord::observe(output.clone()).to_message());
                sink.on_event(&AgentEvent::Observation {
                    name: name.into(),
                    content: output,
                });
            }
            Err(e) => {
                warn!(tool = %name, duration_ms, error = %e, "Tool execution failed");
                // Report the error to the model so it can recover.
                session.push(StepRecord::observe(format!("Error: {e}")).to_message());
                sink.on_event(&AgentEvent::ToolFailed {
                    name: name.into(),
                    error: e.to_string(),
                });
            }
        }
    }

    /// Record an unusable reply verbatim, followed by a correction.
    fn reject(
        &self,
        session: &mut Session,
        reply: Message,
        raw: &str,
        error: &StepError,
        sink: &dyn EventSink,
    ) {
        warn!(error = %error, "Unusable model reply");
        session.push(reply);
        session.push(Message::user(correction(error)));
        sink.on_event(&AgentEvent::MalformedReply {
            raw: raw.to_string(),
            reason: error.to_string(),
        });
    }
}

fn correction(error: &StepError) -> String {
    format!(
        "Your last reply could not be used: {error}. \
         Reply with exactly one JSON object in this format:\n{JSON_FORMAT}"
    )
}
