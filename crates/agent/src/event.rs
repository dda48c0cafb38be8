//! Agent-level events.
//!
//! The loop reports what it is doing through an `EventSink` so that the
//! terminal front end can print progress in order while the loop runs.

use serde::{Deserialize, Serialize};

/// Events emitted by the agent during a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// The model announced a plan.
    Plan { content: String },

    /// The agent is calling a registered tool.
    ToolCall { name: String, input: String },

    /// Tool result recorded as an `observe` step.
    Observation { name: String, content: String },

    /// The tool returned an error; it was recorded as an observation.
    ToolFailed { name: String, error: String },

    /// The model asked for a tool that is not registered.
    UnknownTool { name: String },

    /// The reply could not be used; a correction was sent.
    MalformedReply { raw: String, reason: String },

    /// Final answer for the turn.
    Answer { content: String },

    /// The turn ran out of model requests.
    StepLimitReached { steps: u32 },
}

impl AgentEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Plan { .. } => "plan",
            Self::ToolCall { .. } => "tool_call",
            Self::Observation { .. } => "observation",
            Self::ToolFailed { .. } => "tool_failed",
            Self::UnknownTool { .. } => "unknown_tool",
            Self::MalformedReply { .. } => "malformed_reply",
            Self::Answer { .. } => "answer",
            Self::StepLimitReached { .. } => "step_limit_reached",
        }
    }
}

/// Receives events synchronously, in the order they happen.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: &AgentEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn on_event(&self, _event: &AgentEvent) {}
}

impl<F> EventSink for F
where
    F: Fn(&AgentEvent) + Send + Sync,
{
    fn on_event(&self, event: &AgentEvent) {
        self(event)
    }
}
