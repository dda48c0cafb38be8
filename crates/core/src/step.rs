//! Step records: the JSON contract between the agent loop and the model.
//!
//! Every model reply is a single JSON object:
//!
//! ```json
//! {"step": "plan" | "action" | "observe" | "output",
//!  "content": "...", "function": "tool name", "input": "tool argument"}
//! ```
//!
//! `function` and `input` only appear on `action` steps; `content` may be
//! absent on them too. Absent fields are omitted when a record is written
//! back into the transcript.

use crate::error::StepError;
use crate::message::Message;
use serde::{Deserialize, Serialize};

/// Phase of the agent's reasoning cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Plan,
    Action,
    Observe,
    Output,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Plan => "plan",
            Step::Action => "action",
            Step::Observe => "observe",
            Step::Output => "output",
        }
    }
}

impl std::str::FromStr for Step {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plan" => Ok(Step::Plan),
            "action" => Ok(Step::Action),
            "observe" => Ok(Step::Observe),
            "output" => Ok(Step::Output),
            other => Err(StepError::UnknownStep(other.to_string())),
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured reply from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: Step,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

impl StepRecord {
    /// Build an `observe` record carrying a tool result.
    pub fn observe(content: impl Into<String>) -> Self {
        Self {
            step: Step::Observe,
            content: Some(content.into()),
            function: None,
            input: None,
        }
    }

    /// Parse a raw model reply.
    ///
    /// Models do not always keep to string-typed fields, so a non-string
    /// `content` or `input` (a number, an object) is kept as its JSON text
    /// rather than rejected. `null` counts as absent.
    pub fn parse(raw: &str) -> Result<Self, StepError> {
        let value: serde_json::Value =
            serde_json::from_str(raw.trim()).map_err(|e| StepError::InvalidJson(e.to_string()))?;

        let obj = value
            .as_object()
            .ok_or_else(|| StepError::InvalidJson("expected a JSON object".into()))?;

        let step = match obj.get("step") {
            Some(serde_json::Value::String(tag)) => tag.trim().to_lowercase().parse::<Step>()?,
            Some(other) => return Err(StepError::UnknownStep(other.to_string())),
            None => return Err(StepError::UnknownStep("<missing>".into())),
        };

        Ok(Self {
            step,
            content: lenient_string(obj.get("content")),
            function: lenient_string(obj.get("function")),
            input: lenient_string(obj.get("input")),
        })
    }

    /// Serialize for the transcript.
    pub fn to_json(&self) -> String {
        // A struct of strings and a unit enum cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Wrap this record as an assistant message.
    pub fn to_message(&self) -> Message {
        Message::assistant(self.to_json())
    }

    /// The content, or an empty string when absent.
    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

fn lenient_string(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    #[test]
    fn parse_plan_step() {
        let rec = StepRecord::parse(
            r#"{"step": "plan", "content": "The user is asking about useState."}"#,
        )
        .unwrap();
        assert_eq!(rec.step, Step::Plan);
        assert_eq!(rec.content_str(), "The user is asking about useState.");
        assert!(rec.function.is_none());
    }

    #[test]
    fn parse_action_without_content() {
        let rec = StepRecord::parse(
            r#"{"step": "action", "function": "ask_pdf", "input": "what is useState in React?"}"#,
        )
        .unwrap();
        assert_eq!(rec.step, Step::Action);
        assert!(rec.content.is_none());
        assert_eq!(rec.function.as_deref(), Some("ask_pdf"));
        assert_eq!(rec.input.as_deref(), Some("what is useState in React?"));
    }

    #[test]
    fn reserialization_omits_absent_fields() {
        let rec = StepRecord::parse(r#"{"step":"action","function":"ask_pdf","input":"q"}"#).unwrap();
        assert_eq!(rec.to_json(), r#"{"step":"action","function":"ask_pdf","input":"q"}"#);
    }

    #[test]
    fn observe_record_wire_format() {
        let msg = StepRecord::observe("chunk one\n\nchunk two").to_message();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, r#"{"step":"observe","content":"chunk one\n\nchunk two"}"#);
    }

    #[test]
    fn non_string_input_is_kept_as_json_text() {
        let rec = StepRecord::parse(r#"{"step":"action","function":"ask_pdf","input":{"q":"hooks"}}"#)
            .unwrap();
        assert_eq!(rec.input.as_deref(), Some(r#"{"q":"hooks"}"#));
    }

    #[test]
    fn null_fields_are_absent() {
        let rec = StepRecord::parse(r#"{"step":"output","content":"done","function":null}"#).unwrap();
        assert!(rec.function.is_none());
    }

    #[test]
    fn step_tag_is_case_insensitive() {
        let rec = StepRecord::parse(r#"{"step":"OUTPUT","content":"x"}"#).unwrap();
        assert_eq!(rec.step, Step::Output);
    }

    #[test]
    fn rejects_non_json() {
        let err = StepRecord::parse("Sure! Here is the answer.").unwrap_err();
        assert!(matches!(err, StepError::InvalidJson(_)));
    }

    #[test]
    fn rejects_json_array() {
        let err = StepRecord::parse(r#"["plan"]"#).unwrap_err();
        assert!(matches!(err, StepError::InvalidJson(_)));
    }

    #[test]
    fn rejects_unknown_step() {
        let err = StepRecord::parse(r#"{"step":"think","content":"hmm"}"#).unwrap_err();
        assert!(matches!(err, StepError::UnknownStep(ref tag) if tag == "think"));
    }

    #[test]
    fn rejects_missing_step() {
        let err = StepRecord::parse(r#"{"content":"no tag"}"#).unwrap_err();
        assert!(matches!(err, StepError::UnknownStep(_)));
    }
}
