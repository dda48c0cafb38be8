//! The system prompt that teaches the model the step protocol.

use askpdf_core::tool::ToolRegistry;
use serde::Serialize;

const PREAMBLE: &str = "\
You are a helpful assistant who solves user queries using available tools.
You operate in a loop: plan → action → observe → output.

Rules:
- Only do one step at a time.
- Always follow the JSON format.
- Use a tool when needed.
- Wait for tool result (observe) before final answer.
";

/// The JSON shape every reply must have. Also used to correct the model.
pub const JSON_FORMAT: &str = r#"{
    "step": "plan" | "action" | "observe" | "output",
    "content": "your explanation or result",
    "function": "tool name if step is 'action'",
    "input": "input for the tool"
}"#;

const EXAMPLE: &str = r#"Example:
User: What is useState?

1. Plan:
{ "step": "plan", "content": "The user is asking about useState. I will search in the PDF using ask_pdf." }

2. Action:
{ "step": "action", "function": "ask_pdf", "input": "what is useState in React?" }

3. Observe:
{ "step": "observe", "content": "React's useState is a hook that lets you..." }

4. Output:
{ "step": "output", "content": "The useState hook lets you add state to functional components..." }
"#;

/// Build the system prompt for the tools in `registry`.
pub fn system_prompt(registry: &ToolRegistry) -> String {
    format!(
        "\n{PREAMBLE}\nJSON Output Format:\n{JSON_FORMAT}\n\nAvailable Tools:\n{}\n\n{EXAMPLE}",
        tool_map(registry)
    )
}

/// `{name: description}` for every tool, pretty-printed with 4-space indent.
fn tool_map(registry: &ToolRegistry) -> String {
    let map: serde_json::Map<String, serde_json::Value> = registry
        .descriptions()
        .into_iter()
        .map(|(name, description)| (name.to_string(), description.into()))
        .collect();

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if map.serialize(&mut ser).is_err() {
        return "{}".into();
    }
    String::from_utf8(buf).unwrap_or_else(|_| "{}".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::RecordingTool;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(RecordingTool::ask_pdf("")));
        registry
    }

    #[test]
    fn lists_tools_with_four_space_indent() {
        let prompt = system_prompt(&registry());
        assert!(prompt.contains(
            "Available Tools:\n{\n    \"ask_pdf\": \"Takes a question and answers it using the uploaded PDF data.\"\n}"
        ));
    }

    #[test]
    fn contains_rules_format_and_example() {
        let prompt = system_prompt(&registry());
        assert!(prompt.contains("You operate in a loop: plan → action → observe → output."));
        assert!(prompt.contains("- Wait for tool result (observe) before final answer."));
        assert!(prompt.contains(r#""step": "plan" | "action" | "observe" | "output","#));
        assert!(prompt.contains(r#"{ "step": "action", "function": "ask_pdf", "input": "what is useState in React?" }"#));
    }

    #[test]
    fn empty_registry_renders_empty_map() {
        let prompt = system_prompt(&ToolRegistry::new());
        assert!(prompt.contains("Available Tools:\n{}"));
    }
}
