//! Tool trait: the abstraction over agent capabilities.
//!
//! A tool takes one string argument chosen by the model and returns a
//! string the agent records as an observation. The registry is built once
//! at startup and shared read-only with the agent loop.

use crate::error::ToolError;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name the model uses to call this tool (e.g., "ask_pdf").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// Run the tool with the model-supplied input.
    async fn call(&self, input: &str) -> std::result::Result<String, ToolError>;
}

/// A registry of available tools, keyed by name.
///
/// The agent loop uses this to:
/// 1. List tool descriptions for the system prompt
/// 2. Look up and run tools when the model emits an `action` step
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// `(name, description)` pairs in name order.
    pub fn descriptions(&self) -> Vec<(&str, &str)> {
        self.tools
            .iter()
            .map(|(name, tool)| (name.as_str(), tool.description()))
            .collect()
    }

    /// Run the named tool.
    pub async fn execute(&self, name: &str, input: &str) -> std::result::Result<String, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.call(input).await
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
