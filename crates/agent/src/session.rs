//! A chat session: the transcript the agent sends to the model.

use askpdf_core::message::{Conversation, ConversationId, Message};

/// The conversation state of one interactive session.
///
/// Starts with the system prompt and only ever grows.
#[derive(Debug, Clone)]
pub struct Session {
    conversation: Conversation,
    turns: usize,
}

impl Session {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            conversation: Conversation::with_system_prompt(system_prompt),
            turns: 0,
        }
    }

    pub fn id(&self) -> &ConversationId {
        &self.conversation.id
    }

    /// Messages in the order they were appended, system prompt first.
    pub fn messages(&self) -> &[Message] {
        &self.conversation.messages
    }

    pub fn len(&self) -> usize {
        self.conversation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversation.is_empty()
    }

    /// Number of user questions asked so far.
    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn last(&self) -> Option<&Message> {
        self.conversation.last()
    }

    pub(crate) fn push_user(&mut self, content: impl Into<String>) {
        self.turns += 1;
        self.conversation.push(Message::user(content));
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.conversation.push(message);
    }
}

/// `exit` or `quit`, in any case, with surrounding whitespace ignored.
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}
