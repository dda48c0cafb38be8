//! Interactive terminal chat: read a question, run a turn, print progress.

use crate::event::{AgentEvent, EventSink};
use crate::loop_runner::{AgentLoop, TurnOutcome};
use crate::session::{Session, is_exit_command};
use std::io::Write;
use std::sync::Mutex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

pub const PROMPT: &str = "Ask Your Question Here > ";

/// Prints agent events as chat output.
pub struct ConsolePrinter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> ConsolePrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn prompt(&self) {
        self.write(PROMPT, false);
    }

    pub fn line(&self, text: &str) {
        self.write(text, true);
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self, text: &str, newline: bool) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // A closed stdout is not worth failing the turn over.
        let _ = if newline {
            writeln!(out, "{text}")
        } else {
            write!(out, "{text}")
        };
        let _ = out.flush();
    }
}

impl<W: Write + Send> EventSink for ConsolePrinter<W> {
    fn on_event(&self, event: &AgentEvent) {
        match event {
            AgentEvent::Plan { content } => self.line(&format!("🧠 Plan: {content}")),
            AgentEvent::ToolCall { name, input } => {
                self.line(&format!("🔨 Tool Called: {name} {input}"))
            }
            AgentEvent::Observation { name, content } => {
                debug!(tool = %name, chars = content.len(), "Observation recorded");
            }
            AgentEvent::ToolFailed { name, error } => {
                self.line(&format!("⚠️  Tool {name} failed: {error}"))
            }
            AgentEvent::UnknownTool { name } => {
                self.line(&format!("⚠️  Model asked for unknown tool '{name}'"))
            }
            AgentEvent::MalformedReply { reason, .. } => {
                self.line(&format!("⚠️  Unusable reply ({reason}), asking again"))
            }
            AgentEvent::Answer { content } => self.line(&format!("🤖 Answer: {content}")),
            AgentEvent::StepLimitReached { steps } => {
                self.line(&format!("⚠️  No answer after {steps} steps, ask again or rephrase"))
            }
        }
    }
}

/// Counts from one chat session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplStats {
    pub questions: usize,
    pub answers: usize,
    pub errors: usize,
    pub cancelled: usize,
}

/// Run the chat loop until `exit`/`quit`, end of input, or Ctrl+C at the prompt.
///
/// Ctrl+C during a turn abandons that turn and returns to the prompt.
/// Errors from a turn are printed and the loop continues.
pub async fn run_repl<R, W>(
    agent: &AgentLoop,
    session: &mut Session,
    input: R,
    printer: &ConsolePrinter<W>,
) -> std::io::Result<ReplStats>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    let mut lines = input.lines();
    let mut stats = ReplStats::default();

    loop {
        printer.prompt();

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                printer.line("");
                None
            }
        };

        let Some(line) = line else {
            break;
        };

        if is_exit_command(&line) {
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        stats.questions += 1;

        tokio::select! {
            result = agent.process(session, question, printer) => match result {
                Ok(TurnOutcome::Answer(_)) => stats.answers += 1,
                Ok(TurnOutcome::StepLimitReached { .. }) => {}
                Err(e) => {
                    stats.errors += 1;
                    printer.line(&format!("❌ Error: {e}"));
                }
            },
            _ = tokio::signal::ctrl_c() => {
                stats.cancelled += 1;
                printer.line("\n⚠️  Cancelled");
            }
        }
    }

    info!(
        conversation_id = %session.id(),
        questions = stats.questions,
        answers = stats.answers,
        "Chat session ended"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingProvider, RecordingTool, ScriptedProvider};
    use askpdf_core::ToolRegistry;
    use std::sync::Arc;

    const OUTPUT: &str = r#"{"step":"output","content":"Hello there."}"#;

    fn agent(provider: Arc<dyn askpdf_core::Provider>) -> AgentLoop {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(RecordingTool::ask_pdf("ctx")));
        AgentLoop::new(provider, "gpt-4o", 1.0, Arc::new(registry))
    }

    async fn run(agent: &AgentLoop, input: &str) -> (ReplStats, String, Session) {
        let mut session = agent.new_session();
        let printer = ConsolePrinter::new(Vec::new());
        let stats = run_repl(agent, &mut session, input.as_bytes(), &printer)
            .await
            .unwrap();
        let out = String::from_utf8(printer.into_inner()).unwrap();
        (stats, out, session)
    }

    #[tokio::test]
    async fn exit_stops_without_model_calls() {
        for word in ["exit\n", "QUIT\n", "  Exit  \n"] {
            let provider = Arc::new(ScriptedProvider::new(Vec::<String>::new()));
            let agent = agent(provider.clone());
            let (stats, out, session) = run(&agent, &format!("{word}What is useState?\n")).await;

            assert_eq!(provider.call_count(), 0);
            assert_eq!(stats.questions, 0);
            assert_eq!(session.len(), 1);
            assert_eq!(out, PROMPT);
        }
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let provider = Arc::new(ScriptedProvider::new([OUTPUT]));
        let agent = agent(provider.clone());
        let (stats, out, _) = run(&agent, "\n   \nhello\nexit\n").await;

        assert_eq!(stats.questions, 1);
        assert_eq!(stats.answers, 1);
        assert_eq!(provider.call_count(), 1);
        assert!(out.contains("🤖 Answer: Hello there.\n"));
        assert_eq!(out.matches(PROMPT).count(), 4);
    }

    #[tokio::test]
    async fn end_of_input_ends_session() {
        let provider = Arc::new(ScriptedProvider::new([OUTPUT]));
        let agent = agent(provider.clone());
        let (stats, _, _) = run(&agent, "hello").await;
        assert_eq!(stats.answers, 1);
    }

    #[tokio::test]
    async fn errors_are_printed_and_loop_continues() {
        let agent = agent(Arc::new(FailingProvider));
        let (stats, out, session) = run(&agent, "one\ntwo\nexit\n").await;

        assert_eq!(stats.questions, 2);
        assert_eq!(stats.errors, 2);
        assert_eq!(out.matches("❌ Error: Provider error: Network error: connection refused").count(), 2);
        assert_eq!(session.turns(), 2);
    }

    #[test]
    fn printer_formats_events() {
        let printer = ConsolePrinter::new(Vec::new());
        printer.on_event(&AgentEvent::Plan { content: "search".into() });
        printer.on_event(&AgentEvent::ToolCall {
            name: "ask_pdf".into(),
            input: "what is useState in React?".into(),
        });
        printer.on_event(&AgentEvent::Observation { name: "ask_pdf".into(), content: "ctx".into() });
        printer.on_event(&AgentEvent::Answer { content: "A hook.".into() });

        let out = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(
            out,
            "🧠 Plan: search\n🔨 Tool Called: ask_pdf what is useState in React?\n🤖 Answer: A hook.\n"
        );
    }
}
