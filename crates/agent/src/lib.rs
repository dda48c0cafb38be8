//! The agent loop: plan, action, observe, output.
//!
//! For every user question the loop:
//!
//! 1. **Appends** the question to the session transcript
//! 2. **Asks the model** for one JSON step record (JSON mode)
//! 3. **Dispatches** on the step tag:
//!    - `plan`: report it and ask again
//!    - `action`: run the named tool, record an `observe` step, ask again
//!    - `output`: report the answer and end the turn
//! 4. **Stops** after `max_steps` model requests if no answer arrived
//!
//! Malformed replies and unknown tools are fed back to the model instead of
//! aborting the turn.

pub mod event;
pub mod loop_runner;
pub mod prompt;
pub mod repl;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use event::{AgentEvent, EventSink, NoopSink};
pub use loop_runner::{AgentLoop, TurnOutcome};
pub use prompt::system_prompt;
pub use repl::{ConsolePrinter, ReplStats, run_repl};
pub use session::{Session, is_exit_command};
