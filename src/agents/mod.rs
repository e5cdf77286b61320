//! Fixed-prompt text analyses over a transcript.
//!
//! Each agent is one chat-completion call with a canned system prompt and
//! fixed sampling parameters. Mood is the paid analysis; sentiment and
//! summary are free.

mod kind;
mod run;

pub use kind::AgentKind;
pub use run::{analyze, AgentOutcome};
