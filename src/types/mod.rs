//! Core types: requests, results, and cast content.

pub mod cast;
pub mod request;
pub mod result;

pub use cast::{Assets, Cast, Embed};
pub use request::{ChatTurn, LlmRequest, Mode, TurnRole};
pub use result::{ChatReply, Explanation, GlossaryEntry, LlmResult, Translation};
