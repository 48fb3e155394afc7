//! Upstream API clients.
//!
//! One client per external collaborator: [`CastClient`] for the content
//! API and [`GeminiClient`] for the generative-language API. Both are
//! plain reqwest clients with a `with_base_url` constructor so tests
//! can point them at a mock server. Handlers depend on the
//! [`traits`] seams rather than the concrete clients.

pub mod casts;
pub mod gemini;
pub mod prompts;
pub mod traits;

pub use casts::CastClient;
pub use gemini::GeminiClient;
pub use traits::{CastApi, ModelApi};
