//! Copy generation for the adaptive landing service.
//!
//! A [`TextGenerator`] (Gemini in production) drafts hero variants, landing
//! builds and persona pages. Answers are fence-stripped, parsed and
//! validated; anything unusable falls back to the heuristic generators.

pub mod agent;
pub mod config;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod parse;
pub mod prompt;

pub use agent::*;
pub use config::AiConfig;
pub use error::{AiFailure, GenerationError};
pub use gemini::GeminiClient;
pub use generator::TextGenerator;
pub use parse::strip_code_fences;
