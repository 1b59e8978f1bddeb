//! LLM integration for command parsing and question answering
//!
//! The pilot talks to an Anthropic- or OpenAI-compatible completion API
//! for two jobs: turning spoken commands into structured intents, and
//! answering audience questions about the product. Both degrade
//! gracefully when no API key is configured.

pub mod client;
pub mod context;
pub mod parser;
pub mod qa;

pub use client::{ApiFormat, LlmClient};
pub use context::{PageSummary, ProductContext};
pub use parser::{fallback_parse, normalize, IntentKind, IntentRecord};
pub use qa::QaAnswerer;
