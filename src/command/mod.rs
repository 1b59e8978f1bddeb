//! Command execution pipeline
//!
//! Converts parsed intent records into executed browser actions:
//! IntentRecord -> resolve -> ResolvedAction -> CommandExecutor -> ActionResult

pub mod executor;
pub mod resolver;
pub mod rules;

pub use executor::{apologize, ActionResult, CommandExecutor};
pub use resolver::{resolve, ResolvedAction, ScrollDirection};
pub use rules::{AnswerRules, KeywordTable, RuleBook, UrlRules};
