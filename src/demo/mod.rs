//! Scripted product demos
//!
//! Demo scripts are data (`script`), collected in a library
//! (`library`), and run by the sequencer (`sequencer`), which owns the
//! browser for the duration of a run.

pub mod library;
pub mod script;
pub mod sequencer;

pub use library::ConfigLibrary;
pub use script::{sample_product, Credentials, DemoStep, PageRoute, ProductConfig, StepAction};
pub use sequencer::{AnsweredQuestion, DemoReport, DemoSequencer, StepOutcome};
