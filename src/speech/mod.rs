//! Voice narration: synthesis, playback, and the narrator over both

pub mod narrator;
pub mod playback;
pub mod synth;

pub use narrator::Narrator;
pub use synth::{SpeechClient, TTS_SAMPLE_RATE};
