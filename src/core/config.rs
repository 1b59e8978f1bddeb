//! Runtime configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other.

use std::time::Duration;

/// Configuration for the demo pilot's timing and service limits
///
/// These values have been tuned against real page-load and speech pacing.
/// Changing them will affect how rushed or sluggish a demo feels.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    // === BROWSER TIMING ===
    /// Pause after a navigation before reading the page title
    ///
    /// Pages that render client-side need a moment before the title and
    /// DOM settle. Two seconds covers most demo sites without making
    /// every step feel slow.
    pub page_settle: Duration,

    /// Pause after scrolling an element into view before acting on it
    ///
    /// Clicking or typing mid-scroll misses the element on animated
    /// pages. Half a second is enough for smooth-scroll to finish.
    pub element_settle: Duration,

    /// Pause after submitting a login form before reading the landing page
    ///
    /// Login redirects are the slowest page transitions we perform, so
    /// this is longer than page_settle.
    pub login_settle: Duration,

    /// Seconds slept by the wait action when no duration was given
    pub default_wait_secs: f32,

    /// How many pixels a plain scroll up/down moves the viewport
    pub scroll_pixels: i32,

    // === DEMO PACING ===
    /// Seconds to linger on a demo step when the script gives no wait_time
    ///
    /// This is the window in which audience questions are received, so
    /// shortening it also shrinks the chance to interject.
    pub default_step_wait_secs: f32,

    /// Seconds to hold the floor for questions after the last step
    ///
    /// The countdown pauses while an answer is being delivered, so this
    /// bounds silence, not total Q&A time.
    pub final_question_window_secs: f32,

    /// Maximum questions queued while the sequencer is mid-step
    ///
    /// Further questions are refused with a spoken-style notice rather
    /// than silently dropped. Keeps one talkative viewer from building
    /// an unbounded backlog.
    pub question_capacity: usize,

    // === LLM LIMITS ===
    /// Token cap for a command-parsing completion
    ///
    /// Intent JSON is small; 1000 leaves headroom for chatty models that
    /// wrap the JSON in prose before we strip it.
    pub parse_max_tokens: u32,

    /// Token cap for a Q&A answer completion
    ///
    /// Answers are spoken aloud, so long ones stall the demo. 300 tokens
    /// is roughly twenty seconds of speech.
    pub answer_max_tokens: u32,

    /// Sampling temperature for all completions
    pub temperature: f32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            // Browser timing
            page_settle: Duration::from_secs(2),
            element_settle: Duration::from_millis(500),
            login_settle: Duration::from_secs(3),
            default_wait_secs: 2.0,
            scroll_pixels: 500,

            // Demo pacing
            default_step_wait_secs: 3.0,
            final_question_window_secs: 10.0,
            question_capacity: 4,

            // LLM limits
            parse_max_tokens: 1000,
            answer_max_tokens: 300,
            temperature: 0.7,
        }
    }
}

impl RuntimeConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.question_capacity == 0 {
            return Err("question_capacity must be at least 1".into());
        }

        if !self.default_wait_secs.is_finite()
            || !self.default_step_wait_secs.is_finite()
            || self.default_wait_secs <= 0.0
            || self.default_step_wait_secs <= 0.0
        {
            return Err("wait durations must be positive and finite".into());
        }

        // Sampling above 2.0 is rejected by both API formats we speak
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature ({}) must be within 0.0..=2.0",
                self.temperature
            ));
        }

        if self.answer_max_tokens > self.parse_max_tokens {
            return Err(format!(
                "answer_max_tokens ({}) should be <= parse_max_tokens ({})",
                self.answer_max_tokens, self.parse_max_tokens
            ));
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

/// Get the global runtime config (initializes with defaults if not set)
pub fn config() -> &'static RuntimeConfig {
    CONFIG.get_or_init(RuntimeConfig::default)
}

/// Set the global runtime config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: RuntimeConfig) -> std::result::Result<(), RuntimeConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(RuntimeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut cfg = RuntimeConfig::default();
        cfg.question_capacity = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_wild_temperature_rejected() {
        let mut cfg = RuntimeConfig::default();
        cfg.temperature = 3.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_non_finite_wait_rejected() {
        let mut cfg = RuntimeConfig::default();
        cfg.default_wait_secs = f32::INFINITY;
        assert!(cfg.validate().is_err());
    }
}
