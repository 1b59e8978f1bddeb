//! Spoken narration with a print fallback
//!
//! Everything the pilot says goes through the narrator. With a speech
//! API configured it synthesizes and plays audio; without one, or when
//! the audio path fails mid-demo, it prints the line instead. Narration
//! never fails and never goes silent.

use crate::speech::playback::play_pcm16;
use crate::speech::synth::{SpeechClient, TTS_SAMPLE_RATE};

pub struct Narrator {
    synth: Option<SpeechClient>,
}

impl Narrator {
    /// Build a narrator from the environment
    ///
    /// With `muted` set, or with no `TTS_API_KEY` configured, narration
    /// prints to the console instead of speaking.
    pub fn from_env(muted: bool) -> Self {
        if muted {
            return Self { synth: None };
        }

        let synth = match SpeechClient::from_env() {
            Ok(client) => Some(client),
            Err(_) => {
                tracing::warn!("TTS_API_KEY not set - narration will print instead of speak");
                None
            }
        };

        Self { synth }
    }

    /// A narrator that only prints, for tests
    pub fn silent() -> Self {
        Self { synth: None }
    }

    pub fn has_voice(&self) -> bool {
        self.synth.is_some()
    }

    /// Say one line, blocking until the audio finishes
    ///
    /// Synthesis or playback failures fall back to printing the line,
    /// so the demo keeps moving either way.
    pub async fn narrate(&self, text: &str) {
        tracing::debug!("narrate: {}", text);

        let Some(synth) = &self.synth else {
            println!("{}", text);
            return;
        };

        let audio = match synth.synthesize(text).await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::warn!("speech synthesis failed: {}", e);
                println!("{}", text);
                return;
            }
        };

        let played =
            tokio::task::spawn_blocking(move || play_pcm16(&audio, TTS_SAMPLE_RATE)).await;

        match played {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!("audio playback failed: {}", e);
                println!("{}", text);
            }
            Err(e) => {
                tracing::warn!("audio playback task failed: {}", e);
                println!("{}", text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_silent_narrator_completes() {
        let narrator = Narrator::silent();
        assert!(!narrator.has_voice());
        // Prints instead of speaking; must not hang or panic
        narrator.narrate("hello").await;
    }

    #[test]
    fn test_muted_from_env_has_no_voice() {
        let narrator = Narrator::from_env(true);
        assert!(!narrator.has_voice());
    }
}
