//! Text-to-speech synthesis over the ElevenLabs API
//!
//! Sends narration text to the API and gets raw PCM16 audio back,
//! ready for the playback path. The client is a thin wrapper over
//! reqwest; credentials and endpoint come from the environment.

use crate::core::error::{DocentError, Result};
use serde::Serialize;
use std::env;

/// Sample rate of the PCM audio the API returns
pub const TTS_SAMPLE_RATE: u32 = 22_050;

const DEFAULT_API_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech";
const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
const MODEL_ID: &str = "eleven_monolingual_v1";

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// Client for the speech synthesis API
#[derive(Clone)]
pub struct SpeechClient {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    voice_id: String,
}

impl SpeechClient {
    pub fn new(api_key: String, api_url: String, voice_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_url,
            voice_id,
        }
    }

    /// Create a client from environment variables
    ///
    /// Requires `TTS_API_KEY`. `TTS_API_URL` and `TTS_VOICE_ID` are
    /// optional and default to the ElevenLabs endpoint and a stock
    /// voice.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("TTS_API_KEY")
            .map_err(|_| DocentError::SpeechError("TTS_API_KEY not set".to_string()))?;
        let api_url = env::var("TTS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let voice_id = env::var("TTS_VOICE_ID").unwrap_or_else(|_| DEFAULT_VOICE_ID.to_string());

        Ok(Self::new(api_key, api_url, voice_id))
    }

    /// Synthesize text into raw PCM16 mono audio at `TTS_SAMPLE_RATE`
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}/{}?output_format=pcm_22050",
            self.api_url, self.voice_id
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&SynthesisRequest {
                text,
                model_id: MODEL_ID,
            })
            .send()
            .await
            .map_err(|e| DocentError::SpeechError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DocentError::SpeechError(format!(
                "speech API returned {}: {}",
                status, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DocentError::SpeechError(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SpeechClient::new(
            "test-key".to_string(),
            DEFAULT_API_URL.to_string(),
            DEFAULT_VOICE_ID.to_string(),
        );
        assert_eq!(client.voice_id, DEFAULT_VOICE_ID);
    }

    #[test]
    fn test_from_env_missing_key() {
        env::remove_var("TTS_API_KEY");
        assert!(SpeechClient::from_env().is_err());
    }
}
