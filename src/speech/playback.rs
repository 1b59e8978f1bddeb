//! PCM audio playback through the default output device
//!
//! Plays a synthesized clip and blocks until it finishes, so narration
//! stays in sync with what the browser is showing. The device rarely
//! runs at the clip's rate, so samples are resampled by linear
//! interpolation on the way out.

use crate::core::error::{DocentError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::time::Duration;

/// Play a raw PCM16 little-endian mono clip to completion
///
/// Blocks the calling thread for the clip's duration. Call from a
/// blocking task, not an async context.
pub fn play_pcm16(bytes: &[u8], sample_rate: u32) -> Result<()> {
    // A zero rate would make the clip duration infinite
    if sample_rate == 0 {
        return Err(DocentError::AudioError(
            "sample rate must be non-zero".to_string(),
        ));
    }
    if bytes.is_empty() {
        return Ok(());
    }

    let samples = decode_pcm16(bytes);
    let duration = Duration::from_secs_f64(samples.len() as f64 / sample_rate as f64)
        + Duration::from_millis(300);

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| DocentError::AudioError("no audio output device available".to_string()))?;

    tracing::debug!("audio output device: {}", device.name().unwrap_or_default());

    let supported = device
        .default_output_config()
        .map_err(|e| DocentError::AudioError(e.to_string()))?;

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => {
            build_stream::<f32>(&device, &supported.into(), samples, sample_rate)?
        }
        cpal::SampleFormat::I16 => {
            build_stream::<i16>(&device, &supported.into(), samples, sample_rate)?
        }
        _ => {
            return Err(DocentError::AudioError(
                "unsupported output sample format".to_string(),
            ))
        }
    };

    stream.play().map_err(|e| DocentError::AudioError(e.to_string()))?;

    // The stream renders on its own thread; hold this one until the
    // clip is done, then let the drop tear the stream down
    std::thread::sleep(duration);

    Ok(())
}

fn decode_pcm16(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / i16::MAX as f32)
        .collect()
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: Vec<f32>,
    src_rate: u32,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let step = src_rate as f64 / config.sample_rate.0 as f64;
    let mut pos = 0.0f64;

    let err_fn = |err| tracing::warn!("audio stream error: {}", err);

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &_| {
                for frame in data.chunks_mut(channels) {
                    let value = sample_at(&samples, pos);
                    for out in frame.iter_mut() {
                        *out = T::from_sample(value);
                    }
                    pos += step;
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| DocentError::AudioError(e.to_string()))
}

/// Source sample at a fractional position; silence past the end
fn sample_at(samples: &[f32], pos: f64) -> f32 {
    let i = pos as usize;
    if i + 1 < samples.len() {
        let frac = (pos - i as f64) as f32;
        samples[i] * (1.0 - frac) + samples[i + 1] * frac
    } else if i < samples.len() {
        samples[i]
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_clip_is_a_no_op() {
        assert!(play_pcm16(&[], 22_050).is_ok());
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let err = play_pcm16(&[0x00, 0x00], 0).unwrap_err();
        assert!(matches!(err, DocentError::AudioError(_)));
    }

    #[test]
    fn test_decode_pcm16() {
        // silence, full positive, -1
        let bytes = [0x00, 0x00, 0xFF, 0x7F, 0xFF, 0xFF];
        let samples = decode_pcm16(&bytes);
        assert_eq!(samples.len(), 3);
        assert!((samples[0] - 0.0).abs() < 0.001);
        assert!((samples[1] - 1.0).abs() < 0.001);
        assert!(samples[2] < 0.0);
    }

    #[test]
    fn test_decode_drops_trailing_odd_byte() {
        let samples = decode_pcm16(&[0x00, 0x00, 0x7F]);
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_sample_at_interpolates() {
        let samples = [0.0, 1.0];
        assert!((sample_at(&samples, 0.5) - 0.5).abs() < 0.001);
        assert!((sample_at(&samples, 0.0) - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_sample_at_past_end_is_silence() {
        let samples = [0.5, 0.5];
        assert!((sample_at(&samples, 5.0) - 0.0).abs() < 0.001);
    }
}
