//! Speech engines — the model seam behind the service endpoint.
//!
//! The engine is chosen once at startup and shared across requests; the
//! service never constructs one per call. [`WavetableEngine`] is the bundled
//! renderer: a deterministic tone-sequence voice that produces real WAV
//! audio without any model weights, keeping the service contract (speaker
//! set, fixed output path, wav bytes) fully exercisable.

use std::path::Path;

use anyhow::Context;

/// Sample rate of rendered audio.
const SAMPLE_RATE: u32 = 22_050;

/// Seconds per rendered character.
const SEGMENT_SECS: f32 = 0.045;

/// Upper bound on rendered audio length.
const MAX_SECS: f32 = 20.0;

/// A loaded speech model.
///
/// `render` is CPU-bound and synchronous; the service wraps calls in
/// `spawn_blocking` and serializes them on the fixed output path.
pub trait SpeechEngine: Send + Sync {
    /// Speaker identifiers this engine can voice.
    fn speakers(&self) -> &[String];

    /// Render `text` with `speaker` into a WAV file at `dest`.
    ///
    /// The speaker is validated by the service before this is called.
    fn render(&self, text: &str, speaker: &str, dest: &Path) -> anyhow::Result<()>;
}

/// Bundled wavetable renderer.
pub struct WavetableEngine {
    speakers: Vec<String>,
    speed: f32,
}

impl WavetableEngine {
    pub fn new() -> Self {
        Self {
            speakers: ["EN-US", "EN-BR", "EN_INDIA", "EN-AU", "EN-Default"]
                .into_iter()
                .map(String::from)
                .collect(),
            speed: 1.0,
        }
    }

    /// Base pitch per speaker — keeps distinct speakers audibly distinct.
    fn base_frequency(speaker: &str) -> f32 {
        match speaker {
            "EN-US" => 220.0,
            "EN-BR" => 196.0,
            "EN_INDIA" => 247.0,
            "EN-AU" => 175.0,
            _ => 210.0,
        }
    }
}

impl Default for WavetableEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechEngine for WavetableEngine {
    fn speakers(&self) -> &[String] {
        &self.speakers
    }

    fn render(&self, text: &str, speaker: &str, dest: &Path) -> anyhow::Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(dest, spec)
            .with_context(|| format!("creating wav file {}", dest.display()))?;

        let base = Self::base_frequency(speaker);
        let segment_samples = (SAMPLE_RATE as f32 * SEGMENT_SECS / self.speed) as u32;
        let max_samples = (SAMPLE_RATE as f32 * MAX_SECS) as u64;

        let mut written: u64 = 0;
        for byte in text.bytes() {
            if written >= max_samples {
                break;
            }
            // Whitespace renders as a short rest, everything else as a tone
            // offset from the speaker's base pitch.
            let amplitude = if byte.is_ascii_whitespace() { 0.0 } else { 0.4 };
            let freq = base + f32::from(byte % 32) * 8.0;

            for n in 0..segment_samples {
                let t = n as f32 / SAMPLE_RATE as f32;
                // Fade each segment in and out to avoid clicks.
                let envelope = (std::f32::consts::PI * n as f32 / segment_samples as f32).sin();
                let sample = (2.0 * std::f32::consts::PI * freq * t).sin() * amplitude * envelope;
                writer.write_sample((sample * f32::from(i16::MAX)) as i16)?;
            }
            written += u64::from(segment_samples);
        }

        writer.finalize().context("finalizing wav file")?;
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_set_contains_default() {
        let engine = WavetableEngine::new();
        assert!(engine.speakers().iter().any(|s| s == "EN-US"));
        assert!(engine.speakers().len() >= 4);
    }

    #[test]
    fn test_render_produces_readable_wav() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.wav");

        let engine = WavetableEngine::new();
        engine.render("hello world", "EN-US", &dest).unwrap();

        let reader = hound::WavReader::open(&dest).unwrap();
        assert_eq!(reader.spec().sample_rate, 22_050);
        assert_eq!(reader.spec().channels, 1);
        assert!(reader.len() > 0);
    }

    #[test]
    fn test_render_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");

        let engine = WavetableEngine::new();
        engine.render("same text", "EN-AU", &a).unwrap();
        engine.render("same text", "EN-AU", &b).unwrap();

        assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
    }

    #[test]
    fn test_render_caps_output_length() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("long.wav");

        let engine = WavetableEngine::new();
        let long_text = "a".repeat(10_000);
        engine.render(&long_text, "EN-US", &dest).unwrap();

        let reader = hound::WavReader::open(&dest).unwrap();
        let secs = reader.len() as f32 / reader.spec().sample_rate as f32;
        assert!(secs <= 21.0);
    }
}
