use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::audio::NormalizedAudio;
use crate::config::RecognitionConfig;
use crate::error::ExtractionError;
use crate::languages;

/// Calibration window is never shorter than this, even if configured lower.
const MIN_CALIBRATION_SECS: f64 = 0.5;

/// Baseline energy threshold for very quiet captures.
const ENERGY_FLOOR: f64 = 300.0;

/// Speech must rise this far above the ambient level to count as signal.
const NOISE_RATIO: f64 = 1.5;

/// Frame length used when scanning the signal for speech energy.
const FRAME_SECS: f64 = 0.1;

/// Energy threshold derived from the leading ambient-noise window
#[derive(Debug, Clone, Copy)]
pub struct NoiseProfile {
    pub energy_threshold: f64,
}

impl NoiseProfile {
    /// Derive a threshold from the ambient samples of the leading window.
    pub fn calibrate(ambient: &[i16]) -> Self {
        Self {
            energy_threshold: (rms(ambient) * NOISE_RATIO).max(ENERGY_FLOOR),
        }
    }
}

fn rms(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|s| (*s as f64) * (*s as f64)).sum();
    (sum / samples.len() as f64).sqrt()
}

/// Number of leading samples consumed by calibration.
pub fn calibration_window(sample_rate: u32, window_secs: f64, total: usize) -> usize {
    let secs = window_secs.max(MIN_CALIBRATION_SECS);
    ((secs * sample_rate as f64) as usize).min(total)
}

/// Scan the signal in short frames for any energy above the threshold.
pub fn has_speech(signal: &[i16], sample_rate: u32, profile: &NoiseProfile) -> bool {
    let frame = ((FRAME_SECS * sample_rate as f64) as usize).max(1);
    signal
        .chunks(frame)
        .any(|chunk| rms(chunk) > profile.energy_threshold)
}

/// Recognition backend seam. `Ok(None)` means the backend understood the
/// audio but produced no confident hypothesis.
#[async_trait]
pub trait RecognitionBackend: Send + Sync {
    async fn recognize(
        &self,
        wav_path: &Path,
        locale: &str,
    ) -> Result<Option<String>, ExtractionError>;
}

/// HTTP recognition backend: uploads the normalized WAV as a multipart form
pub struct HttpRecognizer {
    config: RecognitionConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    transcript: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
}

impl HttpRecognizer {
    pub fn new(config: RecognitionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl RecognitionBackend for HttpRecognizer {
    async fn recognize(
        &self,
        wav_path: &Path,
        locale: &str,
    ) -> Result<Option<String>, ExtractionError> {
        let bytes = tokio::fs::read(wav_path).await?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| ExtractionError::ServiceUnavailable(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("audio", part)
            .text("language", locale.to_string());

        let mut request = self.client.post(&self.config.endpoint).multipart(form);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        debug!("Sending recognition request to {}", self.config.endpoint);

        let response = request
            .send()
            .await
            .map_err(|e| ExtractionError::ServiceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::ServiceUnavailable(format!(
                "{}: {}",
                status, text
            )));
        }

        let parsed: RecognitionResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::ServiceUnavailable(e.to_string()))?;

        debug!("Recognition confidence: {:?}", parsed.confidence);

        Ok(parsed.transcript)
    }
}

/// Converts a normalized waveform into plain text
pub struct SpeechExtractor {
    backend: Box<dyn RecognitionBackend>,
    calibration_secs: f64,
}

impl SpeechExtractor {
    pub fn new(config: RecognitionConfig, calibration_secs: f64) -> Result<Self> {
        let backend = Box::new(HttpRecognizer::new(config)?);
        Ok(Self::with_backend(backend, calibration_secs))
    }

    pub fn with_backend(backend: Box<dyn RecognitionBackend>, calibration_secs: f64) -> Self {
        Self {
            backend,
            calibration_secs,
        }
    }

    /// Extract spoken text from the normalized waveform.
    ///
    /// Calibrates on the leading ambient window first; a capture whose
    /// signal never rises above the ambient threshold is reported as
    /// `Unintelligible` without a backend call.
    pub async fn extract(
        &self,
        audio: &NormalizedAudio,
        source_lang: &str,
    ) -> Result<String, ExtractionError> {
        let mut reader = hound::WavReader::open(audio.wav_path())?;
        let sample_rate = reader.spec().sample_rate;
        let samples: Vec<i16> = reader.samples::<i16>().collect::<Result<_, _>>()?;

        let window = calibration_window(sample_rate, self.calibration_secs, samples.len());
        let profile = NoiseProfile::calibrate(&samples[..window]);
        let signal = &samples[window..];

        debug!(
            "Calibrated over {} samples, energy threshold {:.1}",
            window, profile.energy_threshold
        );

        if !has_speech(signal, sample_rate, &profile) {
            debug!("No frame above ambient threshold, skipping backend call");
            return Err(ExtractionError::Unintelligible);
        }

        let locale = languages::locale_tag(source_lang);
        info!("🎤 Recognizing speech (locale: {})", locale);

        match self.backend.recognize(audio.wav_path(), &locale).await? {
            Some(text) if !text.trim().is_empty() => {
                info!("📝 Recognized {} characters", text.len());
                Ok(text)
            }
            _ => Err(ExtractionError::Unintelligible),
        }
    }
}
