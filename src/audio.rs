use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::info;

use crate::config::{AudioConfig, ProcessingConfig};
use crate::error::FormatError;

/// Probed stream information for a normalized waveform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioInfo {
    pub duration: Duration,
    pub sample_rate: u32,
    pub channels: u32,
    pub codec: String,
    pub file_size: u64,
}

/// Decoder seam for container/codec handling. The production implementation
/// shells out to ffmpeg/ffprobe; tests inject a decoder that writes a
/// synthetic waveform.
#[async_trait]
pub trait AudioDecoder: Send + Sync {
    /// Decode `input` to a mono PCM WAV at `sample_rate` Hz written to `output`.
    async fn decode(
        &self,
        input: &Path,
        output: &Path,
        sample_rate: u32,
    ) -> Result<(), FormatError>;

    /// Inspect the first audio stream of `path`.
    async fn probe(&self, path: &Path) -> Result<AudioInfo, FormatError>;
}

/// ffmpeg/ffprobe-backed decoder
pub struct FfmpegDecoder;

#[async_trait]
impl AudioDecoder for FfmpegDecoder {
    async fn decode(
        &self,
        input: &Path,
        output: &Path,
        sample_rate: u32,
    ) -> Result<(), FormatError> {
        let result = tokio::process::Command::new("ffmpeg")
            .arg("-i")
            .arg(input)
            .arg("-vn") // No video stream
            .args(["-acodec", "pcm_s16le"]) // 16-bit PCM
            .args(["-ar", &sample_rate.to_string()])
            .args(["-ac", "1"]) // Mono channel
            .args(["-f", "wav"])
            .arg("-y") // Overwrite existing
            .arg(output)
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let message = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("unknown decode error")
                .to_string();
            return Err(FormatError::Decode(message));
        }

        Ok(())
    }

    async fn probe(&self, path: &Path) -> Result<AudioInfo, FormatError> {
        let output = tokio::process::Command::new("ffprobe")
            .args(["-v", "quiet"])
            .args(["-print_format", "json"])
            .arg("-show_format")
            .arg("-show_streams")
            .args(["-select_streams", "a:0"]) // First audio stream
            .arg(path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(FormatError::Probe(format!(
                "ffprobe failed for {}",
                path.display()
            )));
        }

        let data: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| FormatError::Probe(e.to_string()))?;

        let stream = data["streams"]
            .as_array()
            .and_then(|streams| streams.first())
            .ok_or_else(|| FormatError::Probe("no audio stream found".to_string()))?;

        let duration_seconds: f64 = data["format"]["duration"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        let file_size = tokio::fs::metadata(path).await?.len();

        Ok(AudioInfo {
            duration: Duration::from_secs_f64(duration_seconds),
            sample_rate: stream["sample_rate"]
                .as_str()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            channels: stream["channels"].as_u64().unwrap_or(1) as u32,
            codec: stream["codec_name"].as_str().unwrap_or("unknown").to_string(),
            file_size,
        })
    }
}

/// Canonical mono 16kHz waveform ready for recognition.
///
/// Owns the temporary directory holding the WAV; the file is removed when
/// this value is dropped, on every exit path.
pub struct NormalizedAudio {
    wav_path: PathBuf,
    info: AudioInfo,
    _workdir: TempDir,
}

impl NormalizedAudio {
    pub fn wav_path(&self) -> &Path {
        &self.wav_path
    }

    pub fn info(&self) -> &AudioInfo {
        &self.info
    }
}

/// Normalizes arbitrary audio/video containers to a canonical waveform
pub struct AudioNormalizer {
    decoder: Box<dyn AudioDecoder>,
    audio: AudioConfig,
    processing: ProcessingConfig,
}

impl AudioNormalizer {
    pub fn new(audio: AudioConfig, processing: ProcessingConfig) -> Self {
        Self::with_decoder(Box::new(FfmpegDecoder), audio, processing)
    }

    pub fn with_decoder(
        decoder: Box<dyn AudioDecoder>,
        audio: AudioConfig,
        processing: ProcessingConfig,
    ) -> Self {
        Self {
            decoder,
            audio,
            processing,
        }
    }

    /// Decode the input to a mono waveform at the configured sample rate.
    ///
    /// The extension is taken from the filename and must be in the
    /// configured allow-set. Any decode failure is fatal for the job.
    pub async fn normalize(&self, path: &Path) -> Result<NormalizedAudio, FormatError> {
        if !path.exists() {
            return Err(FormatError::MissingInput(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if !self
            .processing
            .supported_extensions
            .iter()
            .any(|allowed| *allowed == extension)
        {
            return Err(FormatError::UnsupportedFormat(extension));
        }

        let input_size = tokio::fs::metadata(path).await?.len();
        if self.processing.max_file_size > 0 && input_size > self.processing.max_file_size {
            return Err(FormatError::TooLarge(input_size));
        }

        info!("🎵 Normalizing input: {}", path.display());

        let workdir = TempDir::new()?;
        let wav_path = workdir
            .path()
            .join(format!("normalized.{}", self.audio.target_format));

        self.decoder
            .decode(path, &wav_path, self.audio.target_sample_rate)
            .await?;

        let info = self.decoder.probe(&wav_path).await?;

        info!(
            "✅ Normalized to {}Hz mono ({:.1}s, {} bytes)",
            info.sample_rate,
            info.duration.as_secs_f64(),
            info.file_size
        );

        Ok(NormalizedAudio {
            wav_path,
            info,
            _workdir: workdir,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a NormalizedAudio directly from raw samples, bypassing ffmpeg.
    pub(crate) fn wav_fixture(samples: &[i16], sample_rate: u32) -> NormalizedAudio {
        let workdir = TempDir::new().unwrap();
        let wav_path = workdir.path().join("normalized.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&wav_path, spec).unwrap();
        for sample in samples {
            writer.write_sample(*sample).unwrap();
        }
        writer.finalize().unwrap();

        let file_size = std::fs::metadata(&wav_path).unwrap().len();

        NormalizedAudio {
            wav_path,
            info: AudioInfo {
                duration: Duration::from_secs_f64(samples.len() as f64 / sample_rate as f64),
                sample_rate,
                channels: 1,
                codec: "pcm_s16le".to_string(),
                file_size,
            },
            _workdir: workdir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WavWritingDecoder;

    #[async_trait]
    impl AudioDecoder for WavWritingDecoder {
        async fn decode(
            &self,
            _input: &Path,
            output: &Path,
            sample_rate: u32,
        ) -> Result<(), FormatError> {
            let spec = hound::WavSpec {
                channels: 1,
                sample_rate,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };
            let mut writer = hound::WavWriter::create(output, spec)
                .map_err(|e| FormatError::Decode(e.to_string()))?;
            for i in 0..sample_rate {
                let sample = if i % 2 == 0 { 2000i16 } else { -2000i16 };
                writer
                    .write_sample(sample)
                    .map_err(|e| FormatError::Decode(e.to_string()))?;
            }
            writer
                .finalize()
                .map_err(|e| FormatError::Decode(e.to_string()))?;
            Ok(())
        }

        async fn probe(&self, path: &Path) -> Result<AudioInfo, FormatError> {
            let file_size = std::fs::metadata(path)?.len();
            Ok(AudioInfo {
                duration: Duration::from_secs(1),
                sample_rate: 16000,
                channels: 1,
                codec: "pcm_s16le".to_string(),
                file_size,
            })
        }
    }

    fn normalizer() -> AudioNormalizer {
        let config = crate::config::Config::default();
        AudioNormalizer::with_decoder(
            Box::new(WavWritingDecoder),
            config.audio,
            config.processing,
        )
    }

    #[tokio::test]
    async fn test_missing_input_rejected() {
        let result = normalizer().normalize(Path::new("/nonexistent/clip.mp3")).await;
        assert!(matches!(result, Err(FormatError::MissingInput(_))));
    }

    #[tokio::test]
    async fn test_unsupported_extension_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"not audio").unwrap();

        let result = normalizer().normalize(&path).await;
        match result {
            Err(FormatError::UnsupportedFormat(ext)) => assert_eq!(ext, "txt"),
            other => panic!("expected UnsupportedFormat, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_normalize_produces_wav() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"fake container").unwrap();

        let audio = normalizer().normalize(&path).await.unwrap();
        assert!(audio.wav_path().exists());
        assert_eq!(audio.info().sample_rate, 16000);
        assert_eq!(audio.info().channels, 1);
    }

    #[tokio::test]
    async fn test_temp_file_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.wav");
        std::fs::write(&path, b"fake container").unwrap();

        let audio = normalizer().normalize(&path).await.unwrap();
        let wav_path = audio.wav_path().to_path_buf();
        assert!(wav_path.exists());

        drop(audio);
        assert!(!wav_path.exists());
    }

    #[tokio::test]
    async fn test_oversize_input_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.wav");
        std::fs::write(&path, vec![0u8; 128]).unwrap();

        let config = crate::config::Config::default();
        let mut processing = config.processing;
        processing.max_file_size = 64;
        let normalizer =
            AudioNormalizer::with_decoder(Box::new(WavWritingDecoder), config.audio, processing);

        let result = normalizer.normalize(&path).await;
        assert!(matches!(result, Err(FormatError::TooLarge(128))));
    }
}
