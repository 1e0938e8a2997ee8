use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the voice translation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input validation settings
    pub processing: ProcessingConfig,

    /// Audio normalization settings
    pub audio: AudioConfig,

    /// Speech recognition backend settings
    pub recognition: RecognitionConfig,

    /// Translation backend settings
    pub translation: TranslationConfig,

    /// Speech synthesis backend settings
    pub synthesis: SynthesisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Supported audio/video container extensions
    pub supported_extensions: Vec<String>,

    /// Maximum input file size in bytes (0 = no limit)
    pub max_file_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Target sample rate for recognition
    pub target_sample_rate: u32,

    /// Target audio format for the normalized waveform
    pub target_format: String,

    /// Leading window used for ambient-noise calibration (seconds).
    /// Values below 0.5 are raised to 0.5 at use sites.
    pub calibration_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Recognition service endpoint
    pub endpoint: String,

    /// API key for the recognition service
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Default source language when a job does not specify one
    pub default_source_lang: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Translation service endpoint
    pub endpoint: String,

    /// API key for the translation service
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Maximum characters per translation request
    pub chunk_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Synthesis service endpoint
    pub endpoint: String,

    /// API key for the synthesis service
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Directory for synthesized audio artifacts
    pub output_dir: PathBuf,

    /// Artifact container format
    pub output_format: String,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "voice-translator.toml",
            "config/voice-translator.toml",
            "~/.config/voice-translator/config.toml",
            "/etc/voice-translator/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) {
        if let Ok(rate) = std::env::var("VOICE_TRANSLATOR_SAMPLE_RATE") {
            self.audio.target_sample_rate = rate.parse().unwrap_or(self.audio.target_sample_rate);
        }

        if let Ok(endpoint) = std::env::var("VOICE_TRANSLATOR_RECOGNITION_ENDPOINT") {
            self.recognition.endpoint = endpoint;
        }

        if let Ok(endpoint) = std::env::var("VOICE_TRANSLATOR_TRANSLATION_ENDPOINT") {
            self.translation.endpoint = endpoint;
        }

        if let Ok(endpoint) = std::env::var("VOICE_TRANSLATOR_SYNTHESIS_ENDPOINT") {
            self.synthesis.endpoint = endpoint;
        }

        if let Ok(api_key) = std::env::var("VOICE_TRANSLATOR_API_KEY") {
            self.recognition.api_key = Some(api_key.clone());
            self.translation.api_key = Some(api_key.clone());
            self.synthesis.api_key = Some(api_key);
        }

        if let Ok(output_dir) = std::env::var("VOICE_TRANSLATOR_OUTPUT_DIR") {
            self.synthesis.output_dir = PathBuf::from(output_dir);
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration once at startup
    pub fn validate(&self) -> Result<()> {
        if self.audio.target_sample_rate == 0 {
            return Err(anyhow!("target_sample_rate must be greater than 0"));
        }

        if self.translation.chunk_limit == 0 {
            return Err(anyhow!("chunk_limit must be greater than 0"));
        }

        if self.processing.supported_extensions.is_empty() {
            return Err(anyhow!("supported_extensions must not be empty"));
        }

        for endpoint in [
            &self.recognition.endpoint,
            &self.translation.endpoint,
            &self.synthesis.endpoint,
        ] {
            if endpoint.is_empty() {
                return Err(anyhow!("backend endpoints must not be empty"));
            }
        }

        if !self.synthesis.output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&self.synthesis.output_dir) {
                return Err(anyhow!("Cannot create output directory: {}", e));
            }
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Voice Translator Configuration:\n\
            - Audio Sample Rate: {}Hz\n\
            - Calibration Window: {:.1}s\n\
            - Translation Chunk Limit: {} chars\n\
            - Output Directory: {}\n\
            - Output Format: {}\n\
            - Supported Extensions: {}",
            self.audio.target_sample_rate,
            self.audio.calibration_secs,
            self.translation.chunk_limit,
            self.synthesis.output_dir.display(),
            self.synthesis.output_format,
            self.processing.supported_extensions.join(", ")
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processing: ProcessingConfig {
                supported_extensions: vec![
                    "mp3".to_string(),
                    "wav".to_string(),
                    "m4a".to_string(),
                    "ogg".to_string(),
                    "flac".to_string(),
                    "mp4".to_string(),
                    "avi".to_string(),
                    "mov".to_string(),
                    "mkv".to_string(),
                    "webm".to_string(),
                ],
                max_file_size: 50 * 1024 * 1024, // 50MB
            },
            audio: AudioConfig {
                target_sample_rate: 16000, // Optimal for recognition backends
                target_format: "wav".to_string(),
                calibration_secs: 0.5,
            },
            recognition: RecognitionConfig {
                endpoint: "http://localhost:8085/v1/recognize".to_string(),
                api_key: None,
                timeout_seconds: 60,
                default_source_lang: "en".to_string(),
            },
            translation: TranslationConfig {
                endpoint: "http://localhost:8086/translate".to_string(),
                api_key: None,
                timeout_seconds: 30,
                chunk_limit: 5000, // Backend request-size limit
            },
            synthesis: SynthesisConfig {
                endpoint: "http://localhost:8087/v1/speech".to_string(),
                api_key: None,
                timeout_seconds: 60,
                output_dir: PathBuf::from("./output"),
                output_format: "mp3".to_string(),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.config.audio.target_sample_rate = sample_rate;
        self
    }

    pub fn with_chunk_limit(mut self, chunk_limit: usize) -> Self {
        self.config.translation.chunk_limit = chunk_limit;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.synthesis.output_dir = dir;
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.recognition.api_key = Some(api_key.clone());
        self.config.translation.api_key = Some(api_key.clone());
        self.config.synthesis.api_key = Some(api_key);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.audio.target_sample_rate, 16000);
        assert_eq!(config.translation.chunk_limit, 5000);
        assert_eq!(config.synthesis.output_format, "mp3");
        assert!(config
            .processing
            .supported_extensions
            .contains(&"mp4".to_string()));
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_sample_rate(8000)
            .with_chunk_limit(100)
            .with_api_key("secret".to_string())
            .build();

        assert_eq!(config.audio.target_sample_rate, 8000);
        assert_eq!(config.translation.chunk_limit, 100);
        assert_eq!(config.translation.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_config_validation() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigBuilder::new()
            .with_output_dir(dir.path().to_path_buf())
            .build();
        assert!(config.validate().is_ok());

        let mut broken = config.clone();
        broken.translation.chunk_limit = 0;
        assert!(broken.validate().is_err());
    }
}
