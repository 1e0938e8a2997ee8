use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SynthesisConfig;
use crate::error::SynthesisError;
use crate::translation::{ERROR_MARKER_PREFIX, NOTHING_TO_TRANSLATE};

/// Synthesis backend seam: renders text to audio bytes
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, SynthesisError>;
}

/// HTTP synthesis backend
pub struct HttpSpeechBackend {
    config: SynthesisConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    lang: &'a str,
}

impl HttpSpeechBackend {
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl SynthesisBackend for HttpSpeechBackend {
    async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, SynthesisError> {
        let request = SynthesisRequest { text, lang };

        let mut builder = self.client.post(&self.config.endpoint).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        debug!("Sending synthesis request to {}", self.config.endpoint);

        let response = builder
            .send()
            .await
            .map_err(|e| SynthesisError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Backend(format!("{}: {}", status, text)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Backend(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

/// Renders target-language text into an audio artifact on disk
pub struct SpeechSynthesizer {
    backend: Box<dyn SynthesisBackend>,
    output_dir: PathBuf,
    output_format: String,
}

impl SpeechSynthesizer {
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        let output_dir = config.output_dir.clone();
        let output_format = config.output_format.clone();
        let backend = Box::new(HttpSpeechBackend::new(config)?);
        Ok(Self::with_backend(backend, output_dir, output_format))
    }

    pub fn with_backend(
        backend: Box<dyn SynthesisBackend>,
        output_dir: PathBuf,
        output_format: String,
    ) -> Self {
        Self {
            backend,
            output_dir,
            output_format,
        }
    }

    /// Collision-free artifact name: language code plus a random identifier.
    pub fn unique_filename(&self, lang: &str) -> String {
        format!("{}_{}.{}", lang, Uuid::new_v4(), self.output_format)
    }

    /// Synthesize speech for `text`, returning the artifact path or `None`
    /// on failure. Synthesis failure is never fatal to the job.
    ///
    /// Empty input, the nothing-to-translate sentinel, and error markers
    /// produce `None` without a backend call or any filesystem write.
    pub async fn synthesize(&self, text: &str, target_lang: &str) -> Option<PathBuf> {
        if text.trim().is_empty()
            || text.starts_with(ERROR_MARKER_PREFIX)
            || text == NOTHING_TO_TRANSLATE
        {
            debug!("Nothing to synthesize, skipping backend call");
            return None;
        }

        match self.try_synthesize(text, target_lang).await {
            Ok(path) => {
                info!("🔊 Synthesized speech artifact: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Speech synthesis failed: {}", e);
                None
            }
        }
    }

    async fn try_synthesize(&self, text: &str, target_lang: &str) -> Result<PathBuf, SynthesisError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let bytes = self.backend.synthesize(text, target_lang).await?;
        if bytes.is_empty() {
            return Err(SynthesisError::Backend("empty audio response".to_string()));
        }

        let final_path = self.output_dir.join(self.unique_filename(target_lang));

        // Stage in the output directory, then rename: the artifact appears
        // complete or not at all.
        let mut staged = tempfile::NamedTempFile::new_in(&self.output_dir)?;
        staged.write_all(&bytes)?;
        staged.flush()?;
        staged
            .persist(&final_path)
            .map_err(|e| SynthesisError::Io(e.error))?;

        Ok(final_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct StubBackend {
        bytes: Vec<u8>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SynthesisBackend for StubBackend {
        async fn synthesize(&self, _text: &str, _lang: &str) -> Result<Vec<u8>, SynthesisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.bytes.clone())
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl SynthesisBackend for FailingBackend {
        async fn synthesize(&self, _text: &str, _lang: &str) -> Result<Vec<u8>, SynthesisError> {
            Err(SynthesisError::Backend("service offline".to_string()))
        }
    }

    fn synthesizer(dir: &TempDir) -> (SpeechSynthesizer, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = StubBackend {
            bytes: b"ID3fake-mp3-bytes".to_vec(),
            calls: calls.clone(),
        };
        (
            SpeechSynthesizer::with_backend(
                Box::new(backend),
                dir.path().to_path_buf(),
                "mp3".to_string(),
            ),
            calls,
        )
    }

    fn dir_entry_count(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_empty_and_marker_inputs_produce_no_artifact() {
        let dir = TempDir::new().unwrap();
        let (synthesizer, calls) = synthesizer(&dir);

        for input in ["", "   ", "Error: translation failed", NOTHING_TO_TRANSLATE] {
            assert!(synthesizer.synthesize(input, "hi").await.is_none());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(dir_entry_count(&dir), 0);
    }

    #[tokio::test]
    async fn test_synthesize_writes_artifact() {
        let dir = TempDir::new().unwrap();
        let (synthesizer, calls) = synthesizer(&dir);

        let path = synthesizer.synthesize("नमस्ते", "hi").await.unwrap();

        assert_eq!(path.parent().unwrap(), dir.path());
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("hi_"));
        assert!(name.ends_with(".mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3fake-mp3-bytes");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_leaves_no_partial_file() {
        let dir = TempDir::new().unwrap();
        let synthesizer = SpeechSynthesizer::with_backend(
            Box::new(FailingBackend),
            dir.path().to_path_buf(),
            "mp3".to_string(),
        );

        assert!(synthesizer.synthesize("some text", "hi").await.is_none());
        assert_eq!(dir_entry_count(&dir), 0);
    }

    #[tokio::test]
    async fn test_empty_backend_response_is_failure() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = StubBackend {
            bytes: Vec::new(),
            calls: calls.clone(),
        };
        let synthesizer = SpeechSynthesizer::with_backend(
            Box::new(backend),
            dir.path().to_path_buf(),
            "mp3".to_string(),
        );

        assert!(synthesizer.synthesize("some text", "hi").await.is_none());
        assert_eq!(dir_entry_count(&dir), 0);
    }

    #[test]
    fn test_filenames_unique_across_many_calls() {
        let dir = TempDir::new().unwrap();
        let (synthesizer, _) = synthesizer(&dir);

        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(synthesizer.unique_filename("hi")));
        }
    }
}
