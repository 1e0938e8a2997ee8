use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::TranslationConfig;
use crate::error::TranslationError;

/// Returned for empty or whitespace-only input without a backend call.
pub const NOTHING_TO_TRANSLATE: &str = "No text to translate";

/// Placeholder prefix used for stage-failure text. Text carrying it is
/// passed through unchanged, never sent to the backend.
pub const ERROR_MARKER_PREFIX: &str = "Error:";

/// Split text into consecutive segments of at most `limit` characters.
///
/// Splits on char boundaries, never inside a UTF-8 scalar. The boundary can
/// still fall mid-word or mid-sentence; a known quality limitation of
/// fixed-size chunking.
pub fn chunk_text(text: &str, limit: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == limit {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}

/// Translation backend seam: one call per chunk
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate_chunk(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError>;
}

/// HTTP translation backend
pub struct HttpTranslator {
    config: TranslationConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct TranslationRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslationResponse {
    translated_text: String,
}

impl HttpTranslator {
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl TranslationBackend for HttpTranslator {
    async fn translate_chunk(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let request = TranslationRequest {
            q: text,
            source: source_lang,
            target: target_lang,
        };

        let mut builder = self.client.post(&self.config.endpoint).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        debug!("Sending translation request to {}", self.config.endpoint);

        let response = builder
            .send()
            .await
            .map_err(|e| TranslationError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(TranslationError::Backend(format!("{}: {}", status, text)));
        }

        let parsed: TranslationResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Backend(e.to_string()))?;

        Ok(parsed.translated_text)
    }
}

/// Translates text of any length by splitting it into bounded chunks
pub struct ChunkedTranslator {
    backend: Box<dyn TranslationBackend>,
    chunk_limit: usize,
}

impl ChunkedTranslator {
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let chunk_limit = config.chunk_limit;
        let backend = Box::new(HttpTranslator::new(config)?);
        Ok(Self::with_backend(backend, chunk_limit))
    }

    pub fn with_backend(backend: Box<dyn TranslationBackend>, chunk_limit: usize) -> Self {
        Self {
            backend,
            chunk_limit,
        }
    }

    /// Translate `text` from `source_lang` to `target_lang`.
    ///
    /// Chunks are translated independently in order and rejoined with single
    /// spaces. A single failed chunk fails the whole operation; a partial
    /// result would corrupt meaning.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            debug!("Empty input, skipping translation backend");
            return Ok(NOTHING_TO_TRANSLATE.to_string());
        }

        if text.starts_with(ERROR_MARKER_PREFIX) {
            debug!("Error marker input, passing through unchanged");
            return Ok(text.to_string());
        }

        let chunks = chunk_text(text, self.chunk_limit);
        info!(
            "🌐 Translating {} chars in {} chunk(s) ({} -> {})",
            text.chars().count(),
            chunks.len(),
            source_lang,
            target_lang
        );

        let mut translated = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let segment = self
                .backend
                .translate_chunk(chunk, source_lang, target_lang)
                .await
                .map_err(|e| TranslationError::ChunkFailed {
                    index,
                    message: e.to_string(),
                })?;
            translated.push(segment);
        }

        Ok(translated.join(" "))
    }
}
