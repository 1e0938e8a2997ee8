use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::audio::AudioNormalizer;
use crate::config::Config;
use crate::error::{ExtractionError, JobError};
use crate::languages;
use crate::recognition::SpeechExtractor;
use crate::synthesis::SpeechSynthesizer;
use crate::translation::ChunkedTranslator;

/// Stands in for translated text when the translation stage fails.
pub const TRANSLATION_FAILED_MARKER: &str = "Error: translation failed";

/// Pipeline stages in execution order. No backward transitions; each stage
/// is attempted once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    Normalizing,
    Extracting,
    Translating,
    Synthesizing,
}

/// One end-to-end request to translate one uploaded file
#[derive(Debug, Clone)]
pub struct TranslationJob {
    pub source_path: PathBuf,
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslationJob {
    pub fn new(source_path: impl Into<PathBuf>, target_lang: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            source_lang: "en".to_string(),
            target_lang: target_lang.into(),
        }
    }

    pub fn with_source_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = source_lang.into();
        self
    }
}

/// Aggregate job outcome handed to the persistence collaborator.
///
/// Always produced once normalization succeeds, even when later stages
/// fail; degraded fields carry explicit placeholder markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub original_text: String,
    pub translated_text: String,
    pub audio_path: Option<PathBuf>,
    pub succeeded_stages: Vec<PipelineStage>,
}

/// Placeholder original text for a failed extraction. Clearly marked so it
/// is never mistaken for recognized speech, and never translated literally.
pub fn extraction_placeholder(error: &ExtractionError) -> String {
    match error {
        ExtractionError::Unintelligible => "Error: could not understand audio".to_string(),
        ExtractionError::ServiceUnavailable(_) => {
            "Error: recognition service unavailable".to_string()
        }
        ExtractionError::Io(_) => "Error: could not read audio input".to_string(),
    }
}

/// Sequences the pipeline stages and converts every stage failure into a
/// structured result field
pub struct PipelineCoordinator {
    normalizer: AudioNormalizer,
    extractor: SpeechExtractor,
    translator: ChunkedTranslator,
    synthesizer: SpeechSynthesizer,
}

impl PipelineCoordinator {
    pub fn new(config: Config) -> Result<Self> {
        let normalizer = AudioNormalizer::new(config.audio.clone(), config.processing.clone());
        let extractor =
            SpeechExtractor::new(config.recognition.clone(), config.audio.calibration_secs)?;
        let translator = ChunkedTranslator::new(config.translation.clone())?;
        let synthesizer = SpeechSynthesizer::new(config.synthesis)?;

        Ok(Self::with_components(
            normalizer,
            extractor,
            translator,
            synthesizer,
        ))
    }

    pub fn with_components(
        normalizer: AudioNormalizer,
        extractor: SpeechExtractor,
        translator: ChunkedTranslator,
        synthesizer: SpeechSynthesizer,
    ) -> Self {
        Self {
            normalizer,
            extractor,
            translator,
            synthesizer,
        }
    }

    /// Run one job through normalize, extract, translate, synthesize.
    ///
    /// Only job validation and normalization failures end the job with an
    /// error; every later failure degrades into result fields.
    pub async fn run_pipeline(&self, job: TranslationJob) -> Result<JobResult, JobError> {
        if !languages::is_supported_target(&job.target_lang) {
            return Err(JobError::InvalidJob(format!(
                "unsupported target language: {}",
                job.target_lang
            )));
        }

        info!(
            "🚀 Starting translation job: {} ({} -> {})",
            job.source_path.display(),
            job.source_lang,
            job.target_lang
        );

        let mut succeeded = Vec::new();

        let audio = self.normalizer.normalize(&job.source_path).await?;
        succeeded.push(PipelineStage::Normalizing);

        let original_text = match self.extractor.extract(&audio, &job.source_lang).await {
            Ok(text) => {
                succeeded.push(PipelineStage::Extracting);
                text
            }
            Err(e) => {
                warn!("Speech extraction failed, producing degraded result: {}", e);
                let placeholder = extraction_placeholder(&e);
                return Ok(JobResult {
                    original_text: placeholder.clone(),
                    translated_text: placeholder,
                    audio_path: None,
                    succeeded_stages: succeeded,
                });
            }
        };

        // The waveform is exclusively for extraction; release the temp file
        // before the (potentially slow) backend calls that follow.
        drop(audio);

        let translated_text = match self
            .translator
            .translate(&original_text, &job.source_lang, &job.target_lang)
            .await
        {
            Ok(text) => {
                succeeded.push(PipelineStage::Translating);
                text
            }
            Err(e) => {
                warn!("Translation failed, keeping original text: {}", e);
                return Ok(JobResult {
                    original_text,
                    translated_text: TRANSLATION_FAILED_MARKER.to_string(),
                    audio_path: None,
                    succeeded_stages: succeeded,
                });
            }
        };

        let audio_path = self
            .synthesizer
            .synthesize(&translated_text, &job.target_lang)
            .await;
        if audio_path.is_some() {
            succeeded.push(PipelineStage::Synthesizing);
        }

        info!(
            "🎉 Job completed: {}/4 stages succeeded, audio: {}",
            succeeded.len(),
            audio_path.is_some()
        );

        Ok(JobResult {
            original_text,
            translated_text,
            audio_path,
            succeeded_stages: succeeded,
        })
    }
}
