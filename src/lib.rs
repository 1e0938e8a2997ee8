/// Voice Translator
///
/// Speech translation pipeline: normalizes uploaded audio/video to a
/// canonical waveform, extracts spoken text, translates it in bounded
/// chunks, and synthesizes translated speech.

pub mod audio;
pub mod config;
pub mod error;
pub mod languages;
pub mod pipeline;
pub mod recognition;
pub mod synthesis;
pub mod translation;

// Re-export main types for easy access
pub use crate::audio::{AudioDecoder, AudioInfo, AudioNormalizer, FfmpegDecoder, NormalizedAudio};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{ExtractionError, FormatError, JobError, SynthesisError, TranslationError};
pub use crate::pipeline::{JobResult, PipelineCoordinator, PipelineStage, TranslationJob};
pub use crate::recognition::{RecognitionBackend, SpeechExtractor};
pub use crate::synthesis::{SpeechSynthesizer, SynthesisBackend};
pub use crate::translation::{ChunkedTranslator, TranslationBackend};
