use std::path::PathBuf;

/// Errors raised while normalizing an input file to canonical audio.
/// Fatal for the job: nothing downstream can run without a waveform.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    #[error("unsupported format: .{0}")]
    UnsupportedFormat(String),

    #[error("input file too large: {0} bytes")]
    TooLarge(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audio decode failed: {0}")]
    Decode(String),

    #[error("audio probe failed: {0}")]
    Probe(String),
}

/// Outcomes of the speech extraction stage. The coordinator degrades and
/// continues on these; they never abort the job.
#[derive(thiserror::Error, Debug)]
pub enum ExtractionError {
    #[error("could not understand audio")]
    Unintelligible,

    #[error("recognition service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("failed to read normalized audio: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hound::Error> for ExtractionError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => ExtractionError::Io(e),
            other => ExtractionError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                other.to_string(),
            )),
        }
    }
}

/// Errors raised while translating text. A single failed chunk fails the
/// whole translation; partial results would corrupt meaning.
#[derive(thiserror::Error, Debug)]
pub enum TranslationError {
    #[error("translation backend error: {0}")]
    Backend(String),

    #[error("translation of chunk {index} failed: {message}")]
    ChunkFailed { index: usize, message: String },
}

/// Errors raised while synthesizing speech. Converted to an absent artifact
/// at the synthesizer boundary; callers only ever see `Option<PathBuf>`.
#[derive(thiserror::Error, Debug)]
pub enum SynthesisError {
    #[error("synthesis backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that end a job before a result record can be produced.
#[derive(thiserror::Error, Debug)]
pub enum JobError {
    #[error("job validation failed: {0}")]
    InvalidJob(String),

    #[error(transparent)]
    Format(#[from] FormatError),
}
