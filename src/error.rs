use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidtranscribeError {
    #[error("File not found or not readable: {0}")]
    FileNotFound(String),

    #[error("Required command not found on PATH: {0}")]
    ProbeUnavailable(String),

    #[error("Could not parse probe output: {0}")]
    ProbeParseError(String),

    #[error("Probing failed: {0}")]
    ProbeFailed(String),

    #[error("Unsupported format: {0}. Use wav or m4a.")]
    UnsupportedFormat(String),

    #[error("{0}")]
    InvalidSelection(String),

    #[error("Track {0} out of range. Use `vidtranscribe tracks` to list available tracks.")]
    TrackOutOfRange(usize),

    #[error("When using --tracks (multiple), use --out-dir instead of --out.")]
    ConflictingOutputSpec,

    #[error("Required command not found on PATH: {0}")]
    ExtractionToolUnavailable(String),

    #[error("Audio extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("{0} is not set. Set it to use cloud transcription.")]
    MissingCredential(String),

    #[error("Required command not found on PATH: {0}")]
    EngineUnavailable(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Local engine finished but did not write {}", .0.display())]
    TranscriptNotProduced(PathBuf),

    #[error("Unknown --engine: {0}. Use cloud or local.")]
    UnknownEngine(String),

    #[error("{failed} of {total} file(s) failed")]
    BatchFailed { failed: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, VidtranscribeError>;
