pub mod cloud;
pub mod local;

pub use cloud::CloudTranscriber;
pub use local::LocalTranscriber;

use crate::config::{Config, Engine};
use crate::error::Result;
use crate::process::CommandRunner;
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// One transcription job.
#[derive(Debug, Clone, Default)]
pub struct TranscriptionRequest {
    pub audio_path: PathBuf,
    /// Where the transcript should go; `None` means stdout for the cloud
    /// engine and next to the audio for the local engine.
    pub output_path: Option<PathBuf>,
    pub language: Option<String>,
    pub prompt: Option<String>,
}

impl TranscriptionRequest {
    pub fn new(audio_path: impl Into<PathBuf>) -> Self {
        Self {
            audio_path: audio_path.into(),
            ..Default::default()
        }
    }

    pub fn with_output(mut self, path: Option<PathBuf>) -> Self {
        self.output_path = path;
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_prompt(mut self, prompt: Option<String>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Language hint, only when non-empty.
    pub fn language_hint(&self) -> Option<&str> {
        non_empty(self.language.as_deref())
    }

    /// Prompt hint, only when non-empty.
    pub fn prompt_hint(&self) -> Option<&str> {
        non_empty(self.prompt.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// What a transcriber produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionOutput {
    /// Transcript was written to this file.
    Written(PathBuf),
    /// Transcript text destined for stdout.
    Text(String),
}

impl TranscriptionOutput {
    /// Print text output to `out` (newline-terminated) and return the
    /// written path, if any.
    pub fn deliver<W: Write + ?Sized>(self, out: &mut W) -> Result<Option<PathBuf>> {
        match self {
            TranscriptionOutput::Written(path) => Ok(Some(path)),
            TranscriptionOutput::Text(text) => {
                out.write_all(text.as_bytes())?;
                if !text.ends_with('\n') {
                    out.write_all(b"\n")?;
                }
                out.flush()?;
                Ok(None)
            }
        }
    }
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<TranscriptionOutput>;
    fn engine(&self) -> Engine;
    fn name(&self) -> &'static str;
}

/// Build the transcriber for `engine`, checking its preconditions.
///
/// The cloud engine needs an API key, the local engine its binary on `PATH`.
pub fn create_transcriber(
    engine: Engine,
    config: &Config,
    runner: Arc<dyn CommandRunner>,
) -> Result<Box<dyn Transcriber>> {
    match engine {
        Engine::Cloud => Ok(Box::new(CloudTranscriber::from_config(config)?)),
        Engine::Local => Ok(Box::new(LocalTranscriber::from_config(config, runner)?)),
    }
}
