use crate::config::{Config, Engine};
use crate::error::{Result, VidtranscribeError};
use crate::paths::LocalOutputTarget;
use crate::process::CommandRunner;
use crate::transcribe::{Transcriber, TranscriptionOutput, TranscriptionRequest};
use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::{debug, info};

/// Decoding parameters passed on every run so output does not drift between runs.
const TEMPERATURE: &str = "0";
const COMPRESSION_RATIO_THRESHOLD: &str = "2.0";
const LOGPROB_THRESHOLD: &str = "-0.7";

/// On-device Whisper run as a subprocess that writes its own `.srt` file.
pub struct LocalTranscriber {
    runner: Arc<dyn CommandRunner>,
    program: String,
    model: String,
}

impl LocalTranscriber {
    /// Fails with `EngineUnavailable` when the engine binary is not on `PATH`.
    pub fn from_config(config: &Config, runner: Arc<dyn CommandRunner>) -> Result<Self> {
        let program = config.local_engine_bin.clone();
        if runner.locate(&program).is_none() {
            return Err(VidtranscribeError::EngineUnavailable(program));
        }

        Ok(Self {
            runner,
            program,
            model: config.local_model.clone(),
        })
    }

    pub fn args(&self, request: &TranscriptionRequest, target: &LocalOutputTarget) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            request.audio_path.as_os_str().to_owned(),
            "--model".into(),
            self.model.clone().into(),
            "--task".into(),
            "transcribe".into(),
        ];

        if let Some(lang) = request.language_hint() {
            args.extend(["--language", lang].map(OsString::from));
        }

        args.extend(["--temperature", TEMPERATURE, "--verbose", "True"].map(OsString::from));

        if let Some(prompt) = request.prompt_hint() {
            args.extend(["--initial-prompt", prompt].map(OsString::from));
        }

        args.extend(
            [
                "--condition-on-previous-text",
                "False",
                "--compression-ratio-threshold",
                COMPRESSION_RATIO_THRESHOLD,
                "--logprob-threshold",
                LOGPROB_THRESHOLD,
                "--fp16",
                "True",
                "--output-format",
                "srt",
            ]
            .map(OsString::from),
        );

        args.extend([
            "--output-dir".into(),
            target.output_dir.as_os_str().to_owned(),
            "--output-name".into(),
            target.output_name.clone(),
        ]);

        args
    }
}

#[async_trait]
impl Transcriber for LocalTranscriber {
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<TranscriptionOutput> {
        let target =
            LocalOutputTarget::derive(&request.audio_path, request.output_path.as_deref());

        debug!(
            "Transcribing {} with {} into {}",
            request.audio_path.display(),
            self.program,
            target.expected_path.display()
        );

        let output = self
            .runner
            .run(&self.program, &self.args(request, &target))
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => VidtranscribeError::EngineUnavailable(self.program.clone()),
                _ => VidtranscribeError::TranscriptionFailed(format!(
                    "Failed to run {}: {e}",
                    self.program
                )),
            })?;

        if !output.success() {
            return Err(VidtranscribeError::TranscriptionFailed(output.diagnostic()));
        }

        if !target.expected_path.is_file() {
            return Err(VidtranscribeError::TranscriptNotProduced(
                target.expected_path,
            ));
        }

        info!("Subtitles written to {}", target.expected_path.display());
        Ok(TranscriptionOutput::Written(target.expected_path))
    }

    fn engine(&self) -> Engine {
        Engine::Local
    }

    fn name(&self) -> &'static str {
        "mlx-whisper"
    }
}
