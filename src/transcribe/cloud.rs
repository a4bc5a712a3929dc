use crate::config::{Config, Engine, API_KEY_ENV};
use crate::error::{Result, VidtranscribeError};
use crate::transcribe::{Transcriber, TranscriptionOutput, TranscriptionRequest};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// OpenAI-compatible speech-to-text API client.
pub struct CloudTranscriber {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl CloudTranscriber {
    pub fn new(api_key: String) -> Self {
        let defaults = Config::default();
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: defaults.api_base_url,
            model: defaults.cloud_model,
        }
    }

    /// Build from config; fails before any network activity when the key is missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .openai_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| VidtranscribeError::MissingCredential(API_KEY_ENV.to_string()))?;

        Ok(Self::new(api_key)
            .with_base_url(config.api_base_url.clone())
            .with_model(config.cloud_model.clone()))
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }

    /// Multipart form with the audio streamed from disk.
    async fn build_form(&self, request: &TranscriptionRequest) -> Result<Form> {
        let audio_path = request.audio_path.as_path();
        let read_error = |e: std::io::Error| {
            VidtranscribeError::TranscriptionFailed(format!("{}: {e}", audio_path.display()))
        };
        let file = tokio::fs::File::open(audio_path).await.map_err(read_error)?;
        let length = file.metadata().await.map_err(read_error)?.len();

        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let file_part = Part::stream_with_length(Body::from(file), length)
            .file_name(file_name)
            .mime_str(mime_type(audio_path))
            .map_err(|e| VidtranscribeError::TranscriptionFailed(format!("mime: {e}")))?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "text");

        if let Some(lang) = request.language_hint() {
            form = form.text("language", lang.to_string());
        }
        if let Some(prompt) = request.prompt_hint() {
            form = form.text("prompt", prompt.to_string());
        }

        Ok(form)
    }

    async fn call_api(&self, form: Form) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VidtranscribeError::TranscriptionFailed(format!("request: {e}")))?;

        let status = response.status();
        debug!("Transcription API response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| VidtranscribeError::TranscriptionFailed(format!("body: {e}")))?;

        if status.is_success() {
            return Ok(body);
        }

        if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
            return Err(VidtranscribeError::TranscriptionFailed(format!(
                "API error ({}): {}",
                status, api_error.error.message
            )));
        }

        Err(VidtranscribeError::TranscriptionFailed(format!(
            "API error ({}): {}",
            status,
            body.trim()
        )))
    }
}

fn mime_type(audio_path: &Path) -> &'static str {
    match audio_path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl Transcriber for CloudTranscriber {
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<TranscriptionOutput> {
        debug!("Transcribing {} with {}", request.audio_path.display(), self.name());

        let form = self.build_form(request).await?;
        let text = self.call_api(form).await?;

        info!("Transcription completed ({} chars)", text.len());

        match &request.output_path {
            Some(path) => {
                tokio::fs::write(path, &text).await.map_err(|e| {
                    VidtranscribeError::TranscriptionFailed(format!("{}: {e}", path.display()))
                })?;
                Ok(TranscriptionOutput::Written(path.clone()))
            }
            None => Ok(TranscriptionOutput::Text(text)),
        }
    }

    fn engine(&self) -> Engine {
        Engine::Cloud
    }

    fn name(&self) -> &'static str {
        "OpenAI Whisper"
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
