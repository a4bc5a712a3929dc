use crate::error::{Result, VidtranscribeError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the cloud engine credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Cloud,
    Local,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Cloud => write!(f, "cloud"),
            Engine::Local => write!(f, "local"),
        }
    }
}

impl std::str::FromStr for Engine {
    type Err = VidtranscribeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cloud" => Ok(Engine::Cloud),
            "local" => Ok(Engine::Local),
            _ => Err(VidtranscribeError::UnknownEngine(s.to_string())),
        }
    }
}

impl Engine {
    /// Extension of the transcript this engine produces.
    ///
    /// The local engine emits subtitles natively, the cloud engine plain text.
    pub fn transcript_extension(&self) -> &'static str {
        match self {
            Engine::Cloud => "txt",
            Engine::Local => "srt",
        }
    }
}

/// Container format for extracted audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Wav,
    M4a,
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = VidtranscribeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wav" => Ok(AudioFormat::Wav),
            "m4a" => Ok(AudioFormat::M4a),
            _ => Err(VidtranscribeError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::M4a => "m4a",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Only ever taken from the environment.
    #[serde(skip)]
    pub openai_api_key: Option<String>,
    pub api_base_url: String,
    pub cloud_model: String,
    pub local_model: String,
    pub ffprobe_bin: String,
    pub ffmpeg_bin: String,
    pub local_engine_bin: String,
    pub default_engine: Engine,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cloud_model: "whisper-1".to_string(),
            local_model: "mlx-community/whisper-large-v3-mlx".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            ffmpeg_bin: "ffmpeg".to_string(),
            local_engine_bin: "mlx_whisper".to_string(),
            default_engine: Engine::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = Self::from_toml(&contents)?;
            }
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str::<Config>(contents)?)
    }

    /// Override fields from environment variables, looked up through `lookup`.
    ///
    /// An unrecognised default engine is rejected rather than ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(API_KEY_ENV) {
            self.openai_api_key = Some(key);
        }
        if let Some(url) = non_empty("VIDTRANSCRIBE_API_BASE") {
            self.api_base_url = url;
        }
        if let Some(bin) = non_empty("VIDTRANSCRIBE_FFPROBE") {
            self.ffprobe_bin = bin;
        }
        if let Some(bin) = non_empty("VIDTRANSCRIBE_FFMPEG") {
            self.ffmpeg_bin = bin;
        }
        if let Some(bin) = non_empty("VIDTRANSCRIBE_LOCAL_ENGINE") {
            self.local_engine_bin = bin;
        }
        if let Some(engine) = non_empty("VIDTRANSCRIBE_DEFAULT_ENGINE") {
            self.default_engine = engine.parse()?;
        }
        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vidtranscribe").join("config.toml"))
    }
}
