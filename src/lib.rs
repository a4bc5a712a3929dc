//! List, extract and transcribe the audio tracks of video files.
//!
//! Audio tracks are discovered with FFprobe, extracted one by one with FFmpeg
//! into deterministically named files, and transcribed either by a cloud
//! speech-to-text API or by a local Whisper engine run as a subprocess.

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod paths;
pub mod pipeline;
pub mod process;
pub mod selection;
pub mod transcribe;

pub use config::{AudioFormat, Config, Engine};
pub use error::{Result, VidtranscribeError};
pub use pipeline::{
    batch_subtitles, extract_tracks, list_tracks, transcribe_file, BatchOptions, BatchReport,
    Context, ExtractOptions, FileStatus, TranscribeOptions,
};
