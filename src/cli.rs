use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use crate::config::{AudioFormat, Engine};
use crate::error::Result;
use crate::pipeline::{
    batch_subtitles, extract_tracks, list_tracks, transcribe_file, BatchOptions, Context,
    ExtractOptions, TranscribeOptions,
};

#[derive(Parser, Debug)]
#[command(name = "vidtranscribe")]
#[command(version, about = "List/extract multi-track audio from video and transcribe with Whisper.")]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Hide progress spinners
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List audio tracks in a video file
    Tracks {
        /// Path to video file
        video: PathBuf,
    },

    /// Extract audio tracks from a video using ffmpeg
    Extract {
        /// Path to video file
        video: PathBuf,

        /// 0-based audio track index (from `tracks`)
        #[arg(long)]
        track: Option<String>,

        /// Comma-separated audio track indices (e.g. 0,2,3)
        #[arg(long)]
        tracks: Option<String>,

        /// Output audio file path (single track only)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output directory (recommended for multi-track)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Output format: wav, m4a
        #[arg(long, default_value = "wav")]
        format: String,

        /// Transcribe each extracted track afterwards
        #[arg(long)]
        transcribe: bool,

        /// Transcription engine: cloud (uses OPENAI_API_KEY), local (uses mlx_whisper)
        #[arg(long)]
        engine: Option<String>,

        /// Language code hint (e.g. en)
        #[arg(long)]
        language: Option<String>,

        /// Prompt to guide transcription
        #[arg(long)]
        prompt: Option<String>,
    },

    /// Transcribe an audio file
    Transcribe {
        /// Path to audio file (wav/m4a/mp3, etc.)
        audio: PathBuf,

        /// Write transcript to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Transcription engine: cloud (uses OPENAI_API_KEY), local (uses mlx_whisper)
        #[arg(long)]
        engine: Option<String>,

        /// Language code hint (e.g. en)
        #[arg(long)]
        language: Option<String>,

        /// Prompt to guide transcription
        #[arg(long)]
        prompt: Option<String>,
    },

    /// Create .srt subtitles for every audio track of one or more videos (local engine)
    ///
    /// Output goes to a sibling folder named after each video.
    Batch {
        /// One or more video file paths
        #[arg(required = true)]
        videos: Vec<PathBuf>,

        /// Intermediate extracted audio format: wav, m4a
        #[arg(long, default_value = "wav")]
        format: String,

        /// Language code for the local engine (e.g. en)
        #[arg(long)]
        language: Option<String>,

        /// Prompt to guide transcription
        #[arg(long)]
        prompt: Option<String>,
    },
}

fn resolve_engine(raw: Option<&str>, ctx: &Context) -> Result<Engine> {
    match raw {
        Some(name) => name.parse(),
        None => Ok(ctx.config.default_engine),
    }
}

/// Execute one subcommand. Results go to `out`, per-file batch errors to `err`.
pub async fn run(
    command: Commands,
    ctx: &Context,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    match command {
        Commands::Tracks { video } => {
            list_tracks(ctx, &video, out).await?;
        }

        Commands::Extract {
            video,
            track,
            tracks,
            out: out_path,
            out_dir,
            format,
            transcribe,
            engine,
            language,
            prompt,
        } => {
            let options = ExtractOptions {
                format: format.parse::<AudioFormat>()?,
                engine: resolve_engine(engine.as_deref(), ctx)?,
                track,
                tracks,
                out: out_path,
                out_dir,
                transcribe,
                language,
                prompt,
            };
            extract_tracks(ctx, &video, &options, out).await?;
        }

        Commands::Transcribe {
            audio,
            out: out_path,
            engine,
            language,
            prompt,
        } => {
            let options = TranscribeOptions {
                engine: resolve_engine(engine.as_deref(), ctx)?,
                out: out_path,
                language,
                prompt,
            };
            transcribe_file(ctx, &audio, &options, out).await?;
        }

        Commands::Batch {
            videos,
            format,
            language,
            prompt,
        } => {
            let options = BatchOptions {
                format: format.parse::<AudioFormat>()?,
                language,
                prompt,
            };
            batch_subtitles(ctx, &videos, &options, out, err)
                .await?
                .into_result()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract() {
        let args = Args::try_parse_from([
            "vidtranscribe",
            "extract",
            "movie.mkv",
            "--tracks",
            "0,1",
            "--out-dir",
            "out",
            "--transcribe",
            "--engine",
            "local",
        ])
        .unwrap();

        match args.command {
            Commands::Extract {
                tracks,
                out_dir,
                transcribe,
                engine,
                format,
                ..
            } => {
                assert_eq!(tracks.as_deref(), Some("0,1"));
                assert_eq!(out_dir, Some(PathBuf::from("out")));
                assert!(transcribe);
                assert_eq!(engine.as_deref(), Some("local"));
                assert_eq!(format, "wav");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_batch_requires_videos() {
        assert!(Args::try_parse_from(["vidtranscribe", "batch"]).is_err());

        let args = Args::try_parse_from(["vidtranscribe", "batch", "a.mp4", "b.mp4", "-v"]).unwrap();
        assert!(args.verbose);
        match args.command {
            Commands::Batch { videos, .. } => assert_eq!(videos.len(), 2),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
