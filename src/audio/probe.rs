use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, VidtranscribeError};
use crate::process::CommandRunner;

use super::TrackDescriptor;

/// FFprobe arguments requesting audio-stream metadata only, as JSON.
pub fn probe_args(video: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-v",
        "error",
        "-select_streams",
        "a",
        "-show_entries",
        "stream=index,codec_name,channels,channel_layout:stream_tags=language,title",
        "-of",
        "json",
    ]
    .map(OsString::from)
    .into();
    args.push(video.as_os_str().to_owned());
    args
}

/// Turn FFprobe JSON into descriptors, numbering audio tracks in stream order.
pub fn parse_probe_output(json: &str) -> Result<Vec<TrackDescriptor>> {
    let parsed: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| VidtranscribeError::ProbeParseError(e.to_string()))?;

    let tracks = parsed
        .streams
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(audio_index, stream)| {
            let tags = stream.tags.unwrap_or_default();
            TrackDescriptor {
                audio_index,
                stream_index: stream.index,
                codec: stream.codec_name,
                channels: stream.channels,
                channel_layout: stream.channel_layout,
                language: tags.language,
                title: tags.title,
            }
        })
        .collect();

    Ok(tracks)
}

/// List the audio tracks of `video` using FFprobe.
///
/// An empty list is a valid result for files without audio.
pub async fn get_audio_tracks(
    runner: &dyn CommandRunner,
    config: &Config,
    video: &Path,
) -> Result<Vec<TrackDescriptor>> {
    ensure_readable(video)?;

    let program = config.ffprobe_bin.as_str();
    if runner.locate(program).is_none() {
        return Err(VidtranscribeError::ProbeUnavailable(program.to_string()));
    }

    debug!("Probing audio streams of {}", video.display());

    let output = runner
        .run(program, &probe_args(video))
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => VidtranscribeError::ProbeUnavailable(program.to_string()),
            _ => VidtranscribeError::ProbeFailed(format!("Failed to run FFprobe: {e}")),
        })?;

    if !output.success() {
        return Err(VidtranscribeError::ProbeFailed(output.diagnostic()));
    }

    let tracks = parse_probe_output(&output.stdout)?;
    info!("Found {} audio track(s) in {}", tracks.len(), video.display());
    Ok(tracks)
}

/// Fail with `FileNotFound` unless `path` is an openable file.
pub fn ensure_readable(path: &Path) -> Result<()> {
    match std::fs::File::open(path) {
        Ok(_) if path.is_file() => Ok(()),
        _ => Err(VidtranscribeError::FileNotFound(path.display().to_string())),
    }
}

// FFprobe JSON shapes

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Option<Vec<ProbeStream>>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    index: Option<u32>,
    codec_name: Option<String>,
    channels: Option<u32>,
    channel_layout: Option<String>,
    tags: Option<ProbeTags>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeTags {
    language: Option<String>,
    title: Option<String>,
}
