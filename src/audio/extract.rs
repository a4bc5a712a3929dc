use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{AudioFormat, Config};
use crate::error::{Result, VidtranscribeError};
use crate::process::CommandRunner;

/// FFmpeg arguments extracting one audio stream, with video dropped.
///
/// WAV output is mono 16-bit PCM at 16kHz, which is what speech models expect.
pub fn extraction_args(
    video: &Path,
    audio_index: usize,
    output: &Path,
    format: AudioFormat,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-i".into(),
        video.as_os_str().to_owned(),
        "-map".into(),
        format!("0:a:{audio_index}").into(),
        "-vn".into(),
    ];

    match format {
        AudioFormat::Wav => args.extend(
            ["-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"].map(OsString::from),
        ),
        AudioFormat::M4a => args.extend(["-c:a", "aac"].map(OsString::from)),
    }

    args.push(output.as_os_str().to_owned());
    args
}

/// Extract audio track `audio_index` of `video` into `output`.
pub async fn extract_audio(
    runner: &dyn CommandRunner,
    config: &Config,
    video: &Path,
    audio_index: usize,
    output: &Path,
    format: AudioFormat,
) -> Result<PathBuf> {
    let program = config.ffmpeg_bin.as_str();
    if runner.locate(program).is_none() {
        return Err(VidtranscribeError::ExtractionToolUnavailable(
            program.to_string(),
        ));
    }

    info!(
        "Extracting audio track {} from {} to {}",
        audio_index,
        video.display(),
        output.display()
    );

    let args = extraction_args(video, audio_index, output, format);
    let result = runner.run(program, &args).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => VidtranscribeError::ExtractionToolUnavailable(program.to_string()),
        _ => VidtranscribeError::ExtractionFailed(format!("Failed to run FFmpeg: {e}")),
    })?;

    if !result.success() {
        return Err(VidtranscribeError::ExtractionFailed(result.diagnostic()));
    }

    debug!("Audio track {} extracted", audio_index);
    Ok(output.to_path_buf())
}
