use crate::audio::probe::ensure_readable;
use crate::audio::{extract_audio, get_audio_tracks, TrackDescriptor};
use crate::config::{AudioFormat, Config, Engine};
use crate::error::{Result, VidtranscribeError};
use crate::paths;
use crate::process::{CommandRunner, SystemRunner};
use crate::selection::TrackSelection;
use crate::transcribe::{create_transcriber, Transcriber, TranscriptionRequest};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Everything an operation needs from the outside world.
#[derive(Clone)]
pub struct Context {
    pub config: Config,
    pub runner: Arc<dyn CommandRunner>,
    /// Show spinners on stderr while subprocesses and requests run.
    pub show_progress: bool,
}

impl Context {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            runner: Arc::new(SystemRunner),
            show_progress: true,
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn transcriber(&self, engine: Engine) -> Result<Box<dyn Transcriber>> {
        create_transcriber(engine, &self.config, self.runner.clone())
    }

    fn spinner(&self, message: String) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

/// Options of the `extract` operation.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Single `--track` index, as typed.
    pub track: Option<String>,
    /// Comma-separated `--tracks` list, as typed; wins over `track`.
    pub tracks: Option<String>,
    /// Explicit audio output path, single track only.
    pub out: Option<PathBuf>,
    /// Output directory, defaults to the video's directory.
    pub out_dir: Option<PathBuf>,
    pub format: AudioFormat,
    /// Chain each extracted track into transcription.
    pub transcribe: bool,
    pub engine: Engine,
    pub language: Option<String>,
    pub prompt: Option<String>,
}

/// Options of the `transcribe` operation.
#[derive(Debug, Clone, Default)]
pub struct TranscribeOptions {
    pub out: Option<PathBuf>,
    pub engine: Engine,
    pub language: Option<String>,
    pub prompt: Option<String>,
}

/// Options of the `batch` operation. The engine is always local.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub format: AudioFormat,
    pub language: Option<String>,
    pub prompt: Option<String>,
}

/// Files produced for one extracted track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOutput {
    pub audio_index: usize,
    pub audio_path: PathBuf,
    pub transcript_path: Option<PathBuf>,
}

/// Print the audio inventory of `video`, one line per track.
pub async fn list_tracks(
    ctx: &Context,
    video: &Path,
    out: &mut dyn Write,
) -> Result<Vec<TrackDescriptor>> {
    ensure_readable(video)?;
    let tracks = get_audio_tracks(ctx.runner.as_ref(), &ctx.config, video).await?;

    if tracks.is_empty() {
        writeln!(out, "No audio tracks found.")?;
    }
    for track in &tracks {
        writeln!(out, "{track}")?;
    }

    Ok(tracks)
}

/// Extract the selected tracks of one video, optionally transcribing each.
///
/// The first failing track aborts the remaining ones.
pub async fn extract_tracks(
    ctx: &Context,
    video: &Path,
    options: &ExtractOptions,
    out: &mut dyn Write,
) -> Result<Vec<TrackOutput>> {
    let selection =
        TrackSelection::from_options(options.tracks.as_deref(), options.track.as_deref())?;
    if selection.len() > 1 && options.out.is_some() {
        return Err(VidtranscribeError::ConflictingOutputSpec);
    }

    ensure_readable(video)?;
    let inventory = get_audio_tracks(ctx.runner.as_ref(), &ctx.config, video).await?;
    selection.validate_against(&inventory)?;

    let transcriber = if options.transcribe {
        Some(ctx.transcriber(options.engine)?)
    } else {
        None
    };

    let out_dir = options
        .out_dir
        .clone()
        .unwrap_or_else(|| paths::parent_dir(video));
    std::fs::create_dir_all(&out_dir)?;

    let mut outputs = Vec::with_capacity(selection.len());
    for audio_index in selection.iter() {
        let language = inventory[audio_index].language.as_deref();
        let audio_out = paths::extracted_audio_path(
            video,
            audio_index,
            language,
            options.format,
            &out_dir,
            options.out.as_deref(),
        );

        let audio_path =
            extract_with_progress(ctx, video, audio_index, &audio_out, options.format).await?;
        writeln!(out, "{}", audio_path.display())?;

        let mut transcript_path = None;
        if let Some(transcriber) = &transcriber {
            let target = paths::transcript_path(
                transcriber.engine(),
                &out_dir,
                video,
                audio_index,
                language,
            );
            let request = TranscriptionRequest::new(&audio_path)
                .with_output(Some(target))
                .with_language(options.language.clone())
                .with_prompt(options.prompt.clone());

            let written =
                transcribe_with_progress(ctx, transcriber.as_ref(), &request, out).await?;
            if let Some(written) = written {
                writeln!(out, "{}", written.display())?;
                transcript_path = Some(written);
            }
        }

        outputs.push(TrackOutput {
            audio_index,
            audio_path,
            transcript_path,
        });
    }

    Ok(outputs)
}

/// Transcribe one audio file; returns the written path unless printed to `out`.
pub async fn transcribe_file(
    ctx: &Context,
    audio: &Path,
    options: &TranscribeOptions,
    out: &mut dyn Write,
) -> Result<Option<PathBuf>> {
    ensure_readable(audio)?;
    let transcriber = ctx.transcriber(options.engine)?;

    let request = TranscriptionRequest::new(audio)
        .with_output(options.out.clone())
        .with_language(options.language.clone())
        .with_prompt(options.prompt.clone());

    let written = transcribe_with_progress(ctx, transcriber.as_ref(), &request, out).await?;
    if let Some(path) = &written {
        writeln!(out, "{}", path.display())?;
    }
    Ok(written)
}

/// Outcome of one file in a batch run.
#[derive(Debug)]
pub enum FileStatus {
    /// Subtitle paths, one per track.
    Completed(Vec<PathBuf>),
    NoAudio,
    Failed(VidtranscribeError),
}

#[derive(Debug)]
pub struct FileReport {
    pub video: PathBuf,
    pub status: FileStatus,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Failed(_)))
            .count()
    }

    pub fn subtitles(&self) -> usize {
        self.files
            .iter()
            .map(|f| match &f.status {
                FileStatus::Completed(paths) => paths.len(),
                _ => 0,
            })
            .sum()
    }

    /// `Err(BatchFailed)` when any file failed.
    pub fn into_result(self) -> Result<Self> {
        match self.failed() {
            0 => Ok(self),
            failed => Err(VidtranscribeError::BatchFailed {
                failed,
                total: self.files.len(),
            }),
        }
    }
}

/// Subtitle every audio track of every video with the local engine.
///
/// Each video gets a sibling output directory named after it. A failing
/// track aborts the rest of its file; the next file is still processed.
pub async fn batch_subtitles(
    ctx: &Context,
    videos: &[PathBuf],
    options: &BatchOptions,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<BatchReport> {
    let start = Instant::now();
    let transcriber = ctx.transcriber(Engine::Local)?;
    let mut report = BatchReport::default();

    for (i, video) in videos.iter().enumerate() {
        info!("Batch file {}/{}: {}", i + 1, videos.len(), video.display());

        let status = match batch_file(ctx, transcriber.as_ref(), video, options, out).await {
            Ok(paths) if paths.is_empty() => FileStatus::NoAudio,
            Ok(paths) => FileStatus::Completed(paths),
            Err(e) => {
                warn!("Skipping rest of {}: {}", video.display(), e);
                writeln!(err, "Error: {}: {}", video.display(), e)?;
                FileStatus::Failed(e)
            }
        };

        report.files.push(FileReport {
            video: video.clone(),
            status,
        });
    }

    report.elapsed = start.elapsed();
    info!(
        "Batch finished: {} subtitle file(s), {} failed file(s) in {:.1}s",
        report.subtitles(),
        report.failed(),
        report.elapsed.as_secs_f64()
    );
    Ok(report)
}

async fn batch_file(
    ctx: &Context,
    transcriber: &dyn Transcriber,
    video: &Path,
    options: &BatchOptions,
    out: &mut dyn Write,
) -> Result<Vec<PathBuf>> {
    ensure_readable(video)?;
    let video = std::path::absolute(video)?;

    let out_dir = paths::batch_output_dir(&video);
    std::fs::create_dir_all(&out_dir)?;

    let tracks = get_audio_tracks(ctx.runner.as_ref(), &ctx.config, &video).await?;
    if tracks.is_empty() {
        writeln!(out, "{}: no audio tracks found", video.display())?;
        return Ok(Vec::new());
    }

    let selection = TrackSelection::all(tracks.len());
    let mut written = Vec::with_capacity(selection.len());
    for track in selection.iter().map(|i| &tracks[i]) {
        let audio_out = paths::extracted_audio_path(
            &video,
            track.audio_index,
            track.language.as_deref(),
            options.format,
            &out_dir,
            None,
        );
        let audio_path =
            extract_with_progress(ctx, &video, track.audio_index, &audio_out, options.format)
                .await?;

        let transcript_language = options.language.as_deref().or(track.language.as_deref());
        let target = paths::transcript_path(
            Engine::Local,
            &out_dir,
            &video,
            track.audio_index,
            transcript_language,
        );
        let request = TranscriptionRequest::new(&audio_path)
            .with_output(Some(target))
            .with_language(options.language.clone())
            .with_prompt(options.prompt.clone());

        if let Some(path) = transcribe_with_progress(ctx, transcriber, &request, out).await? {
            writeln!(out, "{}", path.display())?;
            written.push(path);
        }
    }

    Ok(written)
}

async fn extract_with_progress(
    ctx: &Context,
    video: &Path,
    audio_index: usize,
    output: &Path,
    format: AudioFormat,
) -> Result<PathBuf> {
    let pb = ctx.spinner(format!("Extracting audio track {audio_index}..."));
    let started = Instant::now();

    let result = extract_audio(
        ctx.runner.as_ref(),
        &ctx.config,
        video,
        audio_index,
        output,
        format,
    )
    .await;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    debug!(
        "Extraction of track {} took {:.2}s",
        audio_index,
        started.elapsed().as_secs_f64()
    );
    result
}

async fn transcribe_with_progress(
    ctx: &Context,
    transcriber: &dyn Transcriber,
    request: &TranscriptionRequest,
    out: &mut dyn Write,
) -> Result<Option<PathBuf>> {
    let pb = ctx.spinner(format!(
        "Transcribing {} with {}...",
        request.audio_path.display(),
        transcriber.name()
    ));

    let result = transcriber.transcribe(request).await;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    result?.deliver(out)
}
