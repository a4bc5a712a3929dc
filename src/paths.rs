//! Deterministic output paths for extracted audio and transcripts.
//!
//! Every function here is pure: the same inputs always produce the same path,
//! so repeated runs overwrite earlier outputs instead of piling up new ones.

use crate::config::{AudioFormat, Engine};
use regex::Regex;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Placeholder for a missing or empty language tag.
pub const UNDETERMINED_LANGUAGE: &str = "und";

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9-]+").expect("static regex"))
}

/// Reduce a language tag to a filesystem-safe path segment.
pub fn sanitize_language_tag(tag: Option<&str>) -> String {
    let tag = tag.map(str::trim).unwrap_or_default();
    if tag.is_empty() {
        return UNDETERMINED_LANGUAGE.to_string();
    }
    unsafe_chars().replace_all(tag, "-").into_owned()
}

fn video_stem(video_path: &Path) -> OsString {
    video_path.file_stem().map(OsStr::to_owned).unwrap_or_default()
}

/// `{stem}.a{index}.{lang}.{ext}`; the stem keeps its original bytes.
fn track_file_name(
    video_path: &Path,
    audio_index: usize,
    language: Option<&str>,
    ext: &str,
) -> OsString {
    let mut name = video_stem(video_path);
    name.push(format!(
        ".a{}.{}.{}",
        audio_index,
        sanitize_language_tag(language),
        ext
    ));
    name
}

/// `{output_dir}/{stem}.a{index}.{lang}.{format}`, or `explicit` verbatim.
pub fn extracted_audio_path(
    video_path: &Path,
    audio_index: usize,
    language: Option<&str>,
    format: AudioFormat,
    output_dir: &Path,
    explicit: Option<&Path>,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    output_dir.join(track_file_name(
        video_path,
        audio_index,
        language,
        format.extension(),
    ))
}

/// Transcript path for one track; the extension is fixed by the engine.
pub fn transcript_path(
    engine: Engine,
    output_dir: &Path,
    video_path: &Path,
    audio_index: usize,
    language: Option<&str>,
) -> PathBuf {
    output_dir.join(track_file_name(
        video_path,
        audio_index,
        language,
        engine.transcript_extension(),
    ))
}

/// Sibling directory named after the video, used by batch mode.
pub fn batch_output_dir(video_path: &Path) -> PathBuf {
    parent_dir(video_path).join(video_stem(video_path))
}

/// Directory containing `path`, `.` for bare file names.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Where the local engine will write its subtitle file.
///
/// The engine takes a directory and a name stem rather than a full path and
/// appends `.srt` itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalOutputTarget {
    pub output_dir: PathBuf,
    pub output_name: OsString,
    pub expected_path: PathBuf,
}

impl LocalOutputTarget {
    pub fn derive(audio_path: &Path, explicit: Option<&Path>) -> Self {
        let source = explicit.unwrap_or(audio_path);
        let output_dir = parent_dir(source);
        let output_name = source.file_stem().map(OsStr::to_owned).unwrap_or_default();
        let mut file_name = output_name.clone();
        file_name.push(".srt");
        let expected_path = output_dir.join(file_name);

        Self {
            output_dir,
            output_name,
            expected_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_language_tag() {
        assert_eq!(sanitize_language_tag(Some("eng")), "eng");
        assert_eq!(sanitize_language_tag(Some("pt-BR")), "pt-BR");
        assert_eq!(sanitize_language_tag(Some("  en US/x ")), "en-US-x");
        assert_eq!(sanitize_language_tag(Some("../etc")), "-etc");
        assert_eq!(sanitize_language_tag(Some("")), "und");
        assert_eq!(sanitize_language_tag(Some("   ")), "und");
        assert_eq!(sanitize_language_tag(None), "und");
    }

    #[test]
    fn test_sanitized_tag_charset() {
        for raw in ["日本語", "a_b", "x.y:z", "fr\tCA", "--"] {
            let tag = sanitize_language_tag(Some(raw));
            assert!(!tag.is_empty());
            assert!(
                tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'),
                "{raw:?} sanitized to {tag:?}"
            );
        }
    }

    #[test]
    fn test_extracted_audio_path() {
        let path = extracted_audio_path(
            Path::new("/media/movie.mkv"),
            2,
            Some("jpn"),
            AudioFormat::Wav,
            Path::new("/out"),
            None,
        );
        assert_eq!(path, PathBuf::from("/out/movie.a2.jpn.wav"));

        let path = extracted_audio_path(
            Path::new("clip.mp4"),
            0,
            None,
            AudioFormat::M4a,
            Path::new("."),
            None,
        );
        assert_eq!(path, PathBuf::from("./clip.a0.und.m4a"));
    }

    #[test]
    fn test_extracted_audio_path_is_deterministic() {
        let derive = || {
            extracted_audio_path(
                Path::new("/v/show.s01e01.mkv"),
                1,
                Some("en"),
                AudioFormat::Wav,
                Path::new("/v/out"),
                None,
            )
        };
        assert_eq!(derive(), derive());
        assert_eq!(derive(), PathBuf::from("/v/out/show.s01e01.a1.en.wav"));
    }

    #[test]
    fn test_explicit_override_is_verbatim() {
        let path = extracted_audio_path(
            Path::new("/media/movie.mkv"),
            3,
            Some("eng"),
            AudioFormat::Wav,
            Path::new("/out"),
            Some(Path::new("custom/name.whatever")),
        );
        assert_eq!(path, PathBuf::from("custom/name.whatever"));
    }

    #[test]
    fn test_transcript_path_per_engine() {
        let video = Path::new("/media/movie.mkv");
        let out = Path::new("/out");
        assert_eq!(
            transcript_path(Engine::Local, out, video, 1, Some("eng")),
            PathBuf::from("/out/movie.a1.eng.srt")
        );
        assert_eq!(
            transcript_path(Engine::Cloud, out, video, 1, Some("eng")),
            PathBuf::from("/out/movie.a1.eng.txt")
        );
    }

    #[test]
    fn test_distinct_tracks_never_collide() {
        let video = Path::new("/media/movie.mkv");
        let out = Path::new("/out");
        let a = extracted_audio_path(video, 0, Some("eng"), AudioFormat::Wav, out, None);
        let b = extracted_audio_path(video, 1, Some("eng"), AudioFormat::Wav, out, None);
        assert_ne!(a, b);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_stem_is_preserved() {
        use std::os::unix::ffi::OsStrExt;

        let video = Path::new("/media").join(OsStr::from_bytes(b"caf\xe9.mkv"));
        let audio = extracted_audio_path(&video, 0, Some("fra"), AudioFormat::Wav, Path::new("/out"), None);
        assert_eq!(audio.as_os_str().as_bytes(), b"/out/caf\xe9.a0.fra.wav");

        let target = LocalOutputTarget::derive(&audio, None);
        assert_eq!(target.output_name.as_bytes(), b"caf\xe9.a0.fra");
        assert_eq!(target.expected_path.as_os_str().as_bytes(), b"/out/caf\xe9.a0.fra.srt");

        assert_eq!(
            batch_output_dir(&video).as_os_str().as_bytes(),
            b"/media/caf\xe9"
        );
    }

    #[test]
    fn test_batch_output_dir() {
        assert_eq!(
            batch_output_dir(Path::new("/media/movie.mkv")),
            PathBuf::from("/media/movie")
        );
        assert_eq!(batch_output_dir(Path::new("movie.mkv")), PathBuf::from("./movie"));
    }

    #[test]
    fn test_local_output_target_from_audio() {
        let target = LocalOutputTarget::derive(Path::new("/tmp/a/movie.a0.eng.wav"), None);
        assert_eq!(target.output_dir, PathBuf::from("/tmp/a"));
        assert_eq!(target.output_name, "movie.a0.eng");
        assert_eq!(target.expected_path, PathBuf::from("/tmp/a/movie.a0.eng.srt"));
    }

    #[test]
    fn test_local_output_target_from_explicit() {
        let target = LocalOutputTarget::derive(
            Path::new("/tmp/a/movie.a0.eng.wav"),
            Some(Path::new("/subs/movie.a0.eng.srt")),
        );
        assert_eq!(target.output_dir, PathBuf::from("/subs"));
        assert_eq!(target.output_name, "movie.a0.eng");
        assert_eq!(target.expected_path, PathBuf::from("/subs/movie.a0.eng.srt"));

        let bare = LocalOutputTarget::derive(Path::new("x.wav"), Some(Path::new("notes")));
        assert_eq!(bare.output_dir, PathBuf::from("."));
        assert_eq!(bare.expected_path, PathBuf::from("./notes.srt"));
    }
}
