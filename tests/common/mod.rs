//! Scripted stand-in for FFprobe, FFmpeg and the local engine.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use vidtranscribe::config::Config;
use vidtranscribe::pipeline::Context;
use vidtranscribe::process::{CommandOutput, CommandRunner};

pub const SRT_BODY: &str = "1\n00:00:00,000 --> 00:00:01,000\nhello\n";

#[derive(Default)]
pub struct FakeRunner {
    available: HashSet<String>,
    /// Probe JSON keyed by video file name.
    probes: HashMap<String, String>,
    /// Substrings of paths whose extraction fails.
    failing_extractions: Vec<String>,
    /// Substrings of audio paths whose transcription fails.
    failing_transcriptions: Vec<String>,
    /// Local engine exits 0 without writing anything.
    silent_engine: bool,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeRunner {
    /// All three tools on `PATH`.
    pub fn new() -> Self {
        Self::default().with_tools(&["ffprobe", "ffmpeg", "mlx_whisper"])
    }

    pub fn with_tools(mut self, tools: &[&str]) -> Self {
        self.available = tools.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_probe(mut self, video_name: &str, json: &str) -> Self {
        self.probes.insert(video_name.to_string(), json.to_string());
        self
    }

    pub fn fail_extraction_for(mut self, needle: &str) -> Self {
        self.failing_extractions.push(needle.to_string());
        self
    }

    pub fn fail_transcription_for(mut self, needle: &str) -> Self {
        self.failing_transcriptions.push(needle.to_string());
        self
    }

    pub fn silent_engine(mut self) -> Self {
        self.silent_engine = true;
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|(p, _)| p == program)
            .map(|(_, args)| args)
            .collect()
    }

    fn probe(&self, args: &[String]) -> CommandOutput {
        let video = args.last().cloned().unwrap_or_default();
        let name = Path::new(&video)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let json = self
            .probes
            .get(&name)
            .cloned()
            .unwrap_or_else(|| r#"{"streams": []}"#.to_string());
        ok(json)
    }

    fn extract(&self, raw: &[OsString], args: &[String]) -> CommandOutput {
        let output = PathBuf::from(raw.last().cloned().unwrap_or_default());
        let joined = args.join(" ");
        if self.failing_extractions.iter().any(|n| joined.contains(n)) {
            return failed("Stream map '0:a:9' matches no streams.");
        }
        std::fs::write(&output, b"RIFF").unwrap();
        ok(String::new())
    }

    fn transcribe(&self, raw: &[OsString], args: &[String]) -> CommandOutput {
        let audio = &args[0];
        if self.failing_transcriptions.iter().any(|n| audio.contains(n)) {
            return failed("model crashed");
        }
        if self.silent_engine {
            return ok(String::new());
        }
        let value = |flag: &str| {
            let pos = raw.iter().position(|a| a == flag).unwrap();
            raw[pos + 1].clone()
        };
        let mut file_name = value("--output-name");
        file_name.push(".srt");
        let srt = PathBuf::from(value("--output-dir")).join(file_name);
        std::fs::write(srt, SRT_BODY).unwrap();
        ok(String::new())
    }
}

fn ok(stdout: String) -> CommandOutput {
    CommandOutput {
        status: Some(0),
        stdout,
        stderr: String::new(),
    }
}

fn failed(stderr: &str) -> CommandOutput {
    CommandOutput {
        status: Some(1),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.available
            .contains(program)
            .then(|| PathBuf::from("/usr/local/bin").join(program))
    }

    async fn run(&self, program: &str, raw: &[OsString]) -> std::io::Result<CommandOutput> {
        let args: Vec<String> = raw.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.clone()));

        Ok(match program {
            "ffprobe" => self.probe(&args),
            "ffmpeg" => self.extract(raw, &args),
            "mlx_whisper" => self.transcribe(raw, &args),
            other => panic!("unexpected program {other}"),
        })
    }
}

pub const TWO_TRACKS: &str = r#"{
    "streams": [
        { "index": 1, "codec_name": "aac", "channels": 2, "channel_layout": "stereo",
          "tags": { "language": "eng", "title": "Main" } },
        { "index": 2, "codec_name": "ac3", "channels": 6, "channel_layout": "5.1(side)",
          "tags": { "language": "jpn" } }
    ]
}"#;

pub const ONE_UNTAGGED_TRACK: &str = r#"{ "streams": [ { "index": 0, "codec_name": "opus" } ] }"#;

pub fn context(runner: &Arc<FakeRunner>, config: Config) -> Context {
    Context::new(config)
        .with_runner(runner.clone())
        .with_progress(false)
}

/// Create an empty file named `name` inside `dir`.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"").unwrap();
    path
}

pub fn lines(buf: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(buf)
        .lines()
        .map(str::to_string)
        .collect()
}
