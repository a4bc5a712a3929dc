pub mod extract;
pub mod probe;

pub use extract::{extract_audio, extraction_args};
pub use probe::{get_audio_tracks, parse_probe_output, probe_args};

use std::fmt;

/// One audio stream inside a video container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackDescriptor {
    /// Position among audio streams only; this is what `--track` refers to.
    pub audio_index: usize,
    /// Container-global stream index, informational only.
    pub stream_index: Option<u32>,
    pub codec: Option<String>,
    pub channels: Option<u32>,
    pub channel_layout: Option<String>,
    pub language: Option<String>,
    pub title: Option<String>,
}

impl fmt::Display for TrackDescriptor {
    /// `track=0 | stream=1 | codec=aac | ...`, absent fields omitted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![format!("track={}", self.audio_index)];

        if let Some(stream) = self.stream_index {
            parts.push(format!("stream={stream}"));
        }
        if let Some(codec) = non_empty(&self.codec) {
            parts.push(format!("codec={codec}"));
        }
        if let Some(channels) = self.channels.filter(|&c| c > 0) {
            parts.push(format!("channels={channels}"));
        }
        if let Some(layout) = non_empty(&self.channel_layout) {
            parts.push(format!("layout={layout}"));
        }
        if let Some(lang) = non_empty(&self.language) {
            parts.push(format!("lang={lang}"));
        }
        if let Some(title) = non_empty(&self.title) {
            parts.push(format!("title={title}"));
        }

        f.write_str(&parts.join(" | "))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
