//! Delegated download engine
//!
//! The engine performs extraction, format negotiation and transcoding.
//! The batch core only decides what to fetch, where to put it and when.

pub mod ytdlp;

use crate::download::HeaderSet;
use crate::error::EngineError;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

pub use ytdlp::{EngineOptions, YtDlpEngine};

/// Which rendition of an item to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Video with embedded subtitles, muxed to mp4
    Video,
    /// Audio only, converted to mp3
    Audio,
}

impl MediaKind {
    /// Output subdirectory for this rendition
    pub fn subdir(&self) -> &'static str {
        match self {
            MediaKind::Video => "videos",
            MediaKind::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

/// One call to the engine
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Source page URL
    pub url: String,
    /// Rendition to fetch
    pub kind: MediaKind,
    /// Output path without extension; the engine appends it
    pub output_stem: PathBuf,
    /// Request headers for this call
    pub headers: HeaderSet,
}

/// Metadata reported by the engine for a finished download
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaMetadata {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    /// Final file name chosen by the engine
    #[serde(default)]
    pub filename: Option<String>,
}

impl MediaMetadata {
    /// Parse the first JSON object line of engine output; `None` if there is none
    pub fn from_engine_output(stdout: &str) -> Option<Self> {
        stdout
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with('{'))
            .find_map(|line| serde_json::from_str(line).ok())
    }
}

/// External program or library that performs the actual download
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Fetch one rendition; `Ok` only when the file was produced
    async fn fetch(&self, request: &FetchRequest) -> Result<MediaMetadata, EngineError>;
}
