//! Per-item download workflow: video, then audio

use crate::core::work_item::WorkItem;
use crate::download::{RetryExecutor, Throttle};
use crate::engine::{FetchRequest, MediaEngine, MediaKind, MediaMetadata};
use crate::error::{BatchError, EngineError};
use crate::utils::output_stem;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Result of one rendition after retries
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    Success(MediaMetadata),
    Failure(String),
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success(_))
    }

    /// Failure reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            DownloadOutcome::Success(_) => None,
            DownloadOutcome::Failure(reason) => Some(reason),
        }
    }
}

impl From<Result<MediaMetadata, EngineError>> for DownloadOutcome {
    fn from(result: Result<MediaMetadata, EngineError>) -> Self {
        match result {
            Ok(metadata) => DownloadOutcome::Success(metadata),
            Err(e) => DownloadOutcome::Failure(e.reason()),
        }
    }
}

/// Outcome of both renditions of one item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub item: WorkItem,
    pub video: DownloadOutcome,
    pub audio: DownloadOutcome,
}

impl ItemReport {
    /// An item succeeds only when both the video and the audio succeeded
    pub fn is_success(&self) -> bool {
        self.video.is_success() && self.audio.is_success()
    }

    /// Which halves failed and why; `None` on success
    pub fn failure_summary(&self) -> Option<String> {
        let parts: Vec<String> = [(MediaKind::Video, &self.video), (MediaKind::Audio, &self.audio)]
            .iter()
            .filter_map(|(kind, outcome)| outcome.reason().map(|reason| format!("{}: {}", kind, reason)))
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

/// Output directory tree: `<root>/videos` and `<root>/audio`
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn dir_for(&self, kind: MediaKind) -> PathBuf {
        self.root.join(kind.subdir())
    }

    /// Output path without extension for an item's rendition
    pub fn stem_for(&self, kind: MediaKind, display_name: &str) -> PathBuf {
        self.dir_for(kind).join(output_stem(display_name))
    }

    /// Create the root and both subdirectories
    pub fn ensure(&self) -> Result<(), BatchError> {
        for dir in [self.dir_for(MediaKind::Video), self.dir_for(MediaKind::Audio)] {
            fs::create_dir_all(&dir).map_err(|source| BatchError::OutputDir { path: dir.clone(), source })?;
        }
        Ok(())
    }
}

/// Runs one work item through pacing, retries and both engine calls
pub struct ItemWorkflow {
    engine: Arc<dyn MediaEngine>,
    layout: OutputLayout,
    throttle: Throttle,
    retry: RetryExecutor,
}

impl ItemWorkflow {
    /// Create a workflow with default pacing and retries
    pub fn new(engine: Arc<dyn MediaEngine>, layout: OutputLayout) -> Self {
        Self {
            engine,
            layout,
            throttle: Throttle::default(),
            retry: RetryExecutor::new(),
        }
    }

    /// Set the randomizer
    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryExecutor) -> Self {
        self.retry = retry;
        self
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Pause, fetch video, pause, fetch audio.
    ///
    /// Both halves are always attempted, even when the video failed.
    pub async fn process(&self, item: &WorkItem) -> ItemReport {
        info!("Processing {} ({})", item.display_name, item.source_url);

        self.throttle.pause().await;
        let video = self.fetch(item, MediaKind::Video).await;

        self.throttle.pause().await;
        let audio = self.fetch(item, MediaKind::Audio).await;

        ItemReport {
            item: item.clone(),
            video,
            audio,
        }
    }

    async fn fetch(&self, item: &WorkItem, kind: MediaKind) -> DownloadOutcome {
        let output_stem = self.layout.stem_for(kind, &item.display_name);
        let label = format!("{} download of {}", kind, item.display_name);

        info!("Downloading {}: {}", kind, item.display_name);
        let result = self
            .retry
            .execute(&label, || {
                // Fresh identity for every attempt
                let request = FetchRequest {
                    url: item.source_url.clone(),
                    kind,
                    output_stem: output_stem.clone(),
                    headers: self.throttle.headers(),
                };
                async move { self.engine.fetch(&request).await }
            })
            .await;

        match &result {
            Ok(_) => info!("Finished {}: {}", kind, item.display_name),
            Err(e) => error!("Giving up on {} for {}: {}", kind, item.display_name, e),
        }

        result.into()
    }
}
