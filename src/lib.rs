//! # ryt-batch - polite batch downloader
//!
//! Reads a work list of named media URLs and fetches a video and an audio
//! rendition of each through yt-dlp, one item after another.
//!
//! ## Features
//!
//! - Randomized pauses and rotating browser identities between requests
//! - Bounded retries with linear backoff
//! - Filesystem-safe output names
//! - Failure report that doubles as a work list for the next run
//! - Optional cookie file for authenticated downloads
//!
//! ## Example
//!
//! ```rust,no_run
//! use ryt_batch::core::{BatchRunner, ItemWorkflow, OutputLayout, WorkItem};
//! use ryt_batch::engine::{EngineOptions, YtDlpEngine};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = Arc::new(YtDlpEngine::new(EngineOptions::default()));
//!     let workflow = ItemWorkflow::new(engine, OutputLayout::new("./downloads"));
//!     let runner = BatchRunner::new(workflow);
//!
//!     let items = vec![WorkItem::new("lesson_1", "VIDEO_URL")];
//!     let result = runner.run(&items).await;
//!     println!("{} ok, {} failed", result.success_count, result.failure_count);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod download;
pub mod engine;
pub mod error;
pub mod utils;

// Re-export main types
pub use crate::config::AppConfig;
pub use crate::core::{BatchResult, BatchRunner, ItemReport, ItemWorkflow, WorkItem};
pub use crate::engine::{MediaEngine, YtDlpEngine};
pub use crate::error::{BatchError, ConfigError, EngineError};
