//! In-memory engine for workflow and batch tests

use crate::core::workflow::{ItemWorkflow, OutputLayout};
use crate::download::{RetryConfig, RetryExecutor, Throttle};
use crate::engine::{FetchRequest, MediaEngine, MediaKind, MediaMetadata};
use crate::error::EngineError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the mock answers requests for one URL
#[derive(Debug, Clone)]
pub enum Behavior {
    Succeed,
    Fail,
    /// Fail the first n calls for the URL, whatever the kind
    FailTimes(u32),
    /// Fail only this rendition
    FailKind(MediaKind),
    /// Succeed after sleeping
    Slow(Duration),
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub kind: MediaKind,
    pub output_stem: PathBuf,
    pub user_agent: Option<String>,
    /// Tokio clock reading at call time; virtual under a paused clock
    pub at: tokio::time::Instant,
}

#[derive(Default)]
pub struct MockEngine {
    behaviors: HashMap<String, Behavior>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(mut self, url: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(url.to_string(), behavior);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, kind: MediaKind) -> usize {
        self.calls().iter().filter(|call| call.kind == kind).count()
    }

    pub fn calls_for_url(&self, url: &str) -> usize {
        self.calls().iter().filter(|call| call.url == url).count()
    }
}

fn failed(message: &str) -> EngineError {
    EngineError::Failed {
        program: "mock".to_string(),
        status: "exit status: 1".to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl MediaEngine for MockEngine {
    async fn fetch(&self, request: &FetchRequest) -> Result<MediaMetadata, EngineError> {
        let previous = {
            let mut calls = self.calls.lock().unwrap();
            let previous = calls.iter().filter(|call| call.url == request.url).count() as u32;
            calls.push(RecordedCall {
                url: request.url.clone(),
                kind: request.kind,
                output_stem: request.output_stem.clone(),
                user_agent: request.headers.user_agent().map(str::to_string),
                at: tokio::time::Instant::now(),
            });
            previous
        };

        let metadata = MediaMetadata {
            title: Some(request.url.clone()),
            ..Default::default()
        };

        match self.behaviors.get(&request.url).cloned().unwrap_or(Behavior::Succeed) {
            Behavior::Succeed => Ok(metadata),
            Behavior::Fail => Err(failed("ERROR: always fails")),
            Behavior::FailTimes(n) if previous < n => Err(failed("ERROR: transient")),
            Behavior::FailTimes(_) => Ok(metadata),
            Behavior::FailKind(kind) if kind == request.kind => Err(failed("ERROR: kind fails")),
            Behavior::FailKind(_) => Ok(metadata),
            Behavior::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(metadata)
            }
        }
    }
}

/// Workflow with no pauses and no backoff, writing under a throwaway root
pub fn instant_workflow(engine: Arc<MockEngine>, max_attempts: u32) -> ItemWorkflow {
    ItemWorkflow::new(engine, OutputLayout::new("test-downloads"))
        .with_throttle(Throttle::disabled())
        .with_retry(RetryExecutor::with_config(RetryConfig {
            max_attempts,
            retry_delay: Duration::ZERO,
        }))
}
