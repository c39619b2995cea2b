//! Batch driver: run every work item, tally, report failures

use crate::core::work_item::{parse_work_list, ParsedList, WorkItem};
use crate::core::workflow::{ItemReport, ItemWorkflow};
use crate::error::BatchError;
use futures::stream::{self, StreamExt};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Default work list file name
pub const DEFAULT_LIST_FILE: &str = "videos.txt";
/// Default failure report file name
pub const DEFAULT_REPORT_FILE: &str = "failed_videos.txt";

/// Tally of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub success_count: usize,
    pub failure_count: usize,
    /// Failed items in list order
    pub failed_items: Vec<WorkItem>,
}

impl BatchResult {
    /// Count one finished item
    pub fn record(&mut self, report: &ItemReport) {
        if report.is_success() {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
            self.failed_items.push(report.item.clone());
        }
    }

    /// Items attempted so far
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }

    /// Report file content: one `name url` line per failed item
    pub fn failure_report(&self) -> String {
        self.failed_items
            .iter()
            .map(|item| item.to_line() + "\n")
            .collect()
    }
}

/// Receives batch progress; passed in explicitly so callers choose the presentation
pub trait BatchObserver: Send + Sync {
    fn batch_started(&self, _total: usize) {}

    /// `index` is 1-based
    fn item_started(&self, _index: usize, _total: usize, _item: &WorkItem) {}

    /// `index` is 1-based and counts finished items
    fn item_finished(&self, _index: usize, _total: usize, _report: &ItemReport, _tally: &BatchResult) {}

    fn batch_finished(&self, _result: &BatchResult) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl BatchObserver for SilentObserver {}

/// Read and parse a work list file
pub fn load_work_list(path: &Path) -> Result<ParsedList, BatchError> {
    if !path.exists() {
        return Err(BatchError::ListNotFound(path.to_path_buf()));
    }

    let text = fs::read_to_string(path).map_err(|source| BatchError::ReadList {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = parse_work_list(&text);
    info!(
        "Found {} item(s) in {} ({} malformed line(s) skipped)",
        parsed.items.len(),
        path.display(),
        parsed.skipped.len()
    );
    Ok(parsed)
}

/// Overwrite the failure report; an empty file means nothing failed
pub fn write_failure_report(path: &Path, result: &BatchResult) -> Result<(), BatchError> {
    fs::write(path, result.failure_report()).map_err(|source| BatchError::WriteReport {
        path: path.to_path_buf(),
        source,
    })?;

    if result.failed_items.is_empty() {
        info!("No failures, cleared {}", path.display());
    } else {
        info!(
            "{} failed item(s) saved to {}",
            result.failed_items.len(),
            path.display()
        );
    }
    Ok(())
}

/// Drives work items through the workflow
pub struct BatchRunner {
    workflow: ItemWorkflow,
    workers: usize,
    observer: Arc<dyn BatchObserver>,
}

impl BatchRunner {
    /// Create a sequential runner with no observer
    pub fn new(workflow: ItemWorkflow) -> Self {
        Self {
            workflow,
            workers: 1,
            observer: Arc::new(SilentObserver),
        }
    }

    /// Items in flight at once; values below 1 mean 1
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn BatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Run every item; item failures never stop the batch.
    ///
    /// Results are consumed in list order regardless of the worker count.
    pub async fn run(&self, items: &[WorkItem]) -> BatchResult {
        let total = items.len();
        info!("Processing {} item(s) with {} worker(s)", total, self.workers);
        self.observer.batch_started(total);

        let mut result = BatchResult::default();
        let mut reports = stream::iter(items.iter().enumerate())
            .map(|(index, item)| async move {
                self.observer.item_started(index + 1, total, item);
                self.workflow.process(item).await
            })
            .buffered(self.workers);

        let mut finished = 0;
        while let Some(report) = reports.next().await {
            finished += 1;
            result.record(&report);

            match report.failure_summary() {
                None => info!("[{}/{}] Downloaded {}", finished, total, report.item),
                Some(summary) => error!("[{}/{}] Failed {}: {}", finished, total, report.item, summary),
            }
            info!(
                "Tally so far: {} succeeded, {} failed",
                result.success_count, result.failure_count
            );

            self.observer.item_finished(finished, total, &report, &result);
        }

        info!(
            "Batch finished: {} succeeded, {} failed",
            result.success_count, result.failure_count
        );
        self.observer.batch_finished(&result);
        result
    }

    /// Load the list, run it and write the failure report
    pub async fn run_file(&self, list: &Path, report: &Path) -> Result<BatchResult, BatchError> {
        let parsed = load_work_list(list)?;
        let result = self.run(&parsed.items).await;
        write_failure_report(report, &result)?;
        Ok(result)
    }
}
