//! Output formatting and batch progress display

use crate::cli::args::VerbosityLevel;
use crate::config::AppConfig;
use crate::core::{BatchObserver, BatchResult, ItemReport, WorkItem};
use crate::download::Throttle;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// Settings echoed before the batch starts
#[derive(Debug, Clone)]
pub struct RunSettings<'a> {
    pub config: &'a AppConfig,
    pub throttle: &'a Throttle,
    pub workers: usize,
    pub authenticated: bool,
    pub items: usize,
    pub skipped: usize,
}

/// Output formatter for ryt-batch
pub struct OutputFormatter {
    verbosity: VerbosityLevel,
    progress_bar: Mutex<Option<ProgressBar>>,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            progress_bar: Mutex::new(None),
        }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    fn bar(&self) -> Option<ProgressBar> {
        self.progress_bar.lock().ok().and_then(|bar| bar.clone())
    }

    /// Print above the progress bar when one is active
    fn line(&self, message: String) {
        match self.bar() {
            Some(bar) => bar.println(message),
            None => println!("{}", message),
        }
    }

    /// Create a progress bar over the work items
    pub fn create_progress_bar(&self, total: u64) -> Option<ProgressBar> {
        if self.verbosity == VerbosityLevel::Quiet {
            return None;
        }

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let progress_bar = ProgressBar::new(total);
        progress_bar.set_style(style);
        progress_bar.enable_steady_tick(Duration::from_millis(120));

        if let Ok(mut slot) = self.progress_bar.lock() {
            *slot = Some(progress_bar.clone());
        }
        Some(progress_bar)
    }

    /// Finish and remove the progress bar
    pub fn finish_progress(&self) {
        let bar = self.progress_bar.lock().ok().and_then(|mut slot| slot.take());
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            self.line(format!("ℹ️  {}", message));
        }
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            self.line(format!("✅ {}", message.green()));
        }
    }

    /// Print warning message
    pub fn warning(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            eprintln!("⚠️  {}", message.yellow());
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("❌ {}", message.red());
    }

    /// Print debug message
    pub fn debug(&self, message: &str) {
        if self.verbosity == VerbosityLevel::Verbose {
            self.line(format!("🐛 {}", message));
        }
    }

    /// Print the program banner
    pub fn print_banner(&self) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        println!("{}", format!("RYT Batch v{}", env!("CARGO_PKG_VERSION")).bold());
        println!("{}", "=".repeat(50));
    }

    /// Print anti-throttling settings and the work list size
    pub fn print_settings(&self, settings: &RunSettings<'_>) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        println!();
        println!("⚙️  Settings:");
        println!(
            "  ⏳ Request delay: {:.1}-{:.1}s",
            settings.throttle.min_delay().as_secs_f64(),
            settings.throttle.max_delay().as_secs_f64()
        );
        println!("  🚦 Rate limit: {}", settings.config.rate_limit_display());
        println!(
            "  🔁 Attempts: {} (backoff {}s)",
            settings.config.max_retries.max(1),
            settings.config.retry_delay
        );
        println!("  🕵️  User-Agent pool: {}", settings.throttle.user_agent_count());
        println!("  👷 Workers: {}", settings.workers);
        if let Some(proxy) = &settings.config.proxy {
            println!("  🌐 Proxy: {}", proxy);
        }
        println!(
            "  🍪 Cookies: {}",
            if settings.authenticated { "yes" } else { "no (public videos only)" }
        );
        println!();
        if settings.skipped > 0 {
            println!(
                "📋 {} item(s) to download, {} malformed line(s) skipped",
                settings.items, settings.skipped
            );
        } else {
            println!("📋 {} item(s) to download", settings.items);
        }
    }

    /// Print the final tally
    pub fn print_summary(&self, result: &BatchResult, elapsed: Duration, report: &Path) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        println!();
        println!("{}", "=".repeat(50));
        println!("🏁 Finished {} item(s)", result.total());
        println!("  {} {}", "Succeeded:".green(), result.success_count);
        println!("  {} {}", "Failed:".red(), result.failure_count);
        if result.failure_count > 0 {
            println!("  📝 Failed items saved to {}", report.display());
        }
        println!("⏱️  Time: {}", format_elapsed(elapsed));
    }
}

impl BatchObserver for OutputFormatter {
    fn batch_started(&self, total: usize) {
        self.create_progress_bar(total as u64);
    }

    fn item_started(&self, index: usize, total: usize, item: &WorkItem) {
        if let Some(bar) = self.bar() {
            bar.set_message(item.display_name.clone());
        }
        self.debug(&format!("[{}/{}] Starting {} ({})", index, total, item, item.source_url));
    }

    fn item_finished(&self, index: usize, total: usize, report: &ItemReport, tally: &BatchResult) {
        match report.failure_summary() {
            None => self.success(&format!("[{}/{}] {}", index, total, report.item)),
            Some(summary) => {
                if self.verbosity != VerbosityLevel::Quiet {
                    self.line(format!(
                        "❌ {} {}",
                        format!("[{}/{}] {}", index, total, report.item).red(),
                        summary
                    ));
                }
            }
        }

        if let Some(bar) = self.bar() {
            bar.inc(1);
        }
        self.debug(&format!(
            "Tally: {} succeeded, {} failed",
            tally.success_count, tally.failure_count
        ));
    }

    fn batch_finished(&self, _result: &BatchResult) {
        self.finish_progress();
    }
}

/// Format elapsed time, rounded to whole seconds
fn format_elapsed(elapsed: Duration) -> String {
    humantime::format_duration(Duration::from_secs(elapsed.as_secs())).to_string()
}
