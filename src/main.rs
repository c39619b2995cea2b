//! Main entry point for ryt-batch CLI

use anyhow::{Context, Result};
use clap::Parser;
use ryt_batch::cli::{
    confirm_stdin, run_until_interrupted, Args, OutputFormatter, RunSettings, VerbosityLevel,
};
use ryt_batch::config::{AppConfig, ConfigSource};
use ryt_batch::core::{
    load_work_list, sample_work_list, write_failure_report, BatchRunner, ItemWorkflow, OutputLayout,
};
use ryt_batch::download::RetryExecutor;
use ryt_batch::engine::{EngineOptions, YtDlpEngine};
use ryt_batch::utils::{detect_cookie_file, ensure_cookie_guide};
use std::fs;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    if let Err(e) = init_logging(&args) {
        init_console_logging(args.verbosity_level());
        warn!("Log file unavailable, logging to console only: {:#}", e);
    }

    info!("Starting ryt-batch with args: {:?}", args);

    let formatter = Arc::new(OutputFormatter::new(args.verbosity_level()));
    formatter.print_banner();

    let outcome = run_until_interrupted(run(&args, formatter.clone()), tokio::signal::ctrl_c())
        .context("failed to start async runtime")
        .and_then(|finished| match finished {
            Some(result) => result.map(|()| true),
            None => Ok(false),
        });

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            formatter.finish_progress();
            warn!("Interrupted by user");
            formatter.warning("Interrupted, stopping");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Fatal error: {:?}", e);
            formatter.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Prepare files, confirm with the user and run the batch
async fn run(args: &Args, formatter: Arc<OutputFormatter>) -> Result<()> {
    if let Err(e) = ensure_cookie_guide(&args.cookie_guide_path()) {
        warn!("Could not write cookie guide: {}", e);
    }

    let (config, source) = AppConfig::load_or_create(&args.config);
    match source {
        ConfigSource::Created => formatter.info(&format!(
            "Created default config {}; edit it to tune delays, proxy and rate limit",
            args.config.display()
        )),
        ConfigSource::Fallback => formatter.warning(&format!(
            "Could not use {}, running with defaults",
            args.config.display()
        )),
        ConfigSource::Loaded => {}
    }

    let cookies = detect_cookie_file(&args.cookies)
        .with_context(|| format!("failed to read cookie file {}", args.cookies.display()))?;
    match &cookies {
        Some(found) => {
            info!("Using cookies from {} ({} records)", found.path.display(), found.records);
        }
        None => {
            warn!(
                "No {} found, only public videos can be downloaded (see {})",
                args.cookies.display(),
                args.cookie_guide_path().display()
            );
        }
    }

    if !args.list.exists() {
        fs::write(&args.list, sample_work_list())
            .with_context(|| format!("failed to create {}", args.list.display()))?;
        info!("Created sample work list {}", args.list.display());
        formatter.info(&format!(
            "Created {}; add one `name url` per line and run again",
            args.list.display()
        ));
        return Ok(());
    }

    let program = YtDlpEngine::locate(&args.yt_dlp)
        .context("yt-dlp is required; install it or pass --yt-dlp <path>")?;

    let parsed = load_work_list(&args.list)?;
    let throttle = config.throttle();
    let workers = args.workers.unwrap_or(config.max_workers).max(1);

    formatter.print_settings(&RunSettings {
        config: &config,
        throttle: &throttle,
        workers,
        authenticated: cookies.is_some(),
        items: parsed.items.len(),
        skipped: parsed.skipped.len(),
    });

    if parsed.items.is_empty() {
        formatter.info("Nothing to download");
        return Ok(());
    }

    if !args.yes {
        let confirmed = tokio::task::spawn_blocking(|| confirm_stdin("Start downloading?"))
            .await
            .context("confirmation prompt failed")??;
        if !confirmed {
            info!("Cancelled by user");
            formatter.info("Cancelled");
            return Ok(());
        }
    }

    let layout = OutputLayout::new(&args.output);
    layout.ensure()?;

    let engine = YtDlpEngine::new(EngineOptions {
        program,
        cookies: cookies.map(|found| found.path),
        proxy: config.proxy.clone(),
        rate_limit: config.rate_limit.clone(),
        network_retries: config.max_retries,
        extra_args: config.engine_args.clone(),
        ..Default::default()
    });

    let workflow = ItemWorkflow::new(Arc::new(engine), layout)
        .with_throttle(throttle)
        .with_retry(RetryExecutor::with_config(config.retry_config()));

    let runner = BatchRunner::new(workflow)
        .with_workers(workers)
        .with_observer(formatter.clone());

    let started = Instant::now();
    let result = runner.run(&parsed.items).await;
    write_failure_report(&args.report, &result)?;

    let elapsed = started.elapsed();
    info!("Total time: {:.1} minutes", elapsed.as_secs_f64() / 60.0);
    formatter.print_summary(&result, elapsed, &args.report);

    Ok(())
}

/// Console filter for the chosen verbosity
fn console_level(verbosity: VerbosityLevel) -> LevelFilter {
    match verbosity {
        VerbosityLevel::Quiet => LevelFilter::ERROR,
        VerbosityLevel::Normal => LevelFilter::WARN,
        VerbosityLevel::Verbose => LevelFilter::DEBUG,
    }
}

/// Initialize logging to the console and the append-only log file
fn init_logging(args: &Args) -> Result<()> {
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.log_file)
        .with_context(|| format!("failed to open log file {}", args.log_file.display()))?;

    // Get log level from environment or default to info
    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .with_filter(console_level(args.verbosity_level())),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;

    info!("Logging to {}", args.log_file.display());
    Ok(())
}

/// Console-only logging, used when the log file cannot be opened
fn init_console_logging(verbosity: VerbosityLevel) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .with_filter(console_level(verbosity)),
        )
        .try_init();
}
