use anyhow::{bail, Context, Result};
use duplexer_config::{DuplexerConfig, ReadinessPolicy};
use duplexer_pdf::PdfDuplexer;
use duplexer_pipeline::fs_ops::ensure_dir;
use duplexer_pipeline::{Pipeline, PipelineConfig};
use duplexer_watch::{Watcher, WatcherOptions};
use std::sync::Arc;
use tracing::info;

use crate::cli::WatchArgs;
use crate::signal;

pub async fn execute(args: WatchArgs) -> Result<()> {
    let config = DuplexerConfig::load(args.config.as_deref(), &args.overrides())
        .context("Failed to load configuration")?;
    log_config(&config);

    let input_dir = &config.paths.input_dir;
    if !input_dir.is_dir() {
        bail!("Input directory does not exist: {}", input_dir.display());
    }
    for dir in [
        config.paths.output_dir.clone(),
        config.paths.archive_dir(),
        config.paths.failed_dir(),
    ] {
        ensure_dir(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let document = Arc::new(PdfDuplexer::from_settings(&config.transform));
    let pipeline = Arc::new(Pipeline::new(PipelineConfig::from_config(&config), document));
    let stale = pipeline.remove_stale_staging();
    if stale > 0 {
        info!("Removed {} stale staged output(s)", stale);
    }
    let watcher = Arc::new(Watcher::new(WatcherOptions::from_config(&config), pipeline)?);

    if args.once {
        let scanner = Arc::clone(&watcher);
        let count = tokio::task::spawn_blocking(move || scanner.scan_once())
            .await
            .context("Scan task failed")??;
        info!("Processed {} file(s)", count);
        return Ok(());
    }

    let signals = tokio::spawn(signal::stop_on_signal(watcher.stop_handle()));
    let result = watcher.run().await;
    signals.abort();
    result?;
    Ok(())
}

fn log_config(config: &DuplexerConfig) {
    info!("Watching {}", config.paths.input_dir.display());
    info!("  output:        {}", config.paths.output_dir.display());
    info!("  archive:       {}", config.paths.archive_dir().display());
    info!("  failed:        {}", config.paths.failed_dir().display());
    info!("  pattern:       {}", config.watch.pattern);
    match config.readiness_policy() {
        ReadinessPolicy::Stability { window } => {
            info!("  readiness:     stable for {:.1}s", window.as_secs_f64())
        }
        ReadinessPolicy::Marker => info!("  readiness:     <file>.ready marker"),
    }
    info!("  reverse backs: {}", config.transform.reverse_backs);
    info!("  blank back:    {}", config.transform.insert_blank_lastback);
    info!("  suffix:        {}", config.transform.output_suffix);
    if config.watch.force_polling {
        info!(
            "  backend:       polling every {:.1}s",
            config.watch.poll_interval_seconds
        );
    } else {
        info!("  backend:       native, polling fallback");
    }
}
