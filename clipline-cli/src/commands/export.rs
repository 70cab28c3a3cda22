//! Implementation of the 'export' subcommand.
//!
//! Loads a clip plan, builds the ordered export batch, runs it sequentially
//! through the core pipeline, writes the resume manifest, and optionally
//! sends a completion notification.

use std::fs;
use std::sync::Arc;

use clipline_core::{
    batch_from_clips, check_dependency, format_media_time, probe_media, BatchSummary, ClipPlan,
    CoreConfig, CoreError, EventDispatcher, ExportBatch, ItemOutcome, Notifier, NtfyNotifier,
};
use log::{debug, warn};

use crate::cli::ExportArgs;
use crate::error::CliResult;
use crate::logging::get_timestamp;
use crate::progress::ProgressDisplay;
use crate::terminal;

fn create_config(args: &ExportArgs) -> CliResult<CoreConfig> {
    let mut config = CoreConfig::new(args.output_dir.clone());
    if let Some(encoder) = &args.encoder {
        config.encoder_program = encoder.clone();
    }
    config.encode_copy_streams = !args.reencode;
    config.ntfy_topic = args.ntfy.clone();
    config.validate()?;
    Ok(config)
}

fn display_summary(summary: &BatchSummary) {
    terminal::print_section("EXPORT COMPLETE");
    terminal::print_status(
        "Exported",
        &format!("{} of {} clips", summary.succeeded_count, summary.items.len()),
        summary.all_succeeded(),
    );
    if summary.failed_count > 0 {
        terminal::print_status("Failed", &summary.failed_count.to_string(), false);
        for item in summary.failed_items() {
            if let ItemOutcome::Failed(reason) = &item.outcome {
                terminal::print_subsection(&item.item_id);
                terminal::print_status("Reason", reason, false);
            }
        }
    }
    let pending = summary
        .items
        .iter()
        .filter(|i| i.outcome == ItemOutcome::Pending)
        .count();
    if pending > 0 {
        terminal::print_status("Skipped", &format!("{pending} (not started)"), false);
    }
}

fn notify_completion(config: &CoreConfig, summary: &BatchSummary) {
    let Some(topic) = &config.ntfy_topic else {
        return;
    };
    let message = format!(
        "{} of {} clips exported, {} failed",
        summary.succeeded_count,
        summary.items.len(),
        summary.failed_count
    );
    let priority = if summary.failed_count > 0 { 4 } else { 3 };
    let result = NtfyNotifier::new().and_then(|notifier| {
        notifier.send(topic, &message, Some("clipline export"), Some(priority))
    });
    if let Err(e) = result {
        // A notification failure never fails the export itself.
        warn!("Failed to send completion notification: {e}");
    }
}

/// Runs the export batch and reports results.
pub fn run_export(args: ExportArgs) -> CliResult<()> {
    let config = create_config(&args)?;

    fs::create_dir_all(&config.output_dir).map_err(|e| {
        CoreError::PathError(format!(
            "Failed to create output directory '{}': {e}",
            config.output_dir.display()
        ))
    })?;

    // Items come from a previous run's manifest when resuming, otherwise
    // from the clip plan.
    let items = if let Some(manifest_path) = &args.resume {
        let manifest = BatchSummary::load(manifest_path)?;
        terminal::print_status(
            "Resuming",
            &format!(
                "{} of {} clips already exported",
                manifest.succeeded_count,
                manifest.items.len()
            ),
            false,
        );
        manifest.items
    } else {
        let plan = ClipPlan::load(&args.plan_path)?;
        // Probing is informational here; the plan already carries what the
        // batch needs.
        let probed_duration = match probe_media(&plan.source) {
            Ok(summary) => summary.duration_secs,
            Err(e) => {
                warn!("Media probe failed: {e}");
                None
            }
        };

        terminal::print_section("INITIALIZATION");
        terminal::print_status("Source", &plan.source.display().to_string(), false);
        if let Some(duration) = probed_duration.or(plan.source_duration) {
            terminal::print_status("Duration", &format_media_time(duration), false);
        }
        terminal::print_status("Clips", &plan.clips.len().to_string(), false);
        terminal::print_status("Output", &config.output_dir.display().to_string(), false);

        batch_from_clips(&config, &plan.source, &plan.clips)
    };

    if items.is_empty() {
        terminal::print_warning("Nothing to export");
        return Ok(());
    }

    check_dependency(&config.encoder_program)?;
    debug!("Encoder: {}", config.encoder_program.display());

    terminal::print_section("EXPORT");
    let mut events = EventDispatcher::new();
    events.add_handler(Arc::new(ProgressDisplay::new()));

    let batch = ExportBatch::new(items)?;
    let summary = batch.run(&config, &events);

    display_summary(&summary);

    let manifest_path = config
        .output_dir
        .join(format!("export_manifest_{}.json", get_timestamp()));
    summary.save(&manifest_path)?;
    terminal::print_status("Manifest", &manifest_path.display().to_string(), false);

    notify_completion(&config, &summary);

    if summary.succeeded_count == 0 && summary.failed_count > 0 {
        return Err(CoreError::OperationFailed(format!(
            "all {} clips failed to export",
            summary.failed_count
        )));
    }
    Ok(())
}
