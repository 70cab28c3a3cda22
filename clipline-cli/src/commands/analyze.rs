//! Implementation of the 'analyze' subcommand.
//!
//! Probes the input recording, runs the external analysis worker under a job
//! supervisor, and prints (or writes) the detected clip candidates.

use std::path::PathBuf;
use std::sync::Arc;

use clipline_core::{
    analysis_job, check_dependency, format_media_time, probe_media, AnalysisReport, ClipPlan,
    CoreConfig, CoreError, EventDispatcher, JobOutcome,
};
use log::{debug, warn};

use crate::cli::AnalyzeArgs;
use crate::error::CliResult;
use crate::progress::ProgressDisplay;
use crate::terminal;

/// Builds the core configuration for an analysis run.
fn create_config(args: &AnalyzeArgs) -> CliResult<CoreConfig> {
    // Analysis writes no files; the output directory is unused but the
    // config requires one.
    let mut config = CoreConfig::new(PathBuf::from("."));
    if let Some(analyzer) = &args.analyzer {
        config.analyzer_program = analyzer.clone();
    }
    config.analyzer_args = args.analyzer_args.clone();
    config.validate()?;
    Ok(config)
}

fn display_clips(report: &AnalysisReport) {
    terminal::print_section("DETECTED CLIPS");
    if report.clips.is_empty() {
        let note = if report.synthesized {
            "Worker finished without structured results; nothing to report"
        } else {
            "No clip-worthy segments detected"
        };
        terminal::print_warning(note);
        return;
    }

    for (i, clip) in report.clips.iter().enumerate() {
        let label = clip.label.as_deref().unwrap_or("clip");
        terminal::print_subsection(&format!("{:>3}. {label}", i + 1));
        terminal::print_status(
            "Range",
            &format!(
                "{} - {} ({:.1}s)",
                format_media_time(clip.start),
                format_media_time(clip.end),
                clip.duration()
            ),
            false,
        );
        terminal::print_status("Score", &format!("{:.2}", clip.score), false);
    }
}

/// Runs analysis and reports results.
pub fn run_analyze(args: AnalyzeArgs) -> CliResult<()> {
    let config = create_config(&args)?;

    if !args.input_path.exists() {
        return Err(CoreError::PathError(format!(
            "input file not found: {}",
            args.input_path.display()
        )));
    }

    terminal::print_section("INITIALIZATION");
    terminal::print_status("Input file", &args.input_path.display().to_string(), false);
    // Probing is informational; a missing or confused ffprobe must not block
    // the analysis itself.
    let source_duration = match probe_media(&args.input_path) {
        Ok(summary) => {
            if let Some(duration) = summary.duration_secs {
                terminal::print_status("Duration", &format_media_time(duration), false);
            }
            terminal::print_status(
                "Streams",
                &format!(
                    "{} video, {} audio",
                    summary.video_streams, summary.audio_streams
                ),
                false,
            );
            summary.duration_secs
        }
        Err(e) => {
            warn!("Media probe failed: {e}");
            None
        }
    };

    check_dependency(&config.analyzer_program)?;
    debug!("Analyzer: {}", config.analyzer_program.display());

    terminal::print_section("ANALYSIS");
    let mut events = EventDispatcher::new();
    events.add_handler(Arc::new(ProgressDisplay::new()));

    let supervisor = analysis_job(&config, &args.input_path);
    let report = match supervisor.run(&events) {
        JobOutcome::Completed(payload) => AnalysisReport::from(payload),
        JobOutcome::Failed(reason) => {
            terminal::print_error("Analysis failed", &reason.message(), None);
            return Err(CoreError::OperationFailed(reason.message()));
        }
        JobOutcome::Cancelled => {
            terminal::print_warning("Analysis cancelled");
            return Ok(());
        }
    };

    display_clips(&report);

    if let Some(plan_path) = &args.plan_path {
        let plan = ClipPlan {
            source: args.input_path.clone(),
            source_duration,
            clips: report.clips.clone(),
        };
        plan.save(plan_path)?;
        terminal::print_success(&format!("Clip plan written to {}", plan_path.display()));
    }

    Ok(())
}
