//! Clip detection via the external analysis worker.
//!
//! The detection algorithm itself is a black box behind the worker's message
//! contract; this module builds the worker invocation, interprets its
//! completion payload, and provides the serializable clip plan that carries
//! detection results into a later export run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::jobs::{CompletionPayload, JobKind, JobSpec};
use crate::supervise::JobSupervisor;

/// One clip-worthy sub-segment reported by the analysis worker, in seconds
/// of original media time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipCandidate {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ClipCandidate {
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Result of a finished analysis job.
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub clips: Vec<ClipCandidate>,
    pub waveform: Vec<f32>,
    /// Set when the worker exited 0 without a structured completion and the
    /// payload was synthesized empty.
    pub synthesized: bool,
}

impl From<CompletionPayload> for AnalysisReport {
    fn from(payload: CompletionPayload) -> Self {
        Self {
            clips: payload.clips,
            waveform: payload.waveform,
            synthesized: payload.synthesized,
        }
    }
}

/// Serializable clip plan: detected clips for one source file, written by
/// `analyze` and consumed by `export`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipPlan {
    pub source: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_duration: Option<f64>,
    pub clips: Vec<ClipCandidate>,
}

impl ClipPlan {
    pub fn load(path: &Path) -> CoreResult<Self> {
        let data = fs::read_to_string(path).map_err(|e| {
            CoreError::PathError(format!("failed to read clip plan '{}': {e}", path.display()))
        })?;
        serde_json::from_str(&data).map_err(|e| {
            CoreError::OperationFailed(format!(
                "failed to parse clip plan '{}': {e}",
                path.display()
            ))
        })
    }

    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let data = serde_json::to_string_pretty(self).map_err(|e| {
            CoreError::OperationFailed(format!("failed to serialize clip plan: {e}"))
        })?;
        fs::write(path, data).map_err(|e| {
            CoreError::PathError(format!(
                "failed to write clip plan '{}': {e}",
                path.display()
            ))
        })?;
        Ok(())
    }
}

/// Builds the analysis worker invocation for one input file.
pub fn analysis_spec(config: &CoreConfig, input: &Path) -> JobSpec {
    let mut args = vec![input.to_string_lossy().into_owned()];
    args.extend(config.analyzer_args.iter().cloned());
    JobSpec::new(JobKind::Analysis, config.analyzer_program.clone(), args)
}

/// Creates the supervisor for an analysis job. The caller keeps the cancel
/// handle and drives `run` to completion.
pub fn analysis_job(config: &CoreConfig, input: &Path) -> JobSupervisor {
    JobSupervisor::new(analysis_spec(config, input), config)
}
