//! Core configuration for clip analysis and export runs.
//!
//! Mirrors the shape the CLI exposes: worker binary locations, the shared
//! output directory, and the progress throttle tuning knobs. Constructed with
//! defaults via [`CoreConfig::new`] and checked with [`CoreConfig::validate`]
//! before any job is started.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// Default analysis worker binary name (resolved via PATH).
pub const DEFAULT_ANALYZER_BIN: &str = "clip-analyzer";

/// Default encoder binary name (resolved via PATH).
pub const DEFAULT_ENCODER_BIN: &str = "ffmpeg";

/// Default minimum progress change (0-100 scale) required to forward an event.
pub const DEFAULT_MIN_PROGRESS_DELTA: f32 = 1.0;

/// Default minimum interval between forwarded progress events.
pub const DEFAULT_MIN_PROGRESS_INTERVAL_MS: u64 = 100;

/// Configuration for the core orchestration layer.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Analysis worker executable.
    pub analyzer_program: PathBuf,
    /// Extra arguments passed to the analysis worker after the input path.
    pub analyzer_args: Vec<String>,
    /// Encoder executable used for clip export.
    pub encoder_program: PathBuf,
    /// Directory that receives exported clip files.
    pub output_dir: PathBuf,
    /// Export clips by remuxing (stream copy) instead of re-encoding.
    pub encode_copy_streams: bool,
    /// Minimum progress change required to forward an event to handlers.
    pub min_progress_delta: f32,
    /// Minimum elapsed time between forwarded progress events.
    pub min_progress_interval: Duration,
    /// Optional ntfy topic URL for batch completion notifications.
    pub ntfy_topic: Option<String>,
}

impl CoreConfig {
    /// Creates a configuration with defaults for everything but the output
    /// directory.
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            analyzer_program: PathBuf::from(DEFAULT_ANALYZER_BIN),
            analyzer_args: Vec::new(),
            encoder_program: PathBuf::from(DEFAULT_ENCODER_BIN),
            output_dir,
            encode_copy_streams: true,
            min_progress_delta: DEFAULT_MIN_PROGRESS_DELTA,
            min_progress_interval: Duration::from_millis(DEFAULT_MIN_PROGRESS_INTERVAL_MS),
            ntfy_topic: None,
        }
    }

    /// Validates the configuration, returning `InvalidConfig` on the first
    /// problem found.
    pub fn validate(&self) -> CoreResult<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(CoreError::InvalidConfig(
                "output directory must not be empty".to_string(),
            ));
        }
        if self.analyzer_program.as_os_str().is_empty() {
            return Err(CoreError::InvalidConfig(
                "analyzer program must not be empty".to_string(),
            ));
        }
        if self.encoder_program.as_os_str().is_empty() {
            return Err(CoreError::InvalidConfig(
                "encoder program must not be empty".to_string(),
            ));
        }
        if !self.min_progress_delta.is_finite() || self.min_progress_delta < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "minimum progress delta must be a non-negative number, got {}",
                self.min_progress_delta
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = CoreConfig::new(PathBuf::from("/tmp/out"));
        assert!(config.validate().is_ok());
        assert_eq!(config.min_progress_delta, 1.0);
        assert_eq!(config.min_progress_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_rejects_empty_output_dir() {
        let config = CoreConfig::new(PathBuf::new());
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_negative_delta() {
        let mut config = CoreConfig::new(PathBuf::from("/tmp/out"));
        config.min_progress_delta = -0.5;
        assert!(config.validate().is_err());
    }
}
