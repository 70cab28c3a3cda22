//! Classification of worker stdout lines into structured messages.
//!
//! Workers emit newline-delimited JSON with a `type` discriminator, but they
//! also print human-readable diagnostics on the same stream. A line that does
//! not decode is therefore never an error by itself -- it is demoted to
//! opaque diagnostic text.

use serde::Deserialize;

use crate::analysis::ClipCandidate;

/// One structured message from a worker's stdout stream.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerMessage {
    Progress {
        step: String,
        progress: f32,
        #[serde(default)]
        message: String,
    },
    Complete {
        #[serde(default)]
        clips: Vec<ClipCandidate>,
        #[serde(default)]
        waveform: Vec<f32>,
    },
    Error {
        error: String,
    },
}

/// Attempts to decode one complete line as a structured worker message.
///
/// Returns `None` for anything that is not a well-formed tagged message; the
/// caller relays such lines as diagnostics. The parse failure itself is only
/// logged at debug level.
pub fn classify(line: &str) -> Option<WorkerMessage> {
    match serde_json::from_str::<WorkerMessage>(line) {
        Ok(message) => Some(message),
        Err(e) => {
            log::debug!("unclassified worker line ({e}): {line}");
            None
        }
    }
}
