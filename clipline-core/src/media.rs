//! Media file probing via ffprobe.
//!
//! The orchestration layer needs the source duration (timeline totals,
//! display) and a stream summary before analysis or export starts. Probing
//! failures surface as `MediaProbe` errors with the tool's own message.

use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

/// Summary of a probed media file.
#[derive(Debug, Clone)]
pub struct MediaSummary {
    pub path: PathBuf,
    pub duration_secs: Option<f64>,
    pub video_streams: usize,
    pub audio_streams: usize,
}

/// Probes a media file with ffprobe.
pub fn probe_media(path: &Path) -> CoreResult<MediaSummary> {
    if !path.exists() {
        return Err(CoreError::PathError(format!(
            "input file not found: {}",
            path.display()
        )));
    }

    let metadata = ffprobe::ffprobe(path)
        .map_err(|e| CoreError::MediaProbe(format!("{}: {e:?}", path.display())))?;

    let duration_secs = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok());

    let mut video_streams = 0;
    let mut audio_streams = 0;
    for stream in &metadata.streams {
        match stream.codec_type.as_deref() {
            Some("video") => video_streams += 1,
            Some("audio") => audio_streams += 1,
            _ => {}
        }
    }

    Ok(MediaSummary {
        path: path.to_path_buf(),
        duration_secs,
        video_streams,
        audio_streams,
    })
}
