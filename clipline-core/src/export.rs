//! Encoder invocation building for clip export.
//!
//! Each clip is exported by one encoder process invocation with an explicit
//! start offset and duration. The encoder emits no structured progress in
//! this contract; success is exit code 0 and stderr is only surfaced on a
//! nonzero exit.

use std::path::{Path, PathBuf};

use crate::analysis::ClipCandidate;
use crate::batch::{BatchItem, ItemOutcome};
use crate::config::CoreConfig;
use crate::jobs::{JobKind, JobSpec};
use crate::timeline::EditSegment;
use crate::utils::format_media_time;

/// Output path for clip `index` (1-based) of `source` inside the configured
/// output directory. Each item writes a distinct, uniquely-named file.
pub fn clip_output_path(output_dir: &Path, source: &Path, index: usize) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip".to_string());
    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mp4".to_string());
    output_dir.join(format!("{stem}_clip_{index:03}.{ext}"))
}

/// Builds the encoder invocation for one clip.
///
/// The seek is placed after the input for accurate (non-keyframe-snapped)
/// cut points. Stream copy is the default; re-encode flags are used when the
/// configuration disables it.
pub fn encode_spec(
    config: &CoreConfig,
    source: &Path,
    clip_start: f64,
    clip_duration: f64,
    output: &Path,
) -> JobSpec {
    let mut args: Vec<String> = vec![
        "-hide_banner".into(),
        "-nostdin".into(),
        "-y".into(),
        "-i".into(),
        source.to_string_lossy().into_owned(),
        "-ss".into(),
        format_media_time(clip_start),
        "-t".into(),
        format_media_time(clip_duration),
        "-map".into(),
        "0".into(),
        "-map_metadata".into(),
        "0".into(),
    ];

    if config.encode_copy_streams {
        args.extend([
            "-c".into(),
            "copy".into(),
            "-avoid_negative_ts".into(),
            "make_zero".into(),
        ]);
    } else {
        args.extend([
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            "veryfast".into(),
            "-crf".into(),
            "20".into(),
            "-c:a".into(),
            "aac".into(),
        ]);
    }

    args.push(output.to_string_lossy().into_owned());
    JobSpec::new(JobKind::Encode, config.encoder_program.clone(), args)
}

/// Converts detected clips into the ordered item sequence of an export
/// batch. The sequence is fixed at this point; the pipeline never inserts
/// items dynamically.
pub fn batch_from_clips(
    config: &CoreConfig,
    source: &Path,
    clips: &[ClipCandidate],
) -> Vec<BatchItem> {
    clips
        .iter()
        .enumerate()
        .map(|(i, clip)| BatchItem {
            item_id: format!("clip-{:03}", i + 1),
            source: source.to_path_buf(),
            clip_start: clip.start,
            clip_duration: clip.duration(),
            output: clip_output_path(&config.output_dir, source, i + 1),
            outcome: ItemOutcome::Pending,
        })
        .collect()
}

/// Converts the kept runs of an edited timeline into export items, one per
/// kept segment. Concatenating the outputs in order yields the composite
/// (gap-removed) edit.
pub fn batch_from_kept_segments(
    config: &CoreConfig,
    source: &Path,
    segments: &[EditSegment],
) -> Vec<BatchItem> {
    segments
        .iter()
        .filter(|s| s.kept)
        .enumerate()
        .map(|(i, segment)| BatchItem {
            item_id: format!("part-{:03}", i + 1),
            source: source.to_path_buf(),
            clip_start: segment.original_start,
            clip_duration: segment.original_end - segment.original_start,
            output: clip_output_path(&config.output_dir, source, i + 1),
            outcome: ItemOutcome::Pending,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{derive_edit_segments, TimeRange};

    #[test]
    fn test_clip_output_paths_are_unique_and_numbered() {
        let dir = Path::new("/tmp/out");
        let source = Path::new("/media/interview.mkv");
        let first = clip_output_path(dir, source, 1);
        let second = clip_output_path(dir, source, 2);
        assert_eq!(first, PathBuf::from("/tmp/out/interview_clip_001.mkv"));
        assert_eq!(second, PathBuf::from("/tmp/out/interview_clip_002.mkv"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_encode_spec_copy_mode_arguments() {
        let config = CoreConfig::new(PathBuf::from("/tmp/out"));
        let spec = encode_spec(
            &config,
            Path::new("/media/talk.mkv"),
            61.5,
            10.0,
            Path::new("/tmp/out/talk_clip_001.mkv"),
        );
        assert_eq!(spec.kind, JobKind::Encode);
        let args = spec.args.join(" ");
        assert!(args.contains("-ss 00:01:01.500"));
        assert!(args.contains("-t 00:00:10.000"));
        assert!(args.contains("-c copy"));
        assert!(args.ends_with("/tmp/out/talk_clip_001.mkv"));
    }

    #[test]
    fn test_encode_spec_reencode_arguments() {
        let mut config = CoreConfig::new(PathBuf::from("/tmp/out"));
        config.encode_copy_streams = false;
        let spec = encode_spec(
            &config,
            Path::new("/media/talk.mkv"),
            0.0,
            5.0,
            Path::new("/tmp/out/talk_clip_001.mkv"),
        );
        let args = spec.args.join(" ");
        assert!(args.contains("-c:v libx264"));
        assert!(!args.contains("-c copy"));
    }

    #[test]
    fn test_batch_from_kept_segments_skips_removed_runs() {
        let config = CoreConfig::new(PathBuf::from("/tmp/out"));
        let segments = derive_edit_segments(&[TimeRange::new(10.0, 20.0)], 30.0);
        let items = batch_from_kept_segments(&config, Path::new("/media/talk.mkv"), &segments);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].clip_start, 0.0);
        assert_eq!(items[0].clip_duration, 10.0);
        assert_eq!(items[1].clip_start, 20.0);
        assert_eq!(items[1].clip_duration, 10.0);
    }
}
