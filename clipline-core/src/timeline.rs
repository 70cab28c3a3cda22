//! Edited-timeline segment derivation and playback position control.
//!
//! An edit is expressed as a set of removed intervals over the original
//! recording. Deriving [`EditSegment`]s from those intervals is a pure
//! function: the segments partition `[0, total_duration)` into alternating
//! kept/removed runs with no gaps and no overlaps, and recomputing from the
//! same input always yields the same list. The playback controller maps a
//! player clock onto that partition, skipping removed runs.

use serde::{Deserialize, Serialize};

/// Positions within this many seconds of a kept segment's start count as
/// already inside it, so a jump landing slightly short does not re-trigger.
pub const BOUNDARY_EPSILON_SECS: f64 = 0.050;

/// A half-open interval of original media time, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// One contiguous run of the original timeline, with its position in the
/// edited (gap-removed) timeline. Removed runs collapse to a zero-length
/// edited span.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSegment {
    pub original_start: f64,
    pub original_end: f64,
    pub edited_start: f64,
    pub edited_end: f64,
    pub kept: bool,
}

impl EditSegment {
    fn contains_original(&self, position: f64) -> bool {
        position >= self.original_start && position < self.original_end
    }
}

/// Derives the alternating kept/removed partition of `[0, total_duration)`
/// from a set of removed intervals.
///
/// Inputs are sorted and merged first, so the derivation is deterministic
/// regardless of interval order; empty and out-of-range intervals are
/// clamped away.
pub fn derive_edit_segments(removed: &[TimeRange], total_duration: f64) -> Vec<EditSegment> {
    let total_duration = total_duration.max(0.0);
    if total_duration == 0.0 {
        return Vec::new();
    }

    let mut sorted: Vec<TimeRange> = removed
        .iter()
        .map(|r| TimeRange::new(r.start.clamp(0.0, total_duration), r.end.clamp(0.0, total_duration)))
        .filter(|r| r.end > r.start)
        .collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<TimeRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }

    let mut segments = Vec::with_capacity(merged.len() * 2 + 1);
    let mut cursor = 0.0;
    let mut edited = 0.0;
    for range in merged {
        if range.start > cursor {
            let length = range.start - cursor;
            segments.push(EditSegment {
                original_start: cursor,
                original_end: range.start,
                edited_start: edited,
                edited_end: edited + length,
                kept: true,
            });
            edited += length;
        }
        segments.push(EditSegment {
            original_start: range.start,
            original_end: range.end,
            edited_start: edited,
            edited_end: edited,
            kept: false,
        });
        cursor = range.end;
    }
    if cursor < total_duration {
        let length = total_duration - cursor;
        segments.push(EditSegment {
            original_start: cursor,
            original_end: total_duration,
            edited_start: edited,
            edited_end: edited + length,
            kept: true,
        });
    }
    segments
}

/// What the player should do at the current clock position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackAction {
    /// The position is inside a kept segment; keep playing.
    Continue,
    /// The position is inside a removed run; seek to this original time.
    JumpTo(f64),
    /// No kept material remains after this position; stop playback.
    Stop,
}

/// Maps a continuous player clock onto the kept runs of an edit.
///
/// `decide` runs on every player time-update tick, so lookups are a binary
/// search over segments sorted by `original_start`.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    segments: Vec<EditSegment>,
    epsilon: f64,
}

impl PlaybackController {
    pub fn new(segments: Vec<EditSegment>) -> Self {
        Self {
            segments,
            epsilon: BOUNDARY_EPSILON_SECS,
        }
    }

    /// Total duration of the edited (gap-removed) timeline.
    pub fn edited_duration(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.edited_end)
    }

    /// Decides the player action for an original-timeline clock position.
    pub fn decide(&self, position: f64) -> PlaybackAction {
        if self.segments.is_empty() {
            return PlaybackAction::Stop;
        }

        // Index of the segment containing `position` (last segment whose
        // start is <= position).
        let idx = self
            .segments
            .partition_point(|s| s.original_start <= position);

        if idx > 0 {
            let segment = &self.segments[idx - 1];
            if segment.kept && segment.contains_original(position) {
                return PlaybackAction::Continue;
            }
        }

        // Not inside a kept segment: find the next kept start at or after
        // the position. A start within epsilon behind the position counts as
        // containing it, so a jump that landed a frame short never loops.
        match self.next_kept_start(position) {
            Some(start) if position >= start - self.epsilon && position < start => {
                PlaybackAction::Continue
            }
            Some(start) => PlaybackAction::JumpTo(start),
            None => PlaybackAction::Stop,
        }
    }

    fn next_kept_start(&self, position: f64) -> Option<f64> {
        self.segments
            .iter()
            .filter(|s| s.kept)
            .map(|s| s.original_start)
            .find(|&start| start >= position - self.epsilon)
    }

    /// Maps an original-timeline position to the edited timeline. Positions
    /// inside removed runs collapse to the edited time of the cut.
    pub fn to_edited(&self, original: f64) -> f64 {
        let idx = self
            .segments
            .partition_point(|s| s.original_start <= original);
        if idx == 0 {
            return 0.0;
        }
        let segment = &self.segments[idx - 1];
        if segment.kept {
            let offset = (original - segment.original_start)
                .clamp(0.0, segment.original_end - segment.original_start);
            segment.edited_start + offset
        } else {
            segment.edited_start
        }
    }

    /// Maps an edited-timeline position back to original media time.
    pub fn to_original(&self, edited: f64) -> f64 {
        let kept: Vec<&EditSegment> = self.segments.iter().filter(|s| s.kept).collect();
        let Some(first) = kept.first() else {
            return 0.0;
        };
        if edited <= first.edited_start {
            return first.original_start;
        }
        for segment in &kept {
            if edited < segment.edited_end {
                return segment.original_start + (edited - segment.edited_start);
            }
        }
        kept.last().map_or(0.0, |s| s.original_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn removed() -> Vec<TimeRange> {
        vec![TimeRange::new(10.0, 20.0), TimeRange::new(40.0, 50.0)]
    }

    #[test]
    fn test_partition_has_no_gaps_or_overlaps() {
        let segments = derive_edit_segments(&removed(), 60.0);
        assert_eq!(segments.first().map(|s| s.original_start), Some(0.0));
        assert_eq!(segments.last().map(|s| s.original_end), Some(60.0));
        for pair in segments.windows(2) {
            assert_eq!(pair[0].original_end, pair[1].original_start);
            assert_ne!(pair[0].kept, pair[1].kept);
        }
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let first = derive_edit_segments(&removed(), 60.0);
        let second = derive_edit_segments(&removed(), 60.0);
        assert_eq!(first, second);
        // Input order does not matter either.
        let reversed: Vec<TimeRange> = removed().into_iter().rev().collect();
        assert_eq!(derive_edit_segments(&reversed, 60.0), first);
    }

    #[test]
    fn test_edited_clock_skips_removed_runs() {
        let segments = derive_edit_segments(&removed(), 60.0);
        let kept: Vec<&EditSegment> = segments.iter().filter(|s| s.kept).collect();
        assert_eq!(kept.len(), 3);
        assert_eq!((kept[1].edited_start, kept[1].edited_end), (10.0, 30.0));
        assert_eq!((kept[2].edited_start, kept[2].edited_end), (30.0, 40.0));
    }

    #[test]
    fn test_removal_at_zero_and_end() {
        let segments = derive_edit_segments(
            &[TimeRange::new(0.0, 5.0), TimeRange::new(55.0, 60.0)],
            60.0,
        );
        assert!(!segments.first().unwrap().kept);
        assert!(!segments.last().unwrap().kept);
        let controller = PlaybackController::new(segments);
        assert_eq!(controller.edited_duration(), 50.0);
    }

    #[test]
    fn test_overlapping_removals_merge() {
        let segments = derive_edit_segments(
            &[TimeRange::new(10.0, 25.0), TimeRange::new(20.0, 30.0)],
            60.0,
        );
        let removed: Vec<&EditSegment> = segments.iter().filter(|s| !s.kept).collect();
        assert_eq!(removed.len(), 1);
        assert_eq!(
            (removed[0].original_start, removed[0].original_end),
            (10.0, 30.0)
        );
    }

    #[test]
    fn test_decide_inside_kept_segment() {
        let controller = PlaybackController::new(derive_edit_segments(&removed(), 60.0));
        assert_eq!(controller.decide(5.0), PlaybackAction::Continue);
        assert_eq!(controller.decide(25.0), PlaybackAction::Continue);
    }

    #[test]
    fn test_decide_at_removed_start_jumps_forward() {
        // Exactly at the removed-interval start the controller must jump to
        // the next kept start, not to itself minus epsilon.
        let controller = PlaybackController::new(derive_edit_segments(&removed(), 60.0));
        assert_eq!(controller.decide(10.0), PlaybackAction::JumpTo(20.0));
        assert_eq!(controller.decide(15.0), PlaybackAction::JumpTo(20.0));
    }

    #[test]
    fn test_decide_near_boundary_does_not_loop() {
        // A jump that landed 20ms short of the kept start is treated as
        // inside; no second jump is issued.
        let controller = PlaybackController::new(derive_edit_segments(&removed(), 60.0));
        assert_eq!(controller.decide(19.98), PlaybackAction::Continue);
    }

    #[test]
    fn test_decide_past_last_kept_segment_stops() {
        let controller = PlaybackController::new(derive_edit_segments(
            &[TimeRange::new(50.0, 60.0)],
            60.0,
        ));
        assert_eq!(controller.decide(55.0), PlaybackAction::Stop);
        assert_eq!(controller.decide(60.0), PlaybackAction::Stop);
    }

    #[test]
    fn test_clock_mapping_round_trip() {
        let controller = PlaybackController::new(derive_edit_segments(&removed(), 60.0));
        assert_eq!(controller.to_edited(5.0), 5.0);
        assert_eq!(controller.to_edited(25.0), 15.0);
        assert_eq!(controller.to_edited(15.0), 10.0); // inside a cut
        assert_eq!(controller.to_original(15.0), 25.0);
        assert_eq!(controller.to_original(0.0), 0.0);
    }
}
