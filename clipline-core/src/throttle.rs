//! Rate limiting for progress events.
//!
//! Workers report progress at whatever granularity they like, sometimes many
//! times per second. Relaying every update would flood the presentation layer
//! with changes below human perception, so a gate decides whether each event
//! is forwarded. Terminal events never pass through the gate -- the
//! supervisor forwards those unconditionally.

use std::time::{Duration, Instant};

use crate::config::CoreConfig;

/// State of the last forwarded progress event for one job.
#[derive(Debug, Clone)]
struct ForwardedState {
    sent_at: Instant,
    percent: f32,
    step: String,
}

/// Decides whether a progress event should be forwarded now or suppressed.
///
/// One gate exists per active job; it is created at job start and discarded
/// with the job.
#[derive(Debug)]
pub struct ProgressGate {
    min_delta: f32,
    min_interval: Duration,
    state: Option<ForwardedState>,
}

impl ProgressGate {
    pub fn new(min_delta: f32, min_interval: Duration) -> Self {
        Self {
            min_delta,
            min_interval,
            state: None,
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.min_progress_delta, config.min_progress_interval)
    }

    /// Returns true when the event should be forwarded: the first event of a
    /// job, a step label change, a progress change of at least `min_delta`,
    /// or `min_interval` elapsed since the last forwarded event.
    ///
    /// Pure with respect to the gate state; the caller applies
    /// [`mark_forwarded`](Self::mark_forwarded) on a true result.
    pub fn should_forward(&self, step: &str, percent: f32, now: Instant) -> bool {
        match &self.state {
            None => true,
            Some(last) => {
                step != last.step
                    || (percent - last.percent).abs() >= self.min_delta
                    || now.saturating_duration_since(last.sent_at) >= self.min_interval
            }
        }
    }

    /// Records a forwarded event as the new comparison point.
    pub fn mark_forwarded(&mut self, step: &str, percent: f32, now: Instant) {
        self.state = Some(ForwardedState {
            sent_at: now,
            percent,
            step: step.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> ProgressGate {
        ProgressGate::new(1.0, Duration::from_millis(100))
    }

    #[test]
    fn test_first_event_always_forwards() {
        let g = gate();
        assert!(g.should_forward("scan", 0.0, Instant::now()));
    }

    #[test]
    fn test_reference_sequence_forwards_three_of_six() {
        // Values [1,1,1,2,2,50] at t=0,10,20,30,40,50ms with min_delta=1 and
        // min_interval=100ms must forward exactly at 1 (first), 2 (delta),
        // and 50 (delta).
        let t0 = Instant::now();
        let mut g = gate();
        let sequence = [
            (1.0, 0u64),
            (1.0, 10),
            (1.0, 20),
            (2.0, 30),
            (2.0, 40),
            (50.0, 50),
        ];

        let mut forwarded = Vec::new();
        for (percent, millis) in sequence {
            let now = t0 + Duration::from_millis(millis);
            if g.should_forward("encode", percent, now) {
                g.mark_forwarded("encode", percent, now);
                forwarded.push(percent);
            }
        }
        assert_eq!(forwarded, vec![1.0, 2.0, 50.0]);
    }

    #[test]
    fn test_step_change_never_suppressed() {
        // Even with an arbitrarily large interval and no progress delta, a
        // step label change must forward.
        let t0 = Instant::now();
        let mut g = ProgressGate::new(1.0, Duration::from_secs(u64::MAX / 2));
        g.mark_forwarded("extract", 10.0, t0);
        assert!(g.should_forward("transcribe", 10.0, t0 + Duration::from_millis(1)));
    }

    #[test]
    fn test_small_delta_within_interval_suppressed() {
        let t0 = Instant::now();
        let mut g = gate();
        g.mark_forwarded("scan", 10.0, t0);
        assert!(!g.should_forward("scan", 10.5, t0 + Duration::from_millis(50)));
    }

    #[test]
    fn test_interval_elapsed_forwards_without_delta() {
        let t0 = Instant::now();
        let mut g = gate();
        g.mark_forwarded("scan", 10.0, t0);
        assert!(g.should_forward("scan", 10.0, t0 + Duration::from_millis(100)));
    }

    #[test]
    fn test_progress_regression_counts_as_delta() {
        // percent is not strictly monotonic; a backwards jump of at least
        // min_delta is still a visible change worth forwarding.
        let t0 = Instant::now();
        let mut g = gate();
        g.mark_forwarded("scan", 50.0, t0);
        assert!(g.should_forward("scan", 40.0, t0 + Duration::from_millis(10)));
    }
}
