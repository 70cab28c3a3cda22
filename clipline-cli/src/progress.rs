//! Event handler that renders core job events as terminal progress.
//!
//! Registered on the core `EventDispatcher`; receives already-throttled
//! progress events, so it can update the bar unconditionally.

use clipline_core::{EventHandler, JobEvent};
use indicatif::{ProgressBar, ProgressStyle};

pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("  {bar:30.cyan/blue} {percent:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for ProgressDisplay {
    fn handle(&self, event: &JobEvent) {
        match event {
            JobEvent::JobStarted { kind, .. } => {
                self.bar.reset();
                self.bar.set_message(format!("{kind} starting"));
            }
            JobEvent::Progress {
                step,
                percent,
                message,
                ..
            } => {
                self.bar.set_position(percent.round() as u64);
                if message.is_empty() {
                    self.bar.set_message(step.clone());
                } else {
                    self.bar.set_message(format!("{step}: {message}"));
                }
            }
            JobEvent::Diagnostic { line, .. } => {
                log::debug!("worker: {line}");
            }
            JobEvent::ItemStarted {
                item_index,
                total,
                item_id,
                ..
            } => {
                self.bar
                    .println(format!("  » {item_id} ({} of {total})", item_index + 1));
                self.bar.reset();
            }
            JobEvent::JobCompleted { .. }
            | JobEvent::JobFailed { .. }
            | JobEvent::JobCancelled { .. } => {
                self.bar.finish_and_clear();
            }
            JobEvent::BatchCompleted { .. } => {
                self.bar.finish_and_clear();
            }
        }
    }
}
