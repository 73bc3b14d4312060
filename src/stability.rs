//! Time-based debounce for classified gestures.
//!
//! A label must hold continuously for one window before it is emitted, and
//! a held label is re-emitted once per window after that. Both cases use a
//! single elapsed-time test measured from the later of "candidate since"
//! and "last emitted".

use std::time::Duration;

use crate::gesture::GestureLabel;

/// Elapsed time since session start.
pub type Timestamp = Duration;

/// Default stability window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionDecision {
    Suppress,
    Emit(GestureLabel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilityState {
    pub candidate_label: GestureLabel,
    /// When `candidate_label` last changed. Never ahead of the latest tick.
    pub candidate_since: Timestamp,
    pub last_emitted: Option<Timestamp>,
}

impl Default for StabilityState {
    fn default() -> Self {
        Self {
            candidate_label: GestureLabel::None,
            candidate_since: Duration::ZERO,
            last_emitted: None,
        }
    }
}

pub struct StabilityFilter {
    window: Duration,
    state: StabilityState,
}

impl StabilityFilter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: StabilityState::default(),
        }
    }

    pub fn state(&self) -> &StabilityState {
        &self.state
    }

    /// Feed one label observed at `now`.
    ///
    /// Timestamps are expected to be non-decreasing. A tick that arrives
    /// earlier than the candidate's start is treated as zero elapsed time.
    pub fn observe(&mut self, label: GestureLabel, now: Timestamp) -> EmissionDecision {
        if label == GestureLabel::None {
            return EmissionDecision::Suppress;
        }

        if label != self.state.candidate_label {
            log::debug!(
                "Candidate {} -> {} at {:.3}s",
                self.state.candidate_label,
                label,
                now.as_secs_f64()
            );
            self.state.candidate_label = label;
            self.state.candidate_since = now;
            return EmissionDecision::Suppress;
        }

        let reference = match self.state.last_emitted {
            Some(emitted) => emitted.max(self.state.candidate_since),
            None => self.state.candidate_since,
        };

        if now.saturating_sub(reference) >= self.window {
            self.state.last_emitted = Some(now);
            EmissionDecision::Emit(label)
        } else {
            EmissionDecision::Suppress
        }
    }
}
