use crate::classifier;
use crate::dispatcher::{Connection, Dispatcher, SendOutcome};
use crate::gesture::GestureLabel;
use crate::landmarks::LandmarkSample;
use crate::stability::{EmissionDecision, StabilityFilter, Timestamp};
use crate::stats::SessionStats;

/// Result of one tick. `NoOp` when the filter suppressed the label and
/// nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    NoOp,
    Attempted(GestureLabel, SendOutcome),
}

/// classify -> filter -> dispatch, one sample at a time.
pub struct Pipeline<C: Connection> {
    filter: StabilityFilter,
    dispatcher: Dispatcher<C>,
    stats: SessionStats,
}

impl<C: Connection> Pipeline<C> {
    pub fn new(filter: StabilityFilter, dispatcher: Dispatcher<C>) -> Self {
        Self {
            filter,
            dispatcher,
            stats: SessionStats::default(),
        }
    }

    pub fn tick(&mut self, sample: Option<&LandmarkSample>, now: Timestamp) -> TickOutcome {
        self.stats.frames += 1;

        let label = match sample {
            None => {
                self.stats.hand_absent += 1;
                GestureLabel::None
            }
            Some(sample) => match classifier::classify(sample) {
                Ok(label) => label,
                Err(e) => {
                    log::warn!("{e}; treating frame as no hand");
                    self.stats.malformed += 1;
                    GestureLabel::None
                }
            },
        };

        let EmissionDecision::Emit(label) = self.filter.observe(label, now) else {
            return TickOutcome::NoOp;
        };

        let outcome = self.dispatcher.try_send(label);
        match &outcome {
            SendOutcome::Sent => {
                self.stats.record_sent(label);
                log::info!("Sent gesture {label} ({})", label.action_hint());
            }
            SendOutcome::Busy => {
                self.stats.busy += 1;
                log::debug!("Send buffer full, dropped {label}");
            }
            SendOutcome::Failed(reason) => {
                log::error!("Sending {label} failed: {reason}");
            }
        }
        TickOutcome::Attempted(label, outcome)
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn filter(&self) -> &StabilityFilter {
        &self.filter
    }

    /// Release the connection. Also happens when the pipeline is dropped.
    pub fn close(&mut self) {
        self.dispatcher.close();
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::time::Duration;

    use super::*;
    use crate::classifier::fixtures::fingers_up;
    use crate::dispatcher::mock::MockConnection;
    use crate::landmarks::Landmark;
    use crate::stability::DEFAULT_WINDOW;

    fn pipeline(conn: &MockConnection) -> Pipeline<MockConnection> {
        Pipeline::new(
            StabilityFilter::new(DEFAULT_WINDOW),
            Dispatcher::new(conn.clone()),
        )
    }

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_fist_held_for_two_and_a_half_seconds() {
        let conn = MockConnection::default();
        let mut pipeline = pipeline(&conn);
        let fist = fingers_up(0);

        let mut sent_at = Vec::new();
        for frame in 0..=75u64 {
            let t = frame * 1000 / 30;
            if let TickOutcome::Attempted(label, SendOutcome::Sent) = pipeline.tick(Some(&fist), ms(t)) {
                assert_eq!(label, GestureLabel::Fist);
                sent_at.push(t);
            }
        }

        assert_eq!(sent_at, vec![800, 1600, 2400]);
        assert_eq!(conn.tokens(), vec!["puño"; 3]);
        assert_eq!(pipeline.stats().frames, 76);
    }

    #[test]
    fn test_one_then_two_fingers() {
        let conn = MockConnection::default();
        let mut pipeline = pipeline(&conn);

        for step in 0..=12u64 {
            let t = step * 100;
            let sample = if t < 500 { fingers_up(1) } else { fingers_up(2) };
            assert_eq!(pipeline.tick(Some(&sample), ms(t)), TickOutcome::NoOp, "t={t}");
        }
        assert_eq!(
            pipeline.tick(Some(&fingers_up(2)), ms(1300)),
            TickOutcome::Attempted(GestureLabel::TwoFingers, SendOutcome::Sent)
        );
        assert_eq!(conn.tokens(), vec!["dos"]);
    }

    #[test]
    fn test_absent_and_malformed_frames_never_send() {
        let conn = MockConnection::default();
        let mut pipeline = pipeline(&conn);
        let short = LandmarkSample::new(vec![Landmark::default(); 5]);

        for step in 0..40u64 {
            let sample = if step % 2 == 0 { None } else { Some(&short) };
            assert_eq!(pipeline.tick(sample, ms(step * 100)), TickOutcome::NoOp);
        }
        assert!(conn.tokens().is_empty());
        assert_eq!(pipeline.stats().hand_absent, 20);
        assert_eq!(pipeline.stats().malformed, 20);
        assert_eq!(pipeline.filter().state().candidate_label, GestureLabel::None);
    }

    #[test]
    fn test_busy_leaves_filter_state_alone() {
        let conn = MockConnection::default();
        conn.push(Err(io::ErrorKind::WouldBlock.into()));
        let mut pipeline = pipeline(&conn);
        let palm = fingers_up(5);

        pipeline.tick(Some(&palm), ms(0));
        assert_eq!(
            pipeline.tick(Some(&palm), ms(800)),
            TickOutcome::Attempted(GestureLabel::OpenPalm, SendOutcome::Busy)
        );
        let after_busy = pipeline.filter().state().clone();

        // Same schedule as if the first send had gone through.
        assert_eq!(pipeline.tick(Some(&palm), ms(1500)), TickOutcome::NoOp);
        assert_eq!(
            pipeline.tick(Some(&palm), ms(1600)),
            TickOutcome::Attempted(GestureLabel::OpenPalm, SendOutcome::Sent)
        );
        assert_eq!(after_busy.last_emitted, Some(ms(800)));
        assert_eq!(pipeline.stats().busy, 1);
        assert_eq!(conn.tokens(), vec!["palm"]);
    }

    #[test]
    fn test_failure_is_reported_to_caller() {
        let conn = MockConnection::default();
        conn.push(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")));
        let mut pipeline = pipeline(&conn);
        let three = fingers_up(3);

        pipeline.tick(Some(&three), ms(0));
        assert_eq!(
            pipeline.tick(Some(&three), ms(900)),
            TickOutcome::Attempted(
                GestureLabel::ThreeFingers,
                SendOutcome::Failed("reset".into())
            )
        );
    }
}
