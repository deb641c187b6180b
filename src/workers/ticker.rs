use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info};

use crate::clock::{elapsed_since, TimeSource};
use crate::models::{Match, Period};

/// Elapsed-time update pushed once per tick for the open match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTick {
    pub match_id: String,
    pub period: Period,
    pub elapsed: u32,

    /// Ticker run that produced the tick; bumped on every start and stop
    pub generation: u64,
}

/// Drives the 1 Hz clock display for at most one match at a time.
///
/// Each tick recomputes elapsed time from the match's wall-clock anchor, so a
/// late or skipped tick only delays the display and never loses time. Ticks
/// still queued from a stopped or replaced run fail [`MatchTicker::is_current`].
pub struct MatchTicker {
    tick_tx: mpsc::Sender<ClockTick>,
    interval: Duration,
    active: Option<(String, JoinHandle<()>)>,
    generation: u64,
}

impl MatchTicker {
    pub fn new(tick_tx: mpsc::Sender<ClockTick>, interval: Duration) -> Self {
        Self {
            tick_tx,
            interval,
            active: None,
            generation: 0,
        }
    }

    /// Start ticking for a running match, replacing any ticker already active.
    ///
    /// Returns false (and leaves no ticker running) if the match is paused,
    /// outside a playing period, or has never been started.
    pub fn start(&mut self, m: &Match, source: Arc<dyn TimeSource>) -> bool {
        self.stop();

        let anchor = match m.period_start_timestamp {
            Some(anchor) if m.is_running() => anchor,
            _ => return false,
        };

        let match_id = m.id.clone();
        let period = m.current_period;
        let floor = m.elapsed_time;
        let tick_tx = self.tick_tx.clone();
        let interval = self.interval;

        let generation = self.generation;
        let task_match_id = match_id.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                let tick = ClockTick {
                    match_id: task_match_id.clone(),
                    period,
                    elapsed: elapsed_since(anchor, source.now_millis(), floor),
                    generation,
                };

                match tick_tx.try_send(tick) {
                    Ok(()) => {}
                    // Receiver is behind; the next tick carries the same information
                    Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Closed(_)) => {
                        debug!("Tick receiver closed, stopping ticker for {}", task_match_id);
                        break;
                    }
                }
            }
        });

        info!("Ticker started for match {} ({})", match_id, period);
        self.active = Some((match_id, handle));
        true
    }

    /// Cancel the active ticker, if any
    pub fn stop(&mut self) {
        self.generation += 1;
        if let Some((match_id, handle)) = self.active.take() {
            handle.abort();
            debug!("Ticker stopped for match {}", match_id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_finished())
    }

    pub fn match_id(&self) -> Option<&str> {
        self.active.as_ref().map(|(id, _)| id.as_str())
    }

    /// Whether a tick came from the run that is active now
    pub fn is_current(&self, tick: &ClockTick) -> bool {
        self.active.is_some() && tick.generation == self.generation
    }
}

impl Drop for MatchTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualTimeSource};
    use crate::models::MatchMetadata;

    fn running_match(source: &ManualTimeSource) -> Match {
        let clock = Clock::new(Arc::new(source.clone()));
        let mut m = Match::new("Down", "Kildare", MatchMetadata::default());
        m.current_period = Period::FirstHalf;
        clock.start(&mut m);
        m
    }

    #[tokio::test]
    async fn test_ticks_follow_wall_clock() {
        let source = ManualTimeSource::new(10_000);
        let m = running_match(&source);
        let (tx, mut rx) = mpsc::channel(16);
        let mut ticker = MatchTicker::new(tx, Duration::from_millis(5));

        source.advance_secs(42);
        assert!(ticker.start(&m, Arc::new(source.clone())));
        assert!(ticker.is_active());
        assert_eq!(ticker.match_id(), Some(m.id.as_str()));

        let tick = rx.recv().await.unwrap();
        assert_eq!(tick.match_id, m.id);
        assert_eq!(tick.period, Period::FirstHalf);
        assert_eq!(tick.elapsed, 42);

        ticker.stop();
        assert!(!ticker.is_active());
    }

    #[tokio::test]
    async fn test_paused_match_does_not_tick() {
        let source = ManualTimeSource::new(0);
        let mut m = running_match(&source);
        m.is_paused = true;
        let (tx, _rx) = mpsc::channel(1);
        let mut ticker = MatchTicker::new(tx, Duration::from_millis(5));

        assert!(!ticker.start(&m, Arc::new(source)));
        assert!(!ticker.is_active());
    }

    #[tokio::test]
    async fn test_restart_replaces_previous_ticker() {
        let source = ManualTimeSource::new(0);
        let first = running_match(&source);
        let second = running_match(&source);
        let (tx, _rx) = mpsc::channel(16);
        let mut ticker = MatchTicker::new(tx, Duration::from_millis(5));

        ticker.start(&first, Arc::new(source.clone()));
        ticker.start(&second, Arc::new(source.clone()));

        assert_eq!(ticker.match_id(), Some(second.id.as_str()));
    }

    #[tokio::test]
    async fn test_ticks_from_earlier_runs_are_not_current() {
        let source = ManualTimeSource::new(0);
        let m = running_match(&source);
        let (tx, mut rx) = mpsc::channel(16);
        let mut ticker = MatchTicker::new(tx, Duration::from_millis(5));

        ticker.start(&m, Arc::new(source.clone()));
        let first = rx.recv().await.unwrap();
        assert!(ticker.is_current(&first));

        ticker.stop();
        assert!(!ticker.is_current(&first));

        ticker.start(&m, Arc::new(source.clone()));
        assert!(!ticker.is_current(&first));

        let tick = loop {
            let tick = rx.recv().await.unwrap();
            if tick.generation != first.generation {
                break tick;
            }
        };
        assert!(ticker.is_current(&tick));
    }
}
