use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::models::Match;

/// Source of wall-clock time in milliseconds since the epoch
pub trait TimeSource: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Reads the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Settable clock shared between clones, for tests and replays
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    millis: Arc<AtomicI64>,
}

impl ManualTimeSource {
    pub fn new(start_millis: i64) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start_millis)),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        self.millis.fetch_add(secs * 1000, Ordering::SeqCst);
    }

    pub fn advance_millis(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Seconds elapsed since `anchor`, never below `floor`
pub fn elapsed_since(anchor: i64, now: i64, floor: u32) -> u32 {
    let secs = (now - anchor).max(0) / 1000;
    u32::try_from(secs).unwrap_or(u32::MAX).max(floor)
}

/// Period clock anchored to wall-clock time.
///
/// Elapsed time is recomputed from `period_start_timestamp` on every read,
/// so missed ticks or a suspended process never make it drift.
#[derive(Clone)]
pub struct Clock {
    source: Arc<dyn TimeSource>,
}

impl Clock {
    pub fn new(source: Arc<dyn TimeSource>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> Arc<dyn TimeSource> {
        Arc::clone(&self.source)
    }

    pub fn now_millis(&self) -> i64 {
        self.source.now_millis()
    }

    /// Start the clock from the match's current elapsed time
    pub fn start(&self, m: &mut Match) {
        m.period_start_timestamp = Some(self.now_millis() - i64::from(m.elapsed_time) * 1000);
        m.is_paused = false;
    }

    pub fn resume(&self, m: &mut Match) {
        self.start(m);
    }

    /// Freeze elapsed time at its current value
    pub fn pause(&self, m: &mut Match) {
        m.elapsed_time = self.current_elapsed(m);
        m.is_paused = true;
    }

    pub fn current_elapsed(&self, m: &Match) -> u32 {
        match m.period_start_timestamp {
            Some(anchor) if !m.is_paused => {
                elapsed_since(anchor, self.now_millis(), m.elapsed_time)
            }
            _ => m.elapsed_time,
        }
    }

    /// Write the recomputed elapsed time into the match
    pub fn sync(&self, m: &mut Match) -> u32 {
        m.elapsed_time = self.current_elapsed(m);
        m.elapsed_time
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("now_millis", &self.now_millis())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchMetadata;

    fn setup() -> (ManualTimeSource, Clock, Match) {
        let source = ManualTimeSource::new(1_700_000_000_000);
        let clock = Clock::new(Arc::new(source.clone()));
        let m = Match::new("Kilkenny", "Tipperary", MatchMetadata::default());
        (source, clock, m)
    }

    #[test]
    fn test_pause_resume_keeps_elapsed() {
        let (source, clock, mut m) = setup();

        clock.start(&mut m);
        source.advance_secs(5);
        clock.pause(&mut m);
        assert_eq!(m.elapsed_time, 5);

        // Time passing while paused does not count
        source.advance_secs(40);
        assert_eq!(clock.current_elapsed(&m), 5);

        clock.resume(&mut m);
        source.advance_secs(3);
        clock.pause(&mut m);
        assert_eq!(m.elapsed_time, 8);
    }

    #[test]
    fn test_missed_ticks_do_not_drift() {
        let (source, clock, mut m) = setup();

        clock.start(&mut m);
        source.advance_millis(125_900);

        assert_eq!(clock.current_elapsed(&m), 125);
        assert_eq!(clock.sync(&mut m), 125);
    }

    #[test]
    fn test_clock_going_backwards_never_reduces_elapsed() {
        let (source, clock, mut m) = setup();

        clock.start(&mut m);
        source.advance_secs(10);
        clock.sync(&mut m);

        source.advance_secs(-60);
        assert_eq!(clock.current_elapsed(&m), 10);
    }

    #[test]
    fn test_elapsed_since() {
        assert_eq!(elapsed_since(1_000, 3_999, 0), 2);
        assert_eq!(elapsed_since(5_000, 1_000, 0), 0);
        assert_eq!(elapsed_since(0, 1_000, 7), 7);
    }
}
