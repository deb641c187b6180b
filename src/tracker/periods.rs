//! Period transitions applied to a match.
//!
//! Each function is a single synchronous step so a clock tick can never land
//! between reading the elapsed time and changing the period.

use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{Rejection, TrackerResult};
use crate::models::{Match, Period};

/// Enter the next playing period from a break (or before throw-in)
pub fn start(m: &mut Match, clock: &Clock) -> TrackerResult<Period> {
    let target = m
        .current_period
        .start_target(m.has_extra_time())
        .ok_or(Rejection::IllegalTransition {
            action: "start",
            period: m.current_period,
        })?;

    enter(m, target);
    clock.start(m);

    info!("Match {} | {} started", m.id, target);
    Ok(target)
}

/// End the current period and move to the next one.
///
/// Entering the second half of normal or extra time starts play immediately.
pub fn end(m: &mut Match, clock: &Clock) -> TrackerResult<Period> {
    let next = m
        .current_period
        .next(m.has_extra_time())
        .ok_or(Rejection::IllegalTransition {
            action: "end",
            period: m.current_period,
        })?;

    clock.pause(m);
    let finished = m.current_period;

    if next == Period::MatchOver {
        // Final clock reading stays on the match
        m.current_period = next;
    } else {
        enter(m, next);
    }

    info!(
        "Match {} | {} ended at {}s, now {}",
        m.id, finished, m.elapsed_time, next
    );

    if next.auto_starts() {
        clock.start(m);
        debug!("Match {} | {} started automatically", m.id, next);
    }

    Ok(next)
}

/// Pause a running playing period
pub fn pause(m: &mut Match, clock: &Clock) -> TrackerResult<u32> {
    if !m.is_running() {
        return Err(Rejection::IllegalTransition {
            action: "pause",
            period: m.current_period,
        });
    }

    clock.pause(m);
    debug!("Match {} | paused at {}s", m.id, m.elapsed_time);
    Ok(m.elapsed_time)
}

/// Resume a paused playing period without losing time
pub fn resume(m: &mut Match, clock: &Clock) -> TrackerResult<u32> {
    if !m.current_period.is_playing() || !m.is_paused {
        return Err(Rejection::IllegalTransition {
            action: "resume",
            period: m.current_period,
        });
    }

    clock.resume(m);
    debug!("Match {} | resumed at {}s", m.id, m.elapsed_time);
    Ok(m.elapsed_time)
}

fn enter(m: &mut Match, period: Period) {
    m.current_period = period;
    m.elapsed_time = 0;
    m.is_paused = true;
    m.period_start_timestamp = None;
}
