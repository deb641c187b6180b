//! Append-only event log of a match.
//!
//! The log is the single source of truth for scores and statistics; nothing
//! derived from it is stored on the match.

use tracing::debug;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Rejection, TrackerResult};
use crate::models::{Event, EventDraft, EventKind, EventPatch, Match};

/// Record a new event stamped with the current period and clock
pub fn append<'a>(m: &'a mut Match, draft: EventDraft, clock: &Clock) -> TrackerResult<&'a Event> {
    if !m.current_period.is_playing() {
        return Err(Rejection::NotPlaying(m.current_period));
    }

    validate_refs(m, draft.team_id.as_deref(), &draft.kind)?;

    let event = Event {
        id: Uuid::new_v4().to_string(),
        period: m.current_period,
        time_elapsed: clock.current_elapsed(m),
        team_id: draft.team_id,
        note_text: draft.note_text,
        kind: draft.kind,
    };

    debug!(
        "Match {} | {} recorded at {} {}",
        m.id,
        event.kind.name(),
        event.period,
        event.clock_label()
    );

    m.events.push(event);
    Ok(&m.events[m.events.len() - 1])
}

/// Edit the payload of an existing event.
///
/// Allowed in any period. The event keeps its id, type, period and time stamp.
pub fn update<'a>(m: &'a mut Match, event_id: &str, patch: EventPatch) -> TrackerResult<&'a Event> {
    let index = m
        .events
        .iter()
        .position(|e| e.id == event_id)
        .ok_or_else(|| Rejection::EventNotFound(event_id.to_string()))?;

    let current = &m.events[index];
    let team_id = patch.team_id.unwrap_or_else(|| current.team_id.clone());
    let note_text = patch.note_text.unwrap_or_else(|| current.note_text.clone());
    let kind = patch.kind.unwrap_or_else(|| current.kind.clone());

    if !kind.same_type(&current.kind) {
        return Err(Rejection::TypeChange {
            from: current.kind.name(),
            to: kind.name(),
        });
    }

    validate_refs(m, team_id.as_deref(), &kind)?;

    let event = &mut m.events[index];
    event.team_id = team_id;
    event.note_text = note_text;
    event.kind = kind;

    debug!("Match {} | event {} edited", m.id, event_id);
    Ok(&m.events[index])
}

/// Drop an event by id
pub fn remove(m: &mut Match, event_id: &str) -> TrackerResult<Event> {
    let index = m
        .events
        .iter()
        .position(|e| e.id == event_id)
        .ok_or_else(|| Rejection::EventNotFound(event_id.to_string()))?;

    debug!("Match {} | event {} removed", m.id, event_id);
    Ok(m.events.remove(index))
}

/// Events in creation order
pub fn events_in_order(m: &Match) -> impl DoubleEndedIterator<Item = &Event> {
    m.events.iter()
}

/// Events newest first, as shown in the match feed
pub fn events_for_display(m: &Match) -> impl Iterator<Item = &Event> {
    events_in_order(m).rev()
}

/// Check that the team and players an event points at belong to this match
fn validate_refs(m: &Match, team_id: Option<&str>, kind: &EventKind) -> TrackerResult<()> {
    let team = match team_id {
        Some(id) => {
            let key = m
                .team_key(id)
                .ok_or_else(|| Rejection::UnknownTeam(id.to_string()))?;
            Some(m.team(key))
        }
        None => None,
    };

    for player_id in [kind.player1_id(), kind.player2_id()].into_iter().flatten() {
        let known = match team {
            Some(team) => team.has_player(player_id),
            None => m.team1.has_player(player_id) || m.team2.has_player(player_id),
        };
        if !known {
            return Err(Rejection::UnknownPlayer(player_id.to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::ManualTimeSource;
    use crate::models::{CardType, MatchMetadata, Period, ShotOutcome, ShotType};

    fn playing_match() -> (ManualTimeSource, Clock, Match) {
        let source = ManualTimeSource::new(0);
        let clock = Clock::new(Arc::new(source.clone()));
        let mut m = Match::new("Derry", "Armagh", MatchMetadata::default());
        m.current_period = Period::FirstHalf;
        clock.start(&mut m);
        (source, clock, m)
    }

    #[test]
    fn test_append_stamps_period_and_time() {
        let (source, clock, mut m) = playing_match();
        source.advance_secs(312);

        let team_id = m.team1.id.clone();
        let shooter = m.team1.players[13].id.clone();
        let event = append(
            &mut m,
            EventDraft::shot(&team_id, Some(shooter.as_str()), ShotOutcome::Point, ShotType::Free),
            &clock,
        )
        .unwrap();

        assert_eq!(event.period, Period::FirstHalf);
        assert_eq!(event.time_elapsed, 312);
        assert_eq!(event.player1_id(), Some(shooter.as_str()));
    }

    #[test]
    fn test_append_rejected_outside_play() {
        let (_, clock, mut m) = playing_match();
        m.current_period = Period::HalfTime;
        let team_id = m.team1.id.clone();

        let result = append(
            &mut m,
            EventDraft::shot(&team_id, None, ShotOutcome::Goal, ShotType::FromPlay),
            &clock,
        );

        assert_eq!(result.unwrap_err(), Rejection::NotPlaying(Period::HalfTime));
        assert!(m.events.is_empty());
    }

    #[test]
    fn test_append_rejects_foreign_references() {
        let (_, clock, mut m) = playing_match();
        let team1 = m.team1.id.clone();
        let other_side = m.team2.players[0].id.clone();

        let unknown_team = append(
            &mut m,
            EventDraft::shot("elsewhere", None, ShotOutcome::Wide, ShotType::FromPlay),
            &clock,
        );
        assert!(matches!(unknown_team, Err(Rejection::UnknownTeam(_))));

        let wrong_player = append(
            &mut m,
            EventDraft::shot(&team1, Some(other_side.as_str()), ShotOutcome::Wide, ShotType::FromPlay),
            &clock,
        );
        assert!(matches!(wrong_player, Err(Rejection::UnknownPlayer(_))));
        assert!(m.events.is_empty());
    }

    #[test]
    fn test_update_keeps_stamps_and_allows_any_period() {
        let (source, clock, mut m) = playing_match();
        source.advance_secs(90);
        let team_id = m.team1.id.clone();
        let id = append(
            &mut m,
            EventDraft::shot(&team_id, None, ShotOutcome::Wide, ShotType::FromPlay),
            &clock,
        )
        .unwrap()
        .id
        .clone();

        m.current_period = Period::FullTime;
        source.advance_secs(2_000);

        let patch = EventPatch {
            kind: Some(EventKind::Shot {
                player1_id: None,
                shot_outcome: ShotOutcome::Goal,
                shot_type: ShotType::Penalty,
            }),
            note_text: Some(Some("retaken".to_string())),
            ..Default::default()
        };
        let edited = update(&mut m, &id, patch).unwrap();

        assert_eq!(edited.shot_outcome(), Some(ShotOutcome::Goal));
        assert_eq!(edited.period, Period::FirstHalf);
        assert_eq!(edited.time_elapsed, 90);
        assert_eq!(edited.note_text.as_deref(), Some("retaken"));
    }

    #[test]
    fn test_update_cannot_change_type() {
        let (_, clock, mut m) = playing_match();
        let team_id = m.team2.id.clone();
        let id = append(
            &mut m,
            EventDraft::new(
                Some(team_id.as_str()),
                EventKind::Card {
                    player1_id: None,
                    card_type: CardType::Yellow,
                },
            ),
            &clock,
        )
        .unwrap()
        .id
        .clone();
        let before = m.clone();

        let patch = EventPatch {
            kind: Some(EventKind::Note),
            ..Default::default()
        };

        assert!(matches!(
            update(&mut m, &id, patch),
            Err(Rejection::TypeChange { .. })
        ));
        assert_eq!(m, before);
    }

    #[test]
    fn test_update_rejects_foreign_team() {
        let (_, clock, mut m) = playing_match();
        let team_id = m.team1.id.clone();
        let id = append(
            &mut m,
            EventDraft::shot(&team_id, None, ShotOutcome::Point, ShotType::Mark),
            &clock,
        )
        .unwrap()
        .id
        .clone();
        let before = m.clone();

        let patch = EventPatch {
            team_id: Some(Some("elsewhere".to_string())),
            ..Default::default()
        };

        assert_eq!(
            update(&mut m, &id, patch),
            Err(Rejection::UnknownTeam("elsewhere".to_string()))
        );
        assert_eq!(m, before);
    }

    #[test]
    fn test_update_rejects_substitute_from_other_team() {
        let (_, clock, mut m) = playing_match();
        let team_id = m.team1.id.clone();
        let off = m.team1.players[5].id.clone();
        let on = m.team1.players[20].id.clone();
        let other_side = m.team2.players[20].id.clone();

        let draft = EventDraft::new(
            Some(team_id.as_str()),
            EventKind::Substitution {
                player1_id: Some(off.clone()),
                player2_id: Some(on),
            },
        );
        let id = append(&mut m, draft, &clock).unwrap().id.clone();
        let before = m.clone();

        let patch = EventPatch {
            kind: Some(EventKind::Substitution {
                player1_id: Some(off),
                player2_id: Some(other_side.clone()),
            }),
            ..Default::default()
        };

        assert_eq!(
            update(&mut m, &id, patch),
            Err(Rejection::UnknownPlayer(other_side))
        );
        assert_eq!(m, before);
    }

    #[test]
    fn test_remove_and_display_order() {
        let (source, clock, mut m) = playing_match();
        let mut ids = Vec::new();
        for text in ["one", "two", "three"] {
            source.advance_secs(1);
            ids.push(append(&mut m, EventDraft::note(text), &clock).unwrap().id.clone());
        }

        let display: Vec<&str> = events_for_display(&m)
            .filter_map(|e| e.note_text.as_deref())
            .collect();
        assert_eq!(display, vec!["three", "two", "one"]);

        remove(&mut m, &ids[1]).unwrap();
        let stored: Vec<&str> = events_in_order(&m).map(|e| e.id.as_str()).collect();
        assert_eq!(stored, vec![ids[0].as_str(), ids[2].as_str()]);

        assert!(matches!(
            remove(&mut m, "missing"),
            Err(Rejection::EventNotFound(_))
        ));
    }
}
