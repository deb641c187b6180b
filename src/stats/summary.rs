use serde::Serialize;

use super::score::{canonical_score, CanonicalScore};
use crate::models::{CardType, Event, EventKind, FoulOutcome, Match, ShotOutcome, TeamKey};

/// Label used in place of a winner when the totals are level
pub const DRAW: &str = "Draw";

/// Share of shots that scored, as a percentage; 0 when there were no shots
pub fn shooting_accuracy(shots: &[&Event]) -> f64 {
    let total = shots.iter().filter(|e| e.is_shot()).count();
    if total == 0 {
        return 0.0;
    }

    let successful = shots
        .iter()
        .filter_map(|e| e.shot_outcome())
        .filter(ShotOutcome::is_score)
        .count();

    successful as f64 / total as f64 * 100.0
}

/// One decimal place, as shown in team summaries
pub fn format_accuracy_summary(accuracy: f64) -> String {
    format!("{:.1}", accuracy)
}

/// Whole number, as shown on side-by-side comparison cards
pub fn format_accuracy_comparison(accuracy: f64) -> String {
    format!("{}", accuracy.round() as i64)
}

/// Headline numbers for a finished or in-progress match
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub total_shots: u32,
    pub total_fouls: u32,
    pub total_cards: u32,

    /// Name of the team ahead on canonical totals, or `Draw`
    pub winner: String,

    pub margin: u32,
}

pub fn match_summary(m: &Match) -> MatchSummary {
    let team1 = canonical_score(m, TeamKey::Team1);
    let team2 = canonical_score(m, TeamKey::Team2);

    let winner = if team1.total > team2.total {
        m.team1.name.clone()
    } else if team2.total > team1.total {
        m.team2.name.clone()
    } else {
        DRAW.to_string()
    };

    MatchSummary {
        total_shots: count(&m.events, Event::is_shot),
        total_fouls: count(&m.events, Event::is_foul),
        total_cards: count(&m.events, |e| e.card_type().is_some()),
        winner,
        margin: team1.total.abs_diff(team2.total),
    }
}

/// Full statistical breakdown for one team
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub score: CanonicalScore,
    pub shots: u32,
    pub scores: u32,
    pub wides: u32,
    pub saved: u32,
    pub dropped_short: u32,
    pub off_post: u32,
    pub accuracy: f64,
    pub frees_conceded: u32,
    pub penalties_conceded: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub black_cards: u32,
    pub kickouts_won: u32,
    pub kickouts_lost: u32,
    pub substitutions: u32,
}

impl TeamStats {
    pub fn accuracy_display(&self) -> String {
        format_accuracy_summary(self.accuracy)
    }

    pub fn kickouts_total(&self) -> u32 {
        self.kickouts_won + self.kickouts_lost
    }
}

pub fn team_stats(m: &Match, team: TeamKey) -> TeamStats {
    let events = m.team_events(team);
    let mut stats = TeamStats {
        score: canonical_score(m, team),
        shots: 0,
        scores: 0,
        wides: 0,
        saved: 0,
        dropped_short: 0,
        off_post: 0,
        accuracy: shooting_accuracy(&events),
        frees_conceded: 0,
        penalties_conceded: 0,
        yellow_cards: 0,
        red_cards: 0,
        black_cards: 0,
        kickouts_won: 0,
        kickouts_lost: 0,
        substitutions: 0,
    };

    for event in &events {
        match &event.kind {
            EventKind::Shot { shot_outcome, .. } => {
                stats.shots += 1;
                match shot_outcome {
                    ShotOutcome::Goal | ShotOutcome::Point | ShotOutcome::TwoPointer => {
                        stats.scores += 1
                    }
                    ShotOutcome::Wide => stats.wides += 1,
                    ShotOutcome::Saved => stats.saved += 1,
                    ShotOutcome::DroppedShort => stats.dropped_short += 1,
                    ShotOutcome::OffPost => stats.off_post += 1,
                }
            }
            EventKind::FoulConceded { foul_outcome, .. } => match foul_outcome {
                FoulOutcome::Free => stats.frees_conceded += 1,
                FoulOutcome::Penalty => stats.penalties_conceded += 1,
            },
            EventKind::Kickout { won_kickout, .. } => {
                if *won_kickout {
                    stats.kickouts_won += 1;
                } else {
                    stats.kickouts_lost += 1;
                }
            }
            EventKind::Substitution { .. } => stats.substitutions += 1,
            EventKind::Card { .. } | EventKind::Note => {}
        }

        match event.card_type() {
            Some(CardType::Yellow) => stats.yellow_cards += 1,
            Some(CardType::Red) => stats.red_cards += 1,
            Some(CardType::Black) => stats.black_cards += 1,
            None => {}
        }
    }

    stats
}

fn count(events: &[Event], pred: impl Fn(&Event) -> bool) -> u32 {
    events.iter().filter(|e| pred(e)).count() as u32
}
