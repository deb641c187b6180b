use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Event, EventKind, Player, ShotOutcome};

/// Default number of entries in a top scorers list
pub const TOP_SCORERS: usize = 5;

/// Activity of one roster player over a set of events
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats<'a> {
    pub player_id: &'a str,
    pub name: &'a str,
    pub jersey_number: u8,
    pub goals: u32,
    pub points: u32,
    pub two_pointers: u32,

    /// Goals at three, points at one and two-pointers at two
    pub total_score: u32,

    pub shots: u32,
    pub fouls: u32,
    pub cards: u32,

    #[serde(skip)]
    pub events: Vec<&'a Event>,
}

impl<'a> PlayerStats<'a> {
    fn new(player: &'a Player) -> Self {
        Self {
            player_id: &player.id,
            name: &player.name,
            jersey_number: player.jersey_number,
            goals: 0,
            points: 0,
            two_pointers: 0,
            total_score: 0,
            shots: 0,
            fouls: 0,
            cards: 0,
            events: Vec::new(),
        }
    }

    fn record(&mut self, event: &'a Event) {
        match &event.kind {
            EventKind::Shot { shot_outcome, .. } => {
                self.shots += 1;
                match shot_outcome {
                    ShotOutcome::Goal => self.goals += 1,
                    ShotOutcome::Point => self.points += 1,
                    ShotOutcome::TwoPointer => self.two_pointers += 1,
                    _ => {}
                }
            }
            EventKind::FoulConceded { card_type, .. } => {
                self.fouls += 1;
                if card_type.is_some() {
                    self.cards += 1;
                }
            }
            EventKind::Card { .. } => self.cards += 1,
            EventKind::Substitution { .. } | EventKind::Kickout { .. } | EventKind::Note => {}
        }

        self.total_score = self.goals * 3 + self.points + self.two_pointers * 2;
        self.events.push(event);
    }

    /// Whether anything at all was recorded against the player
    pub fn is_active(&self) -> bool {
        !self.events.is_empty()
    }

    /// Score line such as `1-04`, two-pointers counted as two points
    pub fn score_display(&self) -> String {
        super::format_score(self.goals, self.points + self.two_pointers * 2)
    }
}

/// Per-player breakdown of a team's events, one entry per roster player in roster order.
///
/// Events are attributed by `player1_id`; players with nothing recorded still
/// get an entry.
pub fn player_stats<'a>(team_events: &[&'a Event], players: &'a [Player]) -> Vec<PlayerStats<'a>> {
    let mut stats: Vec<PlayerStats<'a>> = players.iter().map(PlayerStats::new).collect();
    let index: HashMap<&str, usize> = players
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id.as_str(), i))
        .collect();

    for &event in team_events {
        if let Some(&i) = event.player1_id().and_then(|id| index.get(id)) {
            stats[i].record(event);
        }
    }

    stats
}

/// Players with any recorded activity
pub fn active_players<'a, 'b>(stats: &'b [PlayerStats<'a>]) -> Vec<&'b PlayerStats<'a>> {
    stats.iter().filter(|s| s.is_active()).collect()
}

/// Highest scorers first, ties broken by name; players who have not scored are left out
pub fn top_scorers<'a, 'b>(stats: &'b [PlayerStats<'a>], n: usize) -> Vec<&'b PlayerStats<'a>> {
    let mut scorers: Vec<&PlayerStats> = stats.iter().filter(|s| s.total_score > 0).collect();
    scorers.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then_with(|| a.name.cmp(b.name))
    });
    scorers.truncate(n);
    scorers
}
