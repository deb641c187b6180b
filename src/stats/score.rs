use serde::Serialize;

use crate::models::{Event, Match, MatchType, ShotOutcome, TeamKey};

/// Live scoreboard figures.
///
/// A two-pointer always adds two to `points` here, whatever the code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningScore {
    pub goals: u32,
    pub points: u32,
    pub total: u32,
}

impl RunningScore {
    fn add(&mut self, outcome: ShotOutcome) {
        match outcome {
            ShotOutcome::Goal => self.goals += 1,
            ShotOutcome::Point => self.points += 1,
            ShotOutcome::TwoPointer => self.points += 2,
            _ => return,
        }
        self.total = self.goals * 3 + self.points;
    }

    pub fn display(&self) -> String {
        format_score(self.goals, self.points)
    }
}

/// Final-result figures with two-pointers kept in their own bucket.
///
/// Two-pointers only count towards `total` in the football codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalScore {
    pub goals: u32,
    pub points: u32,
    pub two_pointers: u32,
    pub total: u32,

    #[serde(skip)]
    pub match_type: MatchType,
}

impl CanonicalScore {
    fn new(match_type: MatchType) -> Self {
        Self {
            match_type,
            ..Default::default()
        }
    }

    fn add(&mut self, outcome: ShotOutcome) {
        match outcome {
            ShotOutcome::Goal => self.goals += 1,
            ShotOutcome::Point => self.points += 1,
            ShotOutcome::TwoPointer => self.two_pointers += 1,
            _ => return,
        }

        let two_point_value = if self.match_type.is_football_family() {
            self.two_pointers * 2
        } else {
            0
        };
        self.total = self.goals * 3 + self.points + two_point_value;
    }

    /// Points column as shown to users
    pub fn display_points(&self) -> u32 {
        if self.match_type.is_football_family() {
            self.points + self.two_pointers * 2
        } else {
            self.points
        }
    }

    pub fn display(&self) -> String {
        format_score(self.goals, self.display_points())
    }
}

/// Both teams' running score at some point in the log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreLine {
    pub t1_goals: u32,
    pub t1_points: u32,
    pub t2_goals: u32,
    pub t2_points: u32,
}

impl ScoreLine {
    pub fn team1_display(&self) -> String {
        format_score(self.t1_goals, self.t1_points)
    }

    pub fn team2_display(&self) -> String {
        format_score(self.t2_goals, self.t2_points)
    }
}

impl std::fmt::Display for ScoreLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {}", self.team1_display(), self.team2_display())
    }
}

/// `goals-points` with points padded to two digits, e.g. `2-05`
pub fn format_score(goals: u32, points: u32) -> String {
    format!("{}-{:02}", goals, points)
}

/// Fold a team's shots into the live scoreboard figures
pub fn running_score(m: &Match, team: TeamKey) -> RunningScore {
    fold_running(&m.events, &m.team(team).id)
}

/// Fold a team's shots into the final-result figures
pub fn canonical_score(m: &Match, team: TeamKey) -> CanonicalScore {
    let team_id = &m.team(team).id;
    let mut score = CanonicalScore::new(m.metadata.match_type);

    for outcome in shot_outcomes(&m.events, team_id) {
        score.add(outcome);
    }
    score
}

/// Score of both teams once the given event had been recorded.
///
/// Replays the whole log prefix on every call.
pub fn running_score_at_event(m: &Match, event_id: &str) -> Option<ScoreLine> {
    let index = m.events.iter().position(|e| e.id == event_id)?;
    let prefix = &m.events[..=index];

    let team1 = fold_running(prefix, &m.team1.id);
    let team2 = fold_running(prefix, &m.team2.id);

    Some(ScoreLine {
        t1_goals: team1.goals,
        t1_points: team1.points,
        t2_goals: team2.goals,
        t2_points: team2.points,
    })
}

fn fold_running(events: &[Event], team_id: &str) -> RunningScore {
    let mut score = RunningScore::default();
    for outcome in shot_outcomes(events, team_id) {
        score.add(outcome);
    }
    score
}

fn shot_outcomes<'a>(
    events: &'a [Event],
    team_id: &'a str,
) -> impl Iterator<Item = ShotOutcome> + 'a {
    events
        .iter()
        .filter(move |e| e.team_id.as_deref() == Some(team_id))
        .filter_map(Event::shot_outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventKind, MatchMetadata, Period, ShotType};

    fn match_of(match_type: MatchType) -> Match {
        Match::new(
            "Waterford",
            "Wexford",
            MatchMetadata {
                match_type,
                ..Default::default()
            },
        )
    }

    fn shot(m: &mut Match, team: TeamKey, outcome: ShotOutcome) -> String {
        let id = format!("e{}", m.events.len() + 1);
        let team_id = m.team(team).id.clone();
        let time_elapsed = m.events.len() as u32 * 30;
        m.events.push(Event {
            id: id.clone(),
            period: Period::FirstHalf,
            time_elapsed,
            team_id: Some(team_id),
            note_text: None,
            kind: EventKind::Shot {
                player1_id: None,
                shot_outcome: outcome,
                shot_type: ShotType::FromPlay,
            },
        });
        id
    }

    #[test]
    fn test_running_and_canonical_differ_on_two_pointers() {
        let mut m = match_of(MatchType::Football);
        shot(&mut m, TeamKey::Team1, ShotOutcome::Goal);
        shot(&mut m, TeamKey::Team1, ShotOutcome::Point);
        shot(&mut m, TeamKey::Team1, ShotOutcome::TwoPointer);
        shot(&mut m, TeamKey::Team1, ShotOutcome::Wide);

        let running = running_score(&m, TeamKey::Team1);
        assert_eq!(running, RunningScore { goals: 1, points: 3, total: 6 });
        assert_eq!(running.display(), "1-03");

        let canonical = canonical_score(&m, TeamKey::Team1);
        assert_eq!(canonical.points, 1);
        assert_eq!(canonical.two_pointers, 1);
        assert_eq!(canonical.total, 6);
        assert_eq!(canonical.display(), "1-03");
    }

    #[test]
    fn test_two_pointers_do_not_count_in_hurling_total() {
        let mut m = match_of(MatchType::Hurling);
        shot(&mut m, TeamKey::Team2, ShotOutcome::Point);
        shot(&mut m, TeamKey::Team2, ShotOutcome::TwoPointer);

        let canonical = canonical_score(&m, TeamKey::Team2);
        assert_eq!(canonical.total, 1);
        assert_eq!(canonical.display(), "0-01");

        // The live scoreboard still shows two points for it
        assert_eq!(running_score(&m, TeamKey::Team2).total, 3);
    }

    #[test]
    fn test_ladies_football_counts_two_pointers() {
        let mut m = match_of(MatchType::LadiesFootball);
        shot(&mut m, TeamKey::Team1, ShotOutcome::TwoPointer);
        shot(&mut m, TeamKey::Team1, ShotOutcome::TwoPointer);

        assert_eq!(canonical_score(&m, TeamKey::Team1).total, 4);
    }

    #[test]
    fn test_score_at_event_replays_prefix() {
        let mut m = match_of(MatchType::Football);
        let first = shot(&mut m, TeamKey::Team1, ShotOutcome::Goal);
        let second = shot(&mut m, TeamKey::Team2, ShotOutcome::Point);
        let third = shot(&mut m, TeamKey::Team1, ShotOutcome::TwoPointer);

        let at_first = running_score_at_event(&m, &first).unwrap();
        assert_eq!(at_first.team1_display(), "1-00");
        assert_eq!(at_first.team2_display(), "0-00");

        let at_second = running_score_at_event(&m, &second).unwrap();
        assert_eq!(at_second.to_string(), "1-00 : 0-01");

        let at_third = running_score_at_event(&m, &third).unwrap();
        assert_eq!(at_third, running_score_at_event(&m, &third).unwrap());
        assert_eq!(at_third.t1_points, 2);

        assert!(running_score_at_event(&m, "missing").is_none());
    }

    #[test]
    fn test_score_tracks_log_after_removal() {
        let mut m = match_of(MatchType::Football);
        let goal = shot(&mut m, TeamKey::Team1, ShotOutcome::Goal);
        shot(&mut m, TeamKey::Team1, ShotOutcome::Goal);
        shot(&mut m, TeamKey::Team2, ShotOutcome::Goal);

        m.events.retain(|e| e.id != goal);

        assert_eq!(running_score(&m, TeamKey::Team1).goals, 1);
        assert_eq!(canonical_score(&m, TeamKey::Team2).goals, 1);
    }

    #[test]
    fn test_format_score_pads_points() {
        assert_eq!(format_score(2, 5), "2-05");
        assert_eq!(format_score(0, 17), "0-17");
        assert_eq!(format_score(10, 0), "10-00");
    }
}
