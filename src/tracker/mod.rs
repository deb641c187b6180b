pub mod event_log;
pub mod periods;

use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{Rejection, TrackerResult};
use crate::models::{
    Event, EventDraft, EventPatch, Match, MatchMetadata, Period, Player, PlayerPanel, TeamKey,
};

/// Owns the match collection and is the only place match state is mutated.
///
/// Every operation either applies completely or returns a [`Rejection`] and
/// leaves the match untouched.
#[derive(Debug)]
pub struct MatchTracker {
    matches: Vec<Match>,
    clock: Clock,
}

impl MatchTracker {
    pub fn new(clock: Clock) -> Self {
        Self {
            matches: Vec::new(),
            clock,
        }
    }

    pub fn with_matches(clock: Clock, matches: Vec<Match>) -> Self {
        Self { matches, clock }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Set up a new match with numbered rosters
    pub fn create(
        &mut self,
        team1_name: &str,
        team2_name: &str,
        metadata: MatchMetadata,
    ) -> &Match {
        let m = Match::new(team1_name, team2_name, metadata);
        info!(
            "Created match {}: {} vs {} ({})",
            m.id,
            m.team1.name,
            m.team2.name,
            m.metadata.match_type.as_str()
        );

        self.matches.push(m);
        &self.matches[self.matches.len() - 1]
    }

    /// Add an existing match unless one with the same id is already tracked
    pub fn insert(&mut self, m: Match) -> bool {
        if self.find_by_id(&m.id).is_some() {
            return false;
        }
        self.matches.push(m);
        true
    }

    pub fn find_by_id(&self, match_id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    pub fn delete(&mut self, match_id: &str) -> TrackerResult<Match> {
        let index = self
            .matches
            .iter()
            .position(|m| m.id == match_id)
            .ok_or_else(|| Rejection::MatchNotFound(match_id.to_string()))?;

        info!("Deleted match {}", match_id);
        Ok(self.matches.remove(index))
    }

    pub fn start_period(&mut self, match_id: &str) -> TrackerResult<Period> {
        let clock = self.clock.clone();
        self.apply(match_id, |m| periods::start(m, &clock))
    }

    pub fn end_period(&mut self, match_id: &str) -> TrackerResult<Period> {
        let clock = self.clock.clone();
        self.apply(match_id, |m| periods::end(m, &clock))
    }

    pub fn pause(&mut self, match_id: &str) -> TrackerResult<u32> {
        let clock = self.clock.clone();
        self.apply(match_id, |m| periods::pause(m, &clock))
    }

    pub fn resume(&mut self, match_id: &str) -> TrackerResult<u32> {
        let clock = self.clock.clone();
        self.apply(match_id, |m| periods::resume(m, &clock))
    }

    /// Refresh the stored elapsed time of a running match from its anchor
    pub fn sync_elapsed(&mut self, match_id: &str) -> TrackerResult<u32> {
        let clock = self.clock.clone();
        self.apply(match_id, |m| Ok(clock.sync(m)))
    }

    /// Elapsed seconds in the current period, read without mutating
    pub fn current_elapsed(&self, match_id: &str) -> TrackerResult<u32> {
        let m = self.get(match_id)?;
        Ok(self.clock.current_elapsed(m))
    }

    pub fn record_event(&mut self, match_id: &str, draft: EventDraft) -> TrackerResult<&Event> {
        let clock = self.clock.clone();
        let m = self.get_mut(match_id)?;
        event_log::append(m, draft, &clock).inspect_err(|e| log_rejection(match_id, e))
    }

    pub fn edit_event(
        &mut self,
        match_id: &str,
        event_id: &str,
        patch: EventPatch,
    ) -> TrackerResult<&Event> {
        let m = self.get_mut(match_id)?;
        event_log::update(m, event_id, patch).inspect_err(|e| log_rejection(match_id, e))
    }

    pub fn delete_event(&mut self, match_id: &str, event_id: &str) -> TrackerResult<Event> {
        self.apply(match_id, |m| event_log::remove(m, event_id))
    }

    pub fn update_metadata(&mut self, match_id: &str, metadata: MatchMetadata) -> TrackerResult<()> {
        self.apply(match_id, |m| {
            m.metadata = metadata;
            Ok(())
        })
    }

    pub fn rename_team(&mut self, match_id: &str, team: TeamKey, name: &str) -> TrackerResult<()> {
        self.apply(match_id, |m| {
            m.team_mut(team).name = name.trim().to_string();
            Ok(())
        })
    }

    /// Change a roster entry's display name and position.
    ///
    /// A blank name restores the `No.<jersey>` placeholder.
    pub fn update_player(
        &mut self,
        match_id: &str,
        team: TeamKey,
        player_id: &str,
        name: &str,
        position: &str,
    ) -> TrackerResult<()> {
        self.apply(match_id, |m| {
            let player = m
                .team_mut(team)
                .player_mut(player_id)
                .ok_or_else(|| Rejection::UnknownPlayer(player_id.to_string()))?;

            let name = name.trim();
            player.name = if name.is_empty() {
                Player::default_name(player.jersey_number)
            } else {
                name.to_string()
            };
            player.position = position.trim().to_string();
            Ok(())
        })
    }

    /// Copy panel names onto a roster in jersey order; returns how many were copied
    pub fn apply_panel(
        &mut self,
        match_id: &str,
        team: TeamKey,
        panel: &PlayerPanel,
    ) -> TrackerResult<usize> {
        self.apply(match_id, |m| {
            let roster = &mut m.team_mut(team).players;
            roster.sort_by_key(|p| p.jersey_number);

            let mut copied = 0;
            for (player, entry) in roster.iter_mut().zip(&panel.players) {
                player.name = entry.name.clone();
                copied += 1;
            }

            info!(
                "Match {} | copied {} names from panel '{}' to {}",
                m.id,
                copied,
                panel.name,
                team.as_str()
            );
            Ok(copied)
        })
    }

    fn get(&self, match_id: &str) -> TrackerResult<&Match> {
        self.find_by_id(match_id)
            .ok_or_else(|| Rejection::MatchNotFound(match_id.to_string()))
    }

    fn get_mut(&mut self, match_id: &str) -> TrackerResult<&mut Match> {
        self.matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| Rejection::MatchNotFound(match_id.to_string()))
    }

    /// Run a mutation against one match, logging rejections
    fn apply<T>(
        &mut self,
        match_id: &str,
        op: impl FnOnce(&mut Match) -> TrackerResult<T>,
    ) -> TrackerResult<T> {
        let m = self.get_mut(match_id)?;
        op(m).inspect_err(|e| log_rejection(match_id, e))
    }
}

fn log_rejection(match_id: &str, rejection: &Rejection) {
    debug!("Match {} | rejected: {}", match_id, rejection);
}
