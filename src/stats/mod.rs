//! Scores and statistics derived from a match's event log.
//!
//! Everything here is a pure function of the log; nothing is cached or
//! written back to the match.

pub mod players;
pub mod score;
pub mod summary;

pub use players::{active_players, player_stats, top_scorers, PlayerStats, TOP_SCORERS};
pub use score::{
    canonical_score, format_score, running_score, running_score_at_event, CanonicalScore,
    RunningScore, ScoreLine,
};
pub use summary::{
    format_accuracy_comparison, format_accuracy_summary, match_summary, shooting_accuracy,
    team_stats, MatchSummary, TeamStats, DRAW,
};
