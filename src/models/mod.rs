pub mod event;
pub mod match_state;
pub mod panel;
pub mod period;

pub use event::{
    CardType, Event, EventDraft, EventKind, EventPatch, FoulOutcome, ShotOutcome, ShotType,
};
pub use match_state::{Match, MatchMetadata, MatchType, Player, Team, TeamKey, ROSTER_SIZE};
pub use panel::{PanelPlayer, PanelSelections, PlayerPanel};
pub use period::Period;
