use serde::{Deserialize, Serialize};

use super::period::Period;

/// Result of a shot at the posts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ShotOutcome {
    Goal,
    Point,
    TwoPointer,
    Wide,
    Saved,
    DroppedShort,
    OffPost,
}

impl ShotOutcome {
    /// Goals, points and two-pointers all raise a score
    pub fn is_score(&self) -> bool {
        matches!(
            self,
            ShotOutcome::Goal | ShotOutcome::Point | ShotOutcome::TwoPointer
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShotOutcome::Goal => "goal",
            ShotOutcome::Point => "point",
            ShotOutcome::TwoPointer => "twoPointer",
            ShotOutcome::Wide => "wide",
            ShotOutcome::Saved => "saved",
            ShotOutcome::DroppedShort => "droppedShort",
            ShotOutcome::OffPost => "offPost",
        }
    }
}

/// How the shot came about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ShotType {
    FromPlay,
    Free,
    Penalty,
    FortyFive,
    SixtyFive,
    Sideline,
    Mark,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CardType {
    Yellow,
    Red,
    Black,
}

/// What the opposition was awarded for a foul
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FoulOutcome {
    Free,
    Penalty,
}

/// Type-specific payload of an event, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EventKind {
    Shot {
        player1_id: Option<String>,
        shot_outcome: ShotOutcome,
        shot_type: ShotType,
    },
    /// `player1_id` leaves the field, `player2_id` comes on
    Substitution {
        player1_id: Option<String>,
        player2_id: Option<String>,
    },
    Kickout {
        player1_id: Option<String>,
        won_kickout: bool,
    },
    Card {
        player1_id: Option<String>,
        card_type: CardType,
    },
    FoulConceded {
        player1_id: Option<String>,
        foul_outcome: FoulOutcome,
        card_type: Option<CardType>,
    },
    Note,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Shot { .. } => "shot",
            EventKind::Substitution { .. } => "substitution",
            EventKind::Kickout { .. } => "kickout",
            EventKind::Card { .. } => "card",
            EventKind::FoulConceded { .. } => "foulConceded",
            EventKind::Note => "note",
        }
    }

    pub fn player1_id(&self) -> Option<&str> {
        match self {
            EventKind::Shot { player1_id, .. }
            | EventKind::Substitution { player1_id, .. }
            | EventKind::Kickout { player1_id, .. }
            | EventKind::Card { player1_id, .. }
            | EventKind::FoulConceded { player1_id, .. } => player1_id.as_deref(),
            EventKind::Note => None,
        }
    }

    pub fn player2_id(&self) -> Option<&str> {
        match self {
            EventKind::Substitution { player2_id, .. } => player2_id.as_deref(),
            _ => None,
        }
    }

    /// Whether both kinds are the same event type, ignoring payload
    pub fn same_type(&self, other: &EventKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// A recorded match event.
///
/// `period` and `time_elapsed` are stamped when the event is created and are
/// never recomputed, even when the payload is edited later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub period: Period,
    pub time_elapsed: u32,
    pub team_id: Option<String>,
    pub note_text: Option<String>,

    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn player1_id(&self) -> Option<&str> {
        self.kind.player1_id()
    }

    pub fn player2_id(&self) -> Option<&str> {
        self.kind.player2_id()
    }

    pub fn shot_outcome(&self) -> Option<ShotOutcome> {
        match self.kind {
            EventKind::Shot { shot_outcome, .. } => Some(shot_outcome),
            _ => None,
        }
    }

    pub fn is_shot(&self) -> bool {
        matches!(self.kind, EventKind::Shot { .. })
    }

    /// Card shown, whether recorded directly or attached to a foul
    pub fn card_type(&self) -> Option<CardType> {
        match self.kind {
            EventKind::Card { card_type, .. } => Some(card_type),
            EventKind::FoulConceded { card_type, .. } => card_type,
            _ => None,
        }
    }

    pub fn is_foul(&self) -> bool {
        matches!(self.kind, EventKind::FoulConceded { .. })
    }

    /// Match clock at creation, as `mm:ss`
    pub fn clock_label(&self) -> String {
        format!("{:02}:{:02}", self.time_elapsed / 60, self.time_elapsed % 60)
    }
}

/// Input for recording a new event; id and clock stamps are filled in on append
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub team_id: Option<String>,
    pub note_text: Option<String>,
    pub kind: EventKind,
}

impl EventDraft {
    pub fn new(team_id: Option<&str>, kind: EventKind) -> Self {
        Self {
            team_id: team_id.map(str::to_string),
            note_text: None,
            kind,
        }
    }

    pub fn shot(
        team_id: &str,
        player1_id: Option<&str>,
        shot_outcome: ShotOutcome,
        shot_type: ShotType,
    ) -> Self {
        Self::new(
            Some(team_id),
            EventKind::Shot {
                player1_id: player1_id.map(str::to_string),
                shot_outcome,
                shot_type,
            },
        )
    }

    pub fn note(text: &str) -> Self {
        Self {
            team_id: None,
            note_text: Some(text.to_string()),
            kind: EventKind::Note,
        }
    }
}

/// Payload changes for an existing event; `None` leaves a field as it is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub team_id: Option<Option<String>>,
    pub note_text: Option<Option<String>>,
    pub kind: Option<EventKind>,
}
