use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::event::Event;
use super::period::Period;

/// Number of players generated for each team when a match is created
pub const ROSTER_SIZE: u8 = 30;

/// Code being played, which decides how two-point scores count
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MatchType {
    #[default]
    Football,
    LadiesFootball,
    Hurling,
    Camogie,
}

impl MatchType {
    /// Football codes count a two-pointer as two points in the final score
    pub fn is_football_family(&self) -> bool {
        matches!(self, MatchType::Football | MatchType::LadiesFootball)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Football => "football",
            MatchType::LadiesFootball => "ladiesFootball",
            MatchType::Hurling => "hurling",
            MatchType::Camogie => "camogie",
        }
    }
}

/// Descriptive details captured when a match is set up
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    /// Competition name (league, championship, friendly)
    #[serde(default)]
    pub competition: String,

    /// Throw-in date and time as entered; seconds are optional
    #[serde(default, deserialize_with = "deserialize_date_time")]
    pub date_time: Option<NaiveDateTime>,

    #[serde(default)]
    pub venue: String,

    #[serde(default)]
    pub referee: String,

    #[serde(default)]
    pub match_type: MatchType,

    /// Length of each half in minutes
    #[serde(default)]
    pub half_length: Option<u32>,

    /// Length of each extra-time half in minutes; absent or zero means no extra time
    #[serde(default)]
    pub extra_half_length: Option<u32>,
}

impl MatchMetadata {
    pub fn has_extra_time(&self) -> bool {
        self.extra_half_length.is_some_and(|minutes| minutes > 0)
    }
}

/// Accepted `dateTime` layouts; date-time pickers usually leave off the seconds
const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

fn deserialize_date_time<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid dateTime '{}'", text)))
}

/// A player on a team roster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,

    /// Display name; `No.<jersey>` until the player is named
    pub name: String,

    pub jersey_number: u8,

    #[serde(default)]
    pub position: String,
}

impl Player {
    pub fn numbered(jersey_number: u8) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: Self::default_name(jersey_number),
            jersey_number,
            position: String::new(),
        }
    }

    pub fn default_name(jersey_number: u8) -> String {
        format!("No.{}", jersey_number)
    }

    /// Whether the player still carries the generated placeholder name
    pub fn is_unnamed(&self) -> bool {
        self.name == Self::default_name(self.jersey_number)
    }
}

/// One side of a match
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub players: Vec<Player>,
}

impl Team {
    /// Create a team with a full numbered roster
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            players: (1..=ROSTER_SIZE).map(Player::numbered).collect(),
        }
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.player(player_id).is_some()
    }
}

/// Selects one of the two teams in a match
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TeamKey {
    Team1,
    Team2,
}

impl TeamKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamKey::Team1 => "team1",
            TeamKey::Team2 => "team2",
        }
    }
}

/// A match and everything recorded against it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,

    #[serde(flatten)]
    pub metadata: MatchMetadata,

    pub team1: Team,
    pub team2: Team,

    pub current_period: Period,

    /// Seconds into the current period; only authoritative while paused
    pub elapsed_time: u32,

    pub is_paused: bool,

    /// Wall-clock anchor (ms since epoch) that elapsed time is measured from while running
    #[serde(default)]
    pub period_start_timestamp: Option<i64>,

    /// Creation order, never resorted
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Match {
    /// New match with generated rosters, not started and paused
    pub fn new(team1_name: &str, team2_name: &str, metadata: MatchMetadata) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            metadata,
            team1: Team::new(team1_name),
            team2: Team::new(team2_name),
            current_period: Period::NotStarted,
            elapsed_time: 0,
            is_paused: true,
            period_start_timestamp: None,
            events: Vec::new(),
        }
    }

    pub fn team(&self, key: TeamKey) -> &Team {
        match key {
            TeamKey::Team1 => &self.team1,
            TeamKey::Team2 => &self.team2,
        }
    }

    pub fn team_mut(&mut self, key: TeamKey) -> &mut Team {
        match key {
            TeamKey::Team1 => &mut self.team1,
            TeamKey::Team2 => &mut self.team2,
        }
    }

    /// Resolve a team id to its slot in this match
    pub fn team_key(&self, team_id: &str) -> Option<TeamKey> {
        if self.team1.id == team_id {
            Some(TeamKey::Team1)
        } else if self.team2.id == team_id {
            Some(TeamKey::Team2)
        } else {
            None
        }
    }

    pub fn has_extra_time(&self) -> bool {
        self.metadata.has_extra_time()
    }

    pub fn is_running(&self) -> bool {
        !self.is_paused && self.current_period.is_playing()
    }

    pub fn event(&self, event_id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == event_id)
    }

    /// Events attributed to one team, in creation order
    pub fn team_events(&self, key: TeamKey) -> Vec<&Event> {
        let team_id = &self.team(key).id;
        self.events
            .iter()
            .filter(|e| e.team_id.as_deref() == Some(team_id.as_str()))
            .collect()
    }
}
