use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::match_state::TeamKey;

/// Entry in a player panel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PanelPlayer {
    pub id: String,
    pub name: String,
}

/// Reusable named squad list, independent of any match.
///
/// Matches never reference a panel; selecting one copies its names onto a roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPanel {
    pub id: String,
    pub name: String,
    pub players: Vec<PanelPlayer>,

    /// Creation time (ms since epoch)
    pub created_at: i64,
}

impl PlayerPanel {
    pub fn new(name: &str, player_names: &[String], created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            players: to_panel_players(player_names),
            created_at,
        }
    }

    /// Replace the panel's name and player list, keeping its identity
    pub fn replace(&mut self, name: &str, player_names: &[String]) {
        self.name = name.trim().to_string();
        self.players = to_panel_players(player_names);
    }
}

/// Last panel chosen for each team slot
pub type PanelSelections = BTreeMap<TeamKey, String>;

fn to_panel_players(names: &[String]) -> Vec<PanelPlayer> {
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(|n| PanelPlayer {
            id: Uuid::new_v4().to_string(),
            name: n.to_string(),
        })
        .collect()
}
