use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Match, PanelSelections, PlayerPanel};

/// Format version written into new export files
pub const EXPORT_VERSION: &str = "1.0";

/// Backup file holding everything the tracker persists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub export_date: DateTime<Utc>,

    #[serde(default)]
    pub matches: Vec<Match>,

    #[serde(default)]
    pub player_panels: Vec<PlayerPanel>,

    #[serde(default)]
    pub last_selected_panels: PanelSelections,
}

impl ExportDocument {
    pub fn new(
        matches: Vec<Match>,
        player_panels: Vec<PlayerPanel>,
        last_selected_panels: PanelSelections,
    ) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            export_date: Utc::now(),
            matches,
            player_panels,
            last_selected_panels,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Outcome of merging an export document into the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub matches_added: usize,
    pub matches_skipped: usize,
    pub panels_added: usize,
    pub panels_skipped: usize,
}

impl std::fmt::Display for ImportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} matches imported ({} already present), {} panels imported ({} already present)",
            self.matches_added, self.matches_skipped, self.panels_added, self.panels_skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchMetadata, TeamKey};

    #[test]
    fn test_document_round_trip() {
        let m = Match::new("Cork", "Kerry", MatchMetadata::default());
        let panel = PlayerPanel::new("Cork U20", &["Conor Corbett".to_string()], 42);
        let mut selections = PanelSelections::new();
        selections.insert(TeamKey::Team1, panel.id.clone());

        let doc = ExportDocument::new(vec![m], vec![panel], selections);
        let text = doc.to_json_pretty().unwrap();

        assert!(text.contains("\"exportDate\""));
        assert!(text.contains("\"playerPanels\""));
        assert!(text.contains("\"lastSelectedPanels\""));
        assert_eq!(ExportDocument::from_json(&text).unwrap(), doc);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let text = r#"{ "version": "1.0", "exportDate": "2024-06-01T12:00:00Z" }"#;
        let doc = ExportDocument::from_json(text).unwrap();

        assert!(doc.matches.is_empty());
        assert!(doc.player_panels.is_empty());
        assert!(doc.last_selected_panels.is_empty());
    }
}
