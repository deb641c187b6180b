use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gaelic_tracker::clock::SystemTimeSource;
use gaelic_tracker::config::Config;
use gaelic_tracker::db::SqliteStore;
use gaelic_tracker::export::ExportDocument;
use gaelic_tracker::models::TeamKey;
use gaelic_tracker::stats;
use gaelic_tracker::TrackerSession;

const USAGE: &str = "usage: gaelic-tracker [summary | export <path> | import <path>]";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gaelic_tracker=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!("Configuration loaded");

    let store = Arc::new(SqliteStore::new(&config.database_url).await?);
    let mut session = TrackerSession::load(
        store,
        Arc::new(SystemTimeSource),
        Duration::from_millis(config.tick_interval_ms),
    )
    .await;

    let args: Vec<String> = env::args().collect();
    match (args.get(1).map(String::as_str), args.get(2)) {
        (None | Some("summary"), _) => print_summary(&session),
        (Some("export"), Some(path)) => export(&session, Path::new(path))?,
        (Some("import"), Some(path)) => import(&mut session, Path::new(path))?,
        _ => bail!(USAGE),
    }

    let report = session.flush().await;
    if report.failed > 0 {
        warn!("{} saves failed", report.failed);
    }

    Ok(())
}

fn print_summary(session: &TrackerSession) {
    if session.matches().is_empty() {
        info!("No matches recorded");
        return;
    }

    for m in session.matches() {
        let team1 = stats::canonical_score(m, TeamKey::Team1);
        let team2 = stats::canonical_score(m, TeamKey::Team2);
        let summary = stats::match_summary(m);

        info!(
            "{} | {} {} - {} {} | {} | {} events | winner: {} by {}",
            if m.metadata.competition.is_empty() {
                "Friendly"
            } else {
                &m.metadata.competition
            },
            m.team1.name,
            team1.display(),
            team2.display(),
            m.team2.name,
            m.current_period,
            m.events.len(),
            summary.winner,
            summary.margin,
        );

        for key in [TeamKey::Team1, TeamKey::Team2] {
            let team = m.team(key);
            let events = m.team_events(key);
            let players = stats::player_stats(&events, &team.players);

            for scorer in stats::top_scorers(&players, stats::TOP_SCORERS) {
                info!("    {} - {} {}", team.name, scorer.name, scorer.score_display());
            }
        }
    }
}

fn export(session: &TrackerSession, path: &Path) -> Result<()> {
    let doc = session.export();
    let text = doc.to_json_pretty().context("Failed to serialize export")?;
    std::fs::write(path, text).context("Failed to write export file")?;

    info!(
        "Exported {} matches and {} panels to {}",
        doc.matches.len(),
        doc.player_panels.len(),
        path.display()
    );
    Ok(())
}

fn import(session: &mut TrackerSession, path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path).context("Failed to read import file")?;
    let doc = ExportDocument::from_json(&text).context("Failed to parse import file")?;

    let report = session.import(doc);
    info!("{}", report);
    Ok(())
}
