use anyhow::Context;
use geofriends_planner::adapters::inbound::FilesystemLevelSource;
use geofriends_planner::adapters::outbound::{init_combined_logger, FileEventJournal};
use geofriends_planner::application::Session;
use geofriends_planner::domains::agent::Decision;
use geofriends_planner::domains::ports::LevelDataSource;
use geofriends_planner::Config;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const MAX_TICKS: u64 = 200;

fn describe(decision: &Decision) -> String {
    match &decision.target {
        Some(target) => format!(
            "{:?} -> {} (cost {:.1}, {} waypoints)",
            decision.mode,
            target,
            decision.path_cost.unwrap_or_default(),
            decision.path.len()
        ),
        None => format!("{:?} ({})", decision.mode, decision.state),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Usage: geofriends-planner [level-name] [config.toml]
    let mut args = std::env::args().skip(1);
    let level_name = args.next().unwrap_or_else(|| "demo".to_string());
    let config_path = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = Config::load(Some(Path::new(&config_path)))
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();
    info!("Starting geofriends-planner");

    let logger = init_combined_logger(config.logging.file.as_deref());
    let levels = FilesystemLevelSource::new(None);
    let level = levels
        .load_level(&level_name)
        .with_context(|| format!("loading level {} from {}", level_name, levels.base().display()))?;
    info!(
        level = %level_name,
        diamonds = level.collectibles.len(),
        obstacles = level.obstacles.len(),
        "Level loaded"
    );

    let mut session = Session::new(&config, logger);
    session.start(&level)?;
    let report = session.run_until_settled(MAX_TICKS)?;

    println!("Level: {}", report.level.as_deref().unwrap_or(&level_name));
    println!("  circle:    {}", describe(&report.circle));
    println!("  rectangle: {}", describe(&report.rectangle));
    println!(
        "  {} decide ticks, {} messages exchanged",
        report.decide_ticks, report.messages_exchanged
    );

    match &config.logging.journal_dir {
        Some(dir) => {
            let journal = FileEventJournal::new(dir);
            let written = session.flush_events(&journal).await?;
            info!(written, stream = %session.stream_id(), "Allocation events journaled");
        }
        None => {
            let events = session.drain_events()?;
            info!(count = events.len(), "Allocation events discarded (no journal configured)");
        }
    }

    if report.circle.is_idle() && report.rectangle.is_idle() {
        warn!("Neither agent has anything to go for");
    }
    session.end(0, 0.0);
    Ok(())
}
