//! Memory Archive terminal player entry point.

use std::error::Error;

use memarchive_core::clock::SystemClock;
use memarchive_orchestrator::application::archive::{Archive, Ports};
use memarchive_player::bookmark::FileBookmark;
use memarchive_player::config::PlayerConfig;
use memarchive_player::driver::Player;
use memarchive_player::store::JsonFileStore;
use memarchive_player::terminal::{LoggingMediaDeck, TerminalSurface};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

const BOOKMARK_FILE: &str = "location";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr; stdout belongs to the rendered archive.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Memory Archive player");

    let config = PlayerConfig::from_env()?;
    let story = config.load_story()?;
    let store = JsonFileStore::open(&config.state_dir)?;
    tracing::info!(state = %config.state_dir.display(), "state directory ready");

    let ports = Ports {
        store: Box::new(store),
        surface: Box::new(TerminalSurface::new(std::io::stdout())),
        media: Box::new(LoggingMediaDeck),
        bookmark: Box::new(FileBookmark::new(config.state_dir.join(BOOKMARK_FILE))),
        clock: Box::new(SystemClock),
    };
    let archive = Archive::new(&story, ports)?;

    let mut player = Player::new(archive, std::io::stdout());
    player.start();
    player.run(BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}
