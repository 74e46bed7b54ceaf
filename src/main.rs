//! Binary entry point: read config and flags, set up logging, open the
//! database and hand control to the Ratatui event loop.
use clap::Parser;
use hospital_manager::cli::Cli;
use hospital_manager::config::AppConfig;
use hospital_manager::{run_app, App, Database, Theme};
use tracing::info;

/// Fatal startup problems (an unreadable config file, a broken terminal) are
/// returned to the shell. Database trouble is not fatal; it shows up in the UI.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;
    config.init_logging();

    info!(db = %config.database.path.display(), "starting hospital manager");
    let db = Database::open(&config.database.path);
    let theme = Theme::load_or_default(&config.ui.theme);

    let mut app = App::new(db, theme);
    run_app(&mut app)
}
