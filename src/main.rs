#![windows_subsystem = "windows"]

use anyhow::Result;
use monview::{config::Config, gui};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    // Environment overrides on top of the Monad testnet defaults
    let config = Config::from_env();
    gui::launch(config)?;

    Ok(())
}
