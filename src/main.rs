use anyhow::Context;
use clap::{ArgAction, Parser};
use inkboard::Config;
use inkboard::replay::{self, ReplayScript};
use std::path::PathBuf;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("INKBOARD_GIT_HASH"), ")");

#[derive(Parser, Debug)]
#[command(name = "inkboard")]
#[command(
    version = VERSION,
    about = "Canvas editing core with snapshot undo/redo and interactive shape drawing"
)]
struct Cli {
    /// Replay a TOML input script and print the resulting scene as JSON
    #[arg(long, short = 'r', value_name = "SCRIPT")]
    replay: Option<PathBuf>,

    /// Use this config file instead of ~/.config/inkboard/config.toml
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long, action = ArgAction::SetTrue)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    if let Some(path) = &cli.replay {
        log::info!("Replaying {}", path.display());
        let script = ReplayScript::load(path)?;
        let report = replay::run(&script, &config)?;
        let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        println!("{json}");
        return Ok(());
    }

    // No flags: show usage
    println!("inkboard: Canvas editing core with snapshot undo/redo");
    println!();
    println!("Usage:");
    println!("  inkboard --replay <SCRIPT>   Replay an input script and print the scene");
    println!("  inkboard --print-config      Show the effective configuration");
    println!("  inkboard --help              Show help");
    Ok(())
}
