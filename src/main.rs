//! DrishtiBot - supervisory control daemon
//!
//! Wires the pieces together: configuration, hardware rig, command
//! inputs (console + Ctrl-C), and the supervisor control loop.

use clap::Parser;
use drishti_bot::command::spawn_console_listener;
use drishti_bot::{AppConfig, Command, Error, Result, SharedState, Supervisor, create_robot};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_CONFIG_PATH: &str = "drishti.toml";

#[derive(Debug, Parser)]
#[command(name = "drishti-bot", version, about = "Vision-guided robot control loop")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Camera device index, overriding the config file
    #[arg(long)]
    camera_id: Option<u32>,

    /// Capture width in pixels, overriding the config file
    #[arg(long)]
    width: Option<u32>,

    /// Capture height in pixels, overriding the config file
    #[arg(long)]
    height: Option<u32>,

    /// Mock rig random seed (0 picks one from entropy), overriding the
    /// config file
    #[arg(long)]
    seed: Option<u64>,
}

/// Resolve the configuration: explicit path, then `drishti.toml` in the
/// working directory, then built-in defaults. CLI flags win over all.
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Using config: {}", path.display());
            AppConfig::from_file(path)?
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            log::info!("Using config: {}", DEFAULT_CONFIG_PATH);
            AppConfig::from_file(DEFAULT_CONFIG_PATH)?
        }
        None => {
            log::info!("No config file found, using built-in defaults");
            AppConfig::default()
        }
    };

    if let Some(index) = args.camera_id {
        config.camera.index = index;
    }
    if let Some(width) = args.width {
        config.camera.width = width;
    }
    if let Some(height) = args.height {
        config.camera.height = height;
    }
    if let Some(seed) = args.seed {
        config.hardware.random_seed = seed;
    }

    Ok(config)
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    log::info!("DrishtiBot v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    log::info!(
        "Hardware backend: {} (camera {} @ {}x{})",
        config.hardware.device_type,
        config.camera.index,
        config.camera.width,
        config.camera.height
    );

    let (robot, perception) = create_robot(&config)?;
    let shared = Arc::new(SharedState::new());
    let mut supervisor = Supervisor::new(config, robot, perception, Arc::clone(&shared));

    // SIGINT takes the same path as a spoken/typed goodbye
    let ctrlc_shared = Arc::clone(&shared);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        ctrlc_shared.set_command(Command::Goodbye, None);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    // Left detached: a blocking stdin read cannot be interrupted, so the
    // listener thread is not joined on shutdown.
    let _listener = spawn_console_listener(Arc::clone(&shared))?;

    log::info!("DrishtiBot running. Press Ctrl-C to stop.");
    log::info!("Console commands: wait | pan | track | find | drive | goodbye, optionally followed by a target object");

    supervisor.run()?;

    log::info!("DrishtiBot stopped");
    Ok(())
}
