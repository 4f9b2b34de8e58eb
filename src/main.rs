//! keybard CLI
//!
//! A command-line interface for VIA/Vial keyboards.

use clap::Parser;
use keybard::Config;
use tracing_subscriber::EnvFilter;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;
use commands::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context::new(config, cli.device);

    match cli.command {
        // Default: show device info
        None | Some(Commands::Info) => commands::device::info(&ctx).await?,

        // === Device Commands ===
        Some(Commands::List) => commands::device::list(&ctx).await?,
        Some(Commands::Keymap { layer }) => commands::device::keymap(&ctx, layer).await?,
        Some(Commands::SetKey {
            layer,
            row,
            col,
            keycode,
        }) => commands::device::set_key(&ctx, layer, row, col, &keycode).await?,
        Some(Commands::Matrix { watch, interval }) => {
            commands::device::matrix(&ctx, watch, interval).await?
        }
        Some(Commands::LayerColor {
            layer,
            hue,
            sat,
            val,
        }) => commands::device::layer_color(&ctx, layer, hue, sat, val).await?,
        Some(Commands::Dump { output, settings }) => {
            commands::device::dump(&ctx, output, settings).await?
        }

        // === QMK Settings ===
        Some(Commands::Settings) => commands::settings::show(&ctx).await?,
        Some(Commands::SetSetting { qsid, value, bit }) => {
            commands::settings::set(&ctx, qsid, value, bit).await?
        }
        Some(Commands::ResetSettings) => commands::settings::reset(&ctx).await?,

        // === Files ===
        Some(Commands::Load { file }) => commands::file::load(file)?,
        Some(Commands::LastFile { clear }) => commands::file::last_file(clear)?,
    }

    Ok(())
}
