// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "keybard")]
#[command(author, version, about = "VIA/Vial keyboard configurator")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Tracing filter used when RUST_LOG is unset (overrides the config file)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Config file (default: $XDG_CONFIG_HOME/keybard/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// HID device path to open when several keyboards are attached
    #[arg(long, global = true, value_name = "PATH")]
    pub device: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Device Commands ===
    /// List keyboards exposing a VIA raw-HID interface
    #[command(visible_aliases = ["ls", "devices"])]
    List,

    /// Load the keyboard and show protocol versions and features
    #[command(visible_aliases = ["version", "i"])]
    Info,

    /// Print the keymap
    #[command(visible_aliases = ["km", "k"])]
    Keymap {
        /// Only this layer
        #[arg(short, long)]
        layer: Option<u8>,
    },

    /// Assign a keycode to one key
    #[command(visible_aliases = ["remap", "sk"])]
    SetKey {
        /// Layer index
        layer: u8,
        /// Matrix row
        row: u8,
        /// Matrix column
        col: u8,
        /// Keycode name (KC_A, MO(1), M3) or hex value (0x0004)
        keycode: String,
    },

    /// Show which keys are currently pressed
    #[command(visible_aliases = ["m", "keytest"])]
    Matrix {
        /// Keep polling until interrupted
        #[arg(short, long)]
        watch: bool,
        /// Poll interval in milliseconds
        #[arg(long, default_value = "100")]
        interval: u64,
    },

    /// Set a layer color (Svalboard firmware only)
    #[command(visible_alias = "lc")]
    LayerColor {
        /// Layer index
        layer: u8,
        /// Hue (0-255)
        hue: u8,
        /// Saturation (0-255)
        #[arg(default_value = "255")]
        sat: u8,
        /// Value/brightness (0-255)
        #[arg(default_value = "255")]
        val: u8,
    },

    /// Read the keyboard and write it to a .kbi file
    #[command(visible_aliases = ["export", "save"])]
    Dump {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include QMK settings
        #[arg(long)]
        settings: bool,
    },

    // === QMK Settings ===
    /// Show QMK settings
    #[command(visible_aliases = ["qmk", "s"])]
    Settings,

    /// Change one QMK setting
    #[command(visible_alias = "ss")]
    SetSetting {
        /// Setting id (qsid)
        qsid: u16,
        /// New value (0/1 for boolean fields)
        value: u32,
        /// Bit index for boolean fields packed into one setting
        #[arg(short, long)]
        bit: Option<u8>,
    },

    /// Reset all QMK settings to firmware defaults
    ResetSettings,

    // === Files ===
    /// Load and summarize a .kbi file
    #[command(visible_alias = "open")]
    Load {
        /// Path to the .kbi file (default: the last file loaded)
        file: Option<PathBuf>,
    },

    /// Show or forget the last loaded file
    LastFile {
        /// Forget the stored path
        #[arg(long)]
        clear: bool,
    },
}
