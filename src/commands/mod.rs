//! Command handlers for the CLI application.
//!
//! This module organizes command handlers by category:
//! - `device`: Keyboard commands (list, info, keymap, set-key, matrix, layer-color, dump)
//! - `settings`: QMK settings commands (settings, set-setting, reset-settings)
//! - `file`: .kbi file commands (load, last-file)

pub mod device;
pub mod file;
pub mod settings;

use std::sync::Arc;

use keybard::{keycodes, Config};
use tracing::info;
use vial_keyboard::{capability, KeyboardInfo, KeyboardInterface};
use vial_transport::{HidDiscovery, ViaSession};

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Settings shared by every handler
pub struct Context {
    pub config: Config,
    /// `--device`, falling back to the config file
    pub device: Option<String>,
}

impl Context {
    pub fn new(config: Config, device: Option<String>) -> Self {
        let device = device.or_else(|| config.device.clone());
        Self { config, device }
    }

    /// Open the selected keyboard
    pub async fn open_keyboard(&self) -> anyhow::Result<KeyboardInterface> {
        let session = Arc::new(ViaSession::new());
        let device = session
            .open(
                &HidDiscovery::new(),
                &self.config.device_filters(),
                self.device.as_deref(),
            )
            .await?;
        info!("Using {} at {}", device.display_name(), device.device_path);
        Ok(KeyboardInterface::new(session))
    }

    /// Open the keyboard and read its full state
    pub async fn load_keyboard(&self) -> anyhow::Result<(KeyboardInterface, KeyboardInfo)> {
        let kb = self.open_keyboard().await?;
        let info = kb.load(KeyboardInfo::default()).await?;
        Ok((kb, info))
    }
}

/// Protocol versions only, without pulling the definition or keymap
pub async fn identify(kb: &KeyboardInterface) -> anyhow::Result<KeyboardInfo> {
    let via = capability::via_protocol_version(kb.session()).await?;
    let id = capability::vial_keyboard_id(kb.session()).await?;
    Ok(KeyboardInfo {
        via_proto: Some(via),
        vial_proto: Some(id.vial_proto),
        kbid: Some(id.kbid.to_string()),
        ..Default::default()
    })
}

fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Print the snapshot header shared by `info` and `load`
pub fn print_summary(info: &KeyboardInfo) {
    println!("Keyboard ID:    {}", opt(info.kbid.as_deref()));
    println!("VIA protocol:   {}", opt(info.via_proto));
    println!("Vial protocol:  {}", opt(info.vial_proto));
    println!("Matrix:         {} rows x {} cols", info.rows, info.cols);
    println!("Layers:         {}", info.layers);

    if info.macro_count.is_some() {
        println!(
            "Macros:         {} ({} bytes)",
            opt(info.macro_count),
            opt(info.macros_size)
        );
    }
    if info.tapdance_count.is_some() {
        println!(
            "Dynamic:        {} tap dance, {} combos, {} key overrides",
            opt(info.tapdance_count),
            opt(info.combo_count),
            opt(info.key_override_count)
        );
    }

    if info.capabilities().has_sval() {
        println!(
            "Svalboard:      proto {} firmware {}",
            opt(info.sval_proto),
            opt(info.sval_firmware.as_deref())
        );
        for (layer, color) in info.layer_colors.iter().enumerate().take(info.layers.max(1)) {
            println!(
                "  {:>2} {:<12} H={:3} S={:3} V={:3}",
                layer,
                info.layer_name(layer),
                color.hue,
                color.sat,
                color.val
            );
        }
    }

    if !info.custom_keycodes.is_empty() {
        println!("Custom keycodes:");
        for kc in &info.custom_keycodes {
            println!(
                "  {:<16} {}",
                kc.short_name.as_deref().unwrap_or(&kc.name),
                kc.title.as_deref().unwrap_or("")
            );
        }
    }
}

/// Print one layer as a rows x cols grid of keycode names
pub fn print_layer(info: &KeyboardInfo, layer: usize) {
    println!("Layer {} ({}):", layer, info.layer_name(layer));
    for row in 0..info.rows {
        let names: Vec<String> = (0..info.cols)
            .map(|col| {
                info.keycode(layer, row, col)
                    .map_or_else(|| "?".to_string(), keycodes::stringify)
            })
            .map(|name| format!("{name:<9}"))
            .collect();
        println!("  {}", names.join("").trim_end());
    }
}
