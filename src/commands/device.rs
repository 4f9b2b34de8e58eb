//! Keyboard command handlers.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context as _};
use keybard::{file, keycodes, Storage};
use vial_keyboard::{sval, Hsv, KeyboardInfo, SettingsSchema};
use vial_transport::{DeviceDiscovery, HidDiscovery};

use super::{print_layer, print_summary, CommandResult, Context};

/// List keyboards matching the configured filters
pub async fn list(ctx: &Context) -> CommandResult {
    let devices = HidDiscovery::new()
        .list_devices(&ctx.config.device_filters())
        .await?;
    if devices.is_empty() {
        println!("No VIA keyboards found.");
        return Ok(());
    }
    for device in devices {
        let info = device.info;
        println!(
            "  {:<24} VID={:04x} PID={:04x} page={:04x} usage={:02x} path={}",
            info.display_name(),
            info.vid,
            info.pid,
            info.usage_page,
            info.usage,
            info.device_path,
        );
    }
    Ok(())
}

/// Load the keyboard and print its summary
pub async fn info(ctx: &Context) -> CommandResult {
    let (kb, info) = ctx.load_keyboard().await?;
    if let Some(device) = kb.session().device_info().await {
        println!("Device:         {}", device.display_name());
    }
    print_summary(&info);
    Ok(())
}

pub async fn keymap(ctx: &Context, layer: Option<u8>) -> CommandResult {
    let (_kb, info) = ctx.load_keyboard().await?;
    match layer {
        Some(layer) => {
            let layer = usize::from(layer);
            if layer >= info.layers {
                bail!("Layer {} out of range (keyboard has {})", layer, info.layers);
            }
            print_layer(&info, layer);
        }
        None => {
            for layer in 0..info.layers {
                print_layer(&info, layer);
                println!();
            }
        }
    }
    Ok(())
}

pub async fn set_key(ctx: &Context, layer: u8, row: u8, col: u8, keycode: &str) -> CommandResult {
    let code = keycodes::parse(keycode)
        .with_context(|| format!("Unknown keycode {keycode:?}"))?;
    let kb = ctx.open_keyboard().await?;
    kb.update_key(layer, row, col, code).await?;
    println!(
        "Layer {} ({},{}) = {} (0x{:04X})",
        layer,
        row,
        col,
        keycodes::stringify(code),
        code
    );
    Ok(())
}

/// Print pressed keys, once or until Ctrl-C
pub async fn matrix(ctx: &Context, watch: bool, interval_ms: u64) -> CommandResult {
    let (kb, info) = ctx.load_keyboard().await?;
    let interval = Duration::from_millis(interval_ms.max(10));
    let mut last: Option<Vec<(usize, usize)>> = None;

    loop {
        let state = kb.poll_matrix(&info).await?;
        let pressed: Vec<(usize, usize)> = state
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, down)| **down)
                    .map(move |(c, _)| (r, c))
            })
            .collect();

        if last.as_ref() != Some(&pressed) {
            if pressed.is_empty() {
                println!("(no keys pressed)");
            } else {
                let keys: Vec<String> = pressed
                    .iter()
                    .map(|(r, c)| {
                        let name = info
                            .keycode(0, *r, *c)
                            .map_or_else(|| "?".to_string(), keycodes::stringify);
                        format!("({r},{c}) {name}")
                    })
                    .collect();
                println!("{}", keys.join("  "));
            }
            last = Some(pressed);
        }

        if !watch {
            return Ok(());
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
        if !kb.session().is_connected().await {
            bail!("Keyboard disconnected");
        }
    }
}

pub async fn layer_color(ctx: &Context, layer: u8, hue: u8, sat: u8, val: u8) -> CommandResult {
    let kb = ctx.open_keyboard().await?;
    let Some(ext) = sval::probe(kb.session()).await else {
        bail!("This keyboard does not support layer colors");
    };
    let info = KeyboardInfo {
        sval_proto: Some(ext.proto),
        ..Default::default()
    };
    kb.set_layer_color(&info, layer, Hsv::new(hue, sat, val))
        .await?;
    println!("Layer {layer} color set to H={hue} S={sat} V={val}");
    Ok(())
}

/// Read the keyboard and write it as a .kbi file
pub async fn dump(ctx: &Context, output: Option<PathBuf>, with_settings: bool) -> CommandResult {
    let (kb, mut info) = ctx.load_keyboard().await?;
    if with_settings && info.capabilities().has_qmk_settings() {
        let schema = SettingsSchema::builtin()?;
        info.settings = Some(kb.load_settings(&info, &schema).await?);
    }

    match output {
        Some(path) => {
            file::save_file(&path, &info)?;
            Storage::default().set_last_file_path(&path.to_string_lossy());
            println!("Wrote {}", path.display());
        }
        None => println!("{}", file::to_json(&info)?),
    }
    Ok(())
}

