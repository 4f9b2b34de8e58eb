//! QMK settings command handlers.

use anyhow::{bail, Context as _};
use vial_keyboard::{KeyboardInfo, KeyboardInterface, SettingField, SettingsSchema};

use super::{identify, CommandResult, Context};

async fn open_with_settings(
    ctx: &Context,
    schema: &SettingsSchema,
) -> anyhow::Result<(KeyboardInterface, KeyboardInfo)> {
    let kb = ctx.open_keyboard().await?;
    let mut info = identify(&kb).await?;
    if !info.capabilities().has_qmk_settings() {
        bail!(
            "Vial protocol {} has no QMK settings",
            info.vial_proto.unwrap_or(0)
        );
    }
    info.settings = Some(kb.load_settings(&info, schema).await?);
    Ok((kb, info))
}

fn describe(field: &SettingField, info: &KeyboardInfo) -> String {
    let settings = info.settings.clone().unwrap_or_default();
    match field {
        SettingField::Boolean { bit, .. } => {
            let state = if field.value(&settings) != 0 { "on" } else { "off" };
            format!("{:<4} (qsid {} bit {})", state, field.qsid(), bit)
        }
        SettingField::Integer { min, max, .. } => format!(
            "{:<6} (qsid {}, {}-{})",
            field.value(&settings),
            field.qsid(),
            min,
            max
        ),
    }
}

/// Print every supported setting grouped by tab
pub async fn show(ctx: &Context) -> CommandResult {
    let schema = SettingsSchema::builtin()?;
    let (_kb, info) = open_with_settings(ctx, &schema).await?;
    let supported = info.settings.as_ref().map(|s| s.len()).unwrap_or(0);
    if supported == 0 {
        println!("Keyboard reports no known QMK settings.");
        return Ok(());
    }

    for tab in &schema.tabs {
        let fields: Vec<&SettingField> = tab
            .fields
            .iter()
            .filter(|f| {
                info.settings
                    .as_ref()
                    .is_some_and(|s| s.contains_key(&f.qsid()))
            })
            .collect();
        if fields.is_empty() {
            continue;
        }
        println!("{}:", tab.name);
        for field in fields {
            println!("  {:<40} {}", field.title(), describe(field, &info));
        }
    }
    Ok(())
}

/// Change one field and write its setting back
pub async fn set(ctx: &Context, qsid: u16, value: u32, bit: Option<u8>) -> CommandResult {
    let schema = SettingsSchema::builtin()?;
    let field = schema
        .field(qsid, bit)
        .with_context(|| match bit {
            Some(bit) => format!("No boolean setting at qsid {qsid} bit {bit}"),
            None => format!("No integer setting at qsid {qsid} (use --bit for flags)"),
        })?
        .clone();

    let (kb, mut info) = open_with_settings(ctx, &schema).await?;
    let mut settings = info.settings.take().unwrap_or_default();
    field.apply(&mut settings, value)?;
    info.settings = Some(settings);

    kb.push_setting(&info, qsid).await?;
    println!("{} = {}", field.title(), describe(&field, &info));
    Ok(())
}

pub async fn reset(ctx: &Context) -> CommandResult {
    let kb = ctx.open_keyboard().await?;
    let info = identify(&kb).await?;
    if !info.capabilities().has_qmk_settings() {
        bail!("This keyboard has no QMK settings");
    }
    kb.reset_settings().await?;
    println!("QMK settings reset to defaults.");
    Ok(())
}
