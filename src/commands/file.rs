//! .kbi file command handlers.

use std::path::PathBuf;

use anyhow::bail;
use keybard::{file, Storage};

use super::{print_layer, print_summary, CommandResult};

/// Load a .kbi file (or the last one loaded) and print it
pub fn load(path: Option<PathBuf>) -> CommandResult {
    let storage = Storage::default();
    let path = match path.or_else(|| storage.get_last_file_path().map(PathBuf::from)) {
        Some(path) => path,
        None => bail!("No file given and no previous file remembered"),
    };

    let info = file::load_file(&path)?;
    storage.set_last_file_path(&path.to_string_lossy());

    println!("File:           {}", path.display());
    print_summary(&info);
    for layer in 0..info.keymap.len() {
        println!();
        print_layer(&info, layer);
    }
    Ok(())
}

pub fn last_file(clear: bool) -> CommandResult {
    let storage = Storage::default();
    if clear {
        storage.clear_last_file_path();
        println!("Forgot last file.");
        return Ok(());
    }
    match storage.get_last_file_path() {
        Some(path) => println!("{path}"),
        None => println!("(none)"),
    }
    Ok(())
}
