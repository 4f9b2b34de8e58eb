//! `.kbi` keyboard files
//!
//! A `.kbi` file is the JSON form of a [`KeyboardInfo`] snapshot. `rows` and
//! `cols` are required; everything else is optional. Keymap entries may be
//! numbers or keycode names (`"KC_A"`, `"MO(1)"`).

use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};
use vial_keyboard::KeyboardInfo;

use crate::keycodes;

/// Largest file accepted by the loader
pub const MAX_FILE_SIZE: u64 = 1_048_576;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("File too large")]
    FileTooLarge,

    #[error("Invalid JSON")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Invalid file")]
    InvalidFile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read and validate a `.kbi` file
pub fn load_file(path: &Path) -> Result<KeyboardInfo, FileError> {
    let size = std::fs::metadata(path)?.len();
    if size > MAX_FILE_SIZE {
        return Err(FileError::FileTooLarge);
    }
    let bytes = std::fs::read(path)?;
    let info = parse_bytes(&bytes)?;
    debug!("Loaded {}: {}x{}", path.display(), info.rows, info.cols);
    Ok(info)
}

/// Validate `.kbi` content
pub fn parse_bytes(bytes: &[u8]) -> Result<KeyboardInfo, FileError> {
    if bytes.len() as u64 > MAX_FILE_SIZE {
        return Err(FileError::FileTooLarge);
    }
    let mut value: Value = serde_json::from_slice(bytes).map_err(FileError::InvalidJson)?;

    let obj = value
        .as_object_mut()
        .ok_or_else(|| FileError::InvalidFile("not a JSON object".into()))?;
    for key in ["rows", "cols"] {
        if !obj.get(key).is_some_and(Value::is_u64) {
            return Err(FileError::InvalidFile(format!("missing or non-numeric {key}")));
        }
    }

    if let Some(Value::Array(layers)) = obj.get_mut("keymap") {
        for layer in layers.iter_mut().filter_map(Value::as_array_mut) {
            for cell in layer.iter_mut() {
                if let Value::String(name) = cell {
                    *cell = Value::from(resolve_keycode(name));
                }
            }
        }
    }

    serde_json::from_value(value).map_err(|e| FileError::InvalidFile(e.to_string()))
}

fn resolve_keycode(name: &str) -> u16 {
    keycodes::parse(name).unwrap_or_else(|| {
        warn!("Unknown keycode {:?}, using KC_NO", name);
        0
    })
}

/// Serialize a snapshot in `.kbi` form
pub fn to_json(info: &KeyboardInfo) -> Result<String, FileError> {
    serde_json::to_string_pretty(info).map_err(|e| FileError::InvalidFile(e.to_string()))
}

/// Write a snapshot to a `.kbi` file
pub fn save_file(path: &Path, info: &KeyboardInfo) -> Result<(), FileError> {
    std::fs::write(path, to_json(info)?)?;
    Ok(())
}
