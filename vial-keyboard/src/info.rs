//! Keyboard snapshot
//!
//! `KeyboardInfo` is the assembled state of one keyboard, whether read from a
//! device or loaded from a `.kbi` file. It serializes to the same JSON shape
//! the file loader accepts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Layer names used when a snapshot carries none
pub const DEFAULT_LAYER_NAMES: [(usize, &str); 4] =
    [(0, "default"), (4, "NAS"), (5, "Fn Keys"), (15, "Mouse")];

/// Hue/saturation/value triple, each 0-255
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hsv {
    pub hue: u8,
    pub sat: u8,
    pub val: u8,
}

impl Hsv {
    pub const fn new(hue: u8, sat: u8, val: u8) -> Self {
        Self { hue, sat, val }
    }
}

/// Firmware-defined keycode (`customKeycodes` in the definition)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomKeycode {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "shortName", default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
}

/// Cosmetic overrides; only layer names for now
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cosmetic {
    #[serde(default)]
    pub layer: BTreeMap<usize, String>,
}

/// Protocol layers a device speaks, derived from a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub via_proto: u16,
    pub vial_proto: u32,
    pub sval_proto: u32,
}

impl Capabilities {
    /// Vial protocol version that introduced QMK settings and dynamic entries
    pub const VIAL_QMK_SETTINGS: u32 = 4;

    pub fn has_vial(&self) -> bool {
        self.vial_proto > 0
    }

    pub fn has_sval(&self) -> bool {
        self.sval_proto > 0
    }

    pub fn has_qmk_settings(&self) -> bool {
        self.vial_proto >= Self::VIAL_QMK_SETTINGS
    }

    pub fn has_dynamic_entries(&self) -> bool {
        self.vial_proto >= Self::VIAL_QMK_SETTINGS
    }
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Assembled keyboard state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyboardInfo {
    pub rows: usize,
    pub cols: usize,
    /// 0 until the layer count has been read
    #[serde(default, skip_serializing_if = "is_zero")]
    pub layers: usize,
    /// `keymap[layer][row * cols + col]`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keymap: Vec<Vec<u16>>,
    /// Sparse: only settings the device reported as supported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<BTreeMap<u16, u32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_proto: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vial_proto: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kbid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sval_proto: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sval_firmware: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layer_colors: Vec<Hsv>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cosmetic: Option<Cosmetic>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_keycodes: Vec<CustomKeycode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macro_count: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macros_size: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tapdance_count: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combo_count: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_override_count: Option<u8>,

    /// Parsed keyboard definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl KeyboardInfo {
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            via_proto: self.via_proto.unwrap_or(0),
            vial_proto: self.vial_proto.unwrap_or(0),
            sval_proto: self.sval_proto.unwrap_or(0),
        }
    }

    /// Matrix known and keymap complete for every layer
    pub fn is_loaded(&self) -> bool {
        self.rows > 0
            && self.cols > 0
            && self.layers > 0
            && self.keymap.len() == self.layers
            && self.keymap.iter().all(|l| l.len() == self.rows * self.cols)
    }

    pub fn keycode(&self, layer: usize, row: usize, col: usize) -> Option<u16> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.keymap.get(layer)?.get(row * self.cols + col).copied()
    }

    /// Replace one keymap cell; returns false if the position is outside the map
    pub fn set_keycode(&mut self, layer: usize, row: usize, col: usize, keycode: u16) -> bool {
        if row >= self.rows || col >= self.cols {
            return false;
        }
        let cols = self.cols;
        match self
            .keymap
            .get_mut(layer)
            .and_then(|l| l.get_mut(row * cols + col))
        {
            Some(cell) => {
                *cell = keycode;
                true
            }
            None => false,
        }
    }

    /// Install the default layer names unless some are already present
    pub fn setup_cosmetic_layer_names(&mut self) {
        let cosmetic = self.cosmetic.get_or_insert_with(Cosmetic::default);
        if cosmetic.layer.is_empty() {
            cosmetic.layer = DEFAULT_LAYER_NAMES
                .iter()
                .map(|(i, name)| (*i, name.to_string()))
                .collect();
        }
    }

    pub fn layer_cosmetic(&self, layer: usize) -> Option<&str> {
        self.cosmetic
            .as_ref()?
            .layer
            .get(&layer)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// "Layer N" unless a cosmetic name is set
    pub fn layer_name(&self, layer: usize) -> String {
        self.layer_cosmetic(layer)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Layer {layer}"))
    }

    /// Cosmetic name or the bare layer number
    pub fn layer_name_short(&self, layer: usize) -> String {
        self.layer_cosmetic(layer)
            .map(str::to_string)
            .unwrap_or_else(|| layer.to_string())
    }
}
