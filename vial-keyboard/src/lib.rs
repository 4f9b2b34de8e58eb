//! High-level keyboard interface for VIA/Vial keyboards
//!
//! This crate assembles a [`KeyboardInfo`] snapshot from a connected device
//! on top of a [`ViaSession`]: protocol negotiation, definition and keymap
//! retrieval, the Svalboard vendor extension and QMK settings.

pub mod capability;
pub mod error;
pub mod info;
pub mod payload;
pub mod settings;
pub mod sval;

pub use error::KeyboardError;
pub use info::{Capabilities, Cosmetic, CustomKeycode, Hsv, KeyboardInfo};
pub use settings::{SettingField, SettingsMap, SettingsSchema};

use std::sync::Arc;

use tracing::{debug, info, warn};
use vial_transport::codec;
use vial_transport::protocol::{cmd, keyboard_value, vial};
use vial_transport::ViaSession;

/// High-level keyboard interface over one device session
///
/// The interface never mutates a snapshot behind the caller's back: device
/// writes (`update_key`, `push_setting`) leave updating the in-memory copy
/// to the caller.
pub struct KeyboardInterface {
    session: Arc<ViaSession>,
}

impl KeyboardInterface {
    pub fn new(session: Arc<ViaSession>) -> Self {
        Self { session }
    }

    /// Get the underlying session
    pub fn session(&self) -> &Arc<ViaSession> {
        &self.session
    }

    // === Snapshot assembly ===

    /// Read the full keyboard state.
    ///
    /// `seed` carries anything the caller already knows (cosmetic layer
    /// names are kept). The vendor probe is optional; every other step
    /// aborts the load on failure.
    pub async fn load(&self, seed: KeyboardInfo) -> Result<KeyboardInfo, KeyboardError> {
        let mut kb = seed;

        self.read_identity(&mut kb).await?;

        if let Some(sval) = sval::probe(&self.session).await {
            kb.sval_proto = Some(sval.proto);
            kb.sval_firmware = Some(sval.firmware);
            if sval.proto >= 1 {
                kb.layer_colors = sval::pull_layer_colors(&self.session, kb.layers).await;
            }
        } else {
            kb.sval_proto = Some(0);
        }

        kb.setup_cosmetic_layer_names();

        self.read_features(&mut kb).await?;
        self.read_keymap(&mut kb).await?;

        info!(
            "Loaded keyboard {}: {}x{} matrix, {} layers",
            kb.kbid.as_deref().unwrap_or("?"),
            kb.rows,
            kb.cols,
            kb.layers
        );
        Ok(kb)
    }

    /// Protocol versions, keyboard id and the definition
    async fn read_identity(&self, kb: &mut KeyboardInfo) -> Result<(), KeyboardError> {
        kb.via_proto = Some(capability::via_protocol_version(&self.session).await?);

        let id = capability::vial_keyboard_id(&self.session).await?;
        kb.vial_proto = Some(id.vial_proto);
        kb.kbid = Some(id.kbid.to_string());

        let definition = payload::load_definition(&self.session).await?;
        kb.rows = definition.rows;
        kb.cols = definition.cols;
        kb.custom_keycodes = definition.custom_keycodes;
        kb.payload = Some(definition.payload);
        Ok(())
    }

    /// Macro metadata and dynamic entry counts
    async fn read_features(&self, kb: &mut KeyboardInfo) -> Result<(), KeyboardError> {
        if kb.capabilities().has_dynamic_entries() {
            let counts = self
                .session
                .send_vial(vial::DYNAMIC_ENTRY_OP, &[vial::DYNAMIC_GET_NUMBER_OF_ENTRIES])
                .await?;
            kb.tapdance_count = Some(counts.u8_at(0)?);
            kb.combo_count = Some(counts.u8_at(1)?);
            kb.key_override_count = Some(counts.u8_at(2)?);
        }

        let count = self.session.send(cmd::MACRO_GET_COUNT, &[]).await?;
        kb.macro_count = Some(count.u8_at(1)?);

        let size = self.session.send(cmd::MACRO_GET_BUFFER_SIZE, &[]).await?;
        kb.macros_size = Some(size.unpack_at("B>H", 1)? as u16);

        debug!(
            "Macros: {} in {} bytes",
            kb.macro_count.unwrap_or(0),
            kb.macros_size.unwrap_or(0)
        );
        Ok(())
    }

    async fn read_keymap(&self, kb: &mut KeyboardInfo) -> Result<(), KeyboardError> {
        kb.layers = payload::layer_count(&self.session).await?;
        kb.keymap = payload::fetch_keymap(&self.session, kb.layers, kb.rows, kb.cols).await?;
        Ok(())
    }

    // === Editing ===

    /// Write one keycode to the device
    pub async fn update_key(
        &self,
        layer: u8,
        row: u8,
        col: u8,
        keycode: u16,
    ) -> Result<(), KeyboardError> {
        let [hi, lo] = codec::be16(i64::from(keycode));
        self.session
            .send(cmd::SET_KEYCODE, &[layer, row, col, hi, lo])
            .await?;
        debug!("Set L{} ({},{}) = 0x{:04X}", layer, row, col, keycode);
        Ok(())
    }

    /// Pressed state of every matrix position, `[row][col]`
    pub async fn poll_matrix(&self, kb: &KeyboardInfo) -> Result<Vec<Vec<bool>>, KeyboardError> {
        if kb.rows == 0 || kb.cols == 0 {
            return Err(KeyboardError::InvalidParameter(
                "matrix size is not known".into(),
            ));
        }
        if kb.rows > payload::MAX_MATRIX_DIM || kb.cols > payload::MAX_MATRIX_DIM {
            return Err(KeyboardError::InvalidParameter(format!(
                "matrix {}x{} exceeds {}",
                kb.rows,
                kb.cols,
                payload::MAX_MATRIX_DIM
            )));
        }

        let resp = self
            .session
            .send(
                cmd::GET_KEYBOARD_VALUE,
                &[keyboard_value::SWITCH_MATRIX_STATE],
            )
            .await?;
        let data = resp.bytes();
        let row_bytes = kb.cols.div_ceil(8);

        Ok((0..kb.rows)
            .map(|row| {
                let offset = 2 + row * row_bytes;
                (0..kb.cols)
                    .map(|col| {
                        let byte = data.get(offset + col / 8).copied().unwrap_or(0);
                        byte & (1 << (col % 8)) != 0
                    })
                    .collect()
            })
            .collect())
    }

    /// Raw macro buffer (`macros_size` bytes)
    pub async fn get_macro_buffer(&self, kb: &KeyboardInfo) -> Result<Vec<u8>, KeyboardError> {
        let size = kb.macros_size.unwrap_or(0) as usize;
        Ok(self.session.get_buffer(cmd::MACRO_GET_BUFFER, size).await?)
    }

    // === Vendor extension ===

    pub async fn set_layer_color(
        &self,
        kb: &KeyboardInfo,
        layer: u8,
        color: Hsv,
    ) -> Result<(), KeyboardError> {
        if !kb.capabilities().has_sval() {
            return Err(KeyboardError::NotSupported("layer colors".into()));
        }
        sval::set_layer_color(&self.session, layer, color).await
    }

    // === QMK settings ===

    /// Discover and read every supported setting the schema knows
    pub async fn load_settings(
        &self,
        kb: &KeyboardInfo,
        schema: &SettingsSchema,
    ) -> Result<SettingsMap, KeyboardError> {
        if !kb.capabilities().has_qmk_settings() {
            return Err(KeyboardError::NotSupported(format!(
                "QMK settings need Vial protocol {}+",
                Capabilities::VIAL_QMK_SETTINGS
            )));
        }
        let supported = settings::query_supported(&self.session).await?;
        let values = settings::fetch(&self.session, schema, &supported).await?;
        if values.is_empty() {
            warn!("Keyboard reported no known QMK settings");
        }
        Ok(values)
    }

    /// Write the snapshot's value for `qsid` to the device
    pub async fn push_setting(&self, kb: &KeyboardInfo, qsid: u16) -> Result<(), KeyboardError> {
        settings::push(&self.session, kb.settings.as_ref(), qsid).await
    }

    pub async fn reset_settings(&self) -> Result<(), KeyboardError> {
        settings::reset(&self.session).await
    }
}
