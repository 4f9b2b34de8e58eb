//! Keyboard definition and keymap retrieval

use serde_json::Value;
use tracing::{debug, warn};
use vial_transport::codec::{self, Endian};
use vial_transport::protocol::{cmd, vial, MSG_LEN};
use vial_transport::ViaSession;

use crate::error::KeyboardError;
use crate::info::CustomKeycode;

/// Bytes of the definition carried by each block
pub const BLOCK_SIZE: usize = MSG_LEN;

/// Bytes of diagnostic preview kept on decompression failure
const PREVIEW_LEN: usize = 32;

/// Largest compressed definition accepted from a device
pub const MAX_DEFINITION_SIZE: usize = 1_048_576;

/// Matrix rows/cols are addressed as single bytes on the wire
pub const MAX_MATRIX_DIM: usize = u8::MAX as usize;

/// Fields of the definition the snapshot needs
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub rows: usize,
    pub cols: usize,
    pub custom_keycodes: Vec<CustomKeycode>,
    pub payload: Value,
}

/// Number of blocks needed for `size` bytes
pub fn block_count(size: usize) -> usize {
    size.div_ceil(BLOCK_SIZE)
}

/// Fetch the compressed definition, block by block, without reading past its size
pub async fn fetch_definition(session: &ViaSession) -> Result<Vec<u8>, KeyboardError> {
    let size = session
        .send_vial(vial::GET_SIZE, &[])
        .await?
        .u32_at(0, Endian::Little)? as usize;
    if size > MAX_DEFINITION_SIZE {
        return Err(KeyboardError::MalformedResponse(format!(
            "definition size {size} exceeds {MAX_DEFINITION_SIZE} bytes"
        )));
    }
    debug!("Definition is {} bytes in {} blocks", size, block_count(size));

    let mut payload = Vec::with_capacity(size);
    let mut block = 0u32;
    while payload.len() < size {
        let resp = session
            .send_vial(vial::GET_DEFINITION, &codec::le32(i64::from(block)))
            .await?;
        let wanted = (size - payload.len()).min(BLOCK_SIZE);
        let data = resp.bytes();
        if data.len() < wanted {
            return Err(KeyboardError::MalformedResponse(format!(
                "definition block {block} has {} bytes, expected {wanted}",
                data.len()
            )));
        }
        payload.extend_from_slice(&data[..wanted]);
        block += 1;
    }

    Ok(payload)
}

/// Decompress an xz stream into UTF-8 text
pub fn decompress(data: &[u8]) -> Result<String, KeyboardError> {
    let mut input = data;
    let mut output = Vec::new();
    if let Err(e) = lzma_rs::xz_decompress(&mut input, &mut output) {
        warn!("Definition decompression failed on {} bytes", data.len());
        return Err(KeyboardError::Decompress {
            len: data.len(),
            preview: data[..data.len().min(PREVIEW_LEN)].to_vec(),
            reason: e.to_string(),
        });
    }
    String::from_utf8(output).map_err(|e| KeyboardError::InvalidDescriptor(e.to_string()))
}

fn matrix_dim(payload: &Value, key: &str) -> Result<usize, KeyboardError> {
    payload
        .get("matrix")
        .and_then(|m| m.get(key))
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .ok_or_else(|| KeyboardError::InvalidDescriptor(format!("missing matrix.{key}")))
        .and_then(|n| match usize::try_from(n) {
            Ok(n) if n <= MAX_MATRIX_DIM => Ok(n),
            _ => Err(KeyboardError::InvalidDescriptor(format!(
                "matrix.{key} = {n} exceeds {MAX_MATRIX_DIM}"
            ))),
        })
}

/// Parse the decompressed definition JSON
pub fn parse_definition(json: &str) -> Result<Definition, KeyboardError> {
    let payload: Value =
        serde_json::from_str(json).map_err(|e| KeyboardError::InvalidDescriptor(e.to_string()))?;

    let rows = matrix_dim(&payload, "rows")?;
    let cols = matrix_dim(&payload, "cols")?;

    let custom_keycodes = match payload.get("customKeycodes") {
        Some(v) if !v.is_null() => serde_json::from_value(v.clone())
            .map_err(|e| KeyboardError::InvalidDescriptor(format!("customKeycodes: {e}")))?,
        _ => Vec::new(),
    };

    Ok(Definition {
        rows,
        cols,
        custom_keycodes,
        payload,
    })
}

/// Fetch, decompress and parse the definition
pub async fn load_definition(session: &ViaSession) -> Result<Definition, KeyboardError> {
    let compressed = fetch_definition(session).await?;
    let json = decompress(&compressed)?;
    parse_definition(&json)
}

/// Layer count reported by the device; zero is an error
pub async fn layer_count(session: &ViaSession) -> Result<usize, KeyboardError> {
    let layers = session.send(cmd::GET_LAYER_COUNT, &[]).await?.u8_at(1)?;
    if layers == 0 {
        return Err(KeyboardError::LayerCount);
    }
    Ok(layers as usize)
}

/// Split a flat keycode buffer into `layers` layers of `rows * cols` cells
pub fn reshape_keymap(flat: &[u16], layers: usize, rows: usize, cols: usize) -> Vec<Vec<u16>> {
    let cells = rows.saturating_mul(cols);
    (0..layers)
        .map(|l| {
            let start = l.saturating_mul(cells).min(flat.len());
            let end = start.saturating_add(cells).min(flat.len());
            flat[start..end].to_vec()
        })
        .collect()
}

/// Read the whole keymap (big-endian keycodes) and reshape it
pub async fn fetch_keymap(
    session: &ViaSession,
    layers: usize,
    rows: usize,
    cols: usize,
) -> Result<Vec<Vec<u16>>, KeyboardError> {
    let size = layers
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(cols))
        .and_then(|n| n.checked_mul(2))
        .ok_or_else(|| {
            KeyboardError::InvalidDescriptor(format!(
                "keymap of {layers} layers x {rows}x{cols} is too large"
            ))
        })?;
    let flat = session
        .get_buffer_words(cmd::KEYMAP_GET_BUFFER, size, Endian::Big)
        .await?;
    Ok(reshape_keymap(&flat, layers, rows, cols))
}
