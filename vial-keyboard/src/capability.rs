//! Base protocol and Vial identification queries

use tracing::debug;
use vial_transport::protocol::{cmd, vial};
use vial_transport::ViaSession;

use crate::error::KeyboardError;

/// Vial protocol version and 64-bit keyboard id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VialId {
    pub vial_proto: u32,
    pub kbid: u64,
}

/// VIA protocol version (big-endian u16 after the echoed opcode)
pub async fn via_protocol_version(session: &ViaSession) -> Result<u16, KeyboardError> {
    let resp = session.send(cmd::GET_PROTOCOL_VERSION, &[]).await?;
    let version = resp.unpack_at("B>H", 1)? as u16;
    debug!("VIA protocol {}", version);
    Ok(version)
}

/// Vial protocol version and keyboard id
pub async fn vial_keyboard_id(session: &ViaSession) -> Result<VialId, KeyboardError> {
    let resp = session.send_vial(vial::GET_KEYBOARD_ID, &[]).await?;
    let fields = resp.unpack("<IQ")?;
    let id = VialId {
        vial_proto: fields[0] as u32,
        kbid: fields[1],
    };
    debug!("Vial protocol {} kbid {:016X}", id.vial_proto, id.kbid);
    Ok(id)
}
