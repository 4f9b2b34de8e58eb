//! QMK settings over the Vial protocol
//!
//! Discovery is paged: each query returns up to 16 little-endian setting ids
//! (qsids), terminated by `0xFFFF`. Only qsids the schema knows are fetched;
//! each is read at the width the schema declares. Boolean fields address a
//! single bit of a packed setting value.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use tracing::{debug, warn};
use vial_transport::codec::{self, Endian};
use vial_transport::protocol::vial;
use vial_transport::ViaSession;

use crate::error::KeyboardError;

/// Built-in settings schema
pub const QMK_SETTINGS_JSON: &str = include_str!("qmk_settings.json");

/// qsids per discovery page
pub const PAGE_SIZE: u16 = 16;

/// Terminates the supported-id list
pub const SENTINEL: u16 = 0xFFFF;

/// Setting values as read from the device, keyed by qsid
pub type SettingsMap = BTreeMap<u16, u32>;

fn one() -> u8 {
    1
}

/// One editable field of the schema
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SettingField {
    Boolean {
        title: String,
        qsid: u16,
        #[serde(default)]
        bit: u8,
        /// Bytes of the packed value holding this bit
        #[serde(default = "one")]
        width: u8,
    },
    Integer {
        title: String,
        qsid: u16,
        min: u32,
        max: u32,
        width: u8,
    },
}

impl SettingField {
    pub fn title(&self) -> &str {
        match self {
            Self::Boolean { title, .. } | Self::Integer { title, .. } => title,
        }
    }

    pub fn qsid(&self) -> u16 {
        match self {
            Self::Boolean { qsid, .. } | Self::Integer { qsid, .. } => *qsid,
        }
    }

    /// Value width in bytes
    pub fn width(&self) -> u8 {
        match self {
            Self::Boolean { width, .. } | Self::Integer { width, .. } => *width,
        }
    }

    /// Current value of this field (a bit is 0 or 1); absent settings read as 0
    pub fn value(&self, settings: &SettingsMap) -> u32 {
        let raw = settings.get(&self.qsid()).copied().unwrap_or(0);
        match self {
            Self::Boolean { bit, .. } => raw.checked_shr(u32::from(*bit)).unwrap_or(0) & 1,
            Self::Integer { .. } => raw,
        }
    }

    /// Write `value` into the settings map. The qsid must already be present.
    pub fn apply(&self, settings: &mut SettingsMap, value: u32) -> Result<(), KeyboardError> {
        let qsid = self.qsid();
        let current = settings.get_mut(&qsid).ok_or_else(|| {
            KeyboardError::NotSupported(format!("setting {qsid} is not supported by this keyboard"))
        })?;

        match self {
            Self::Boolean { bit, .. } => {
                let mask = 1u32.checked_shl(u32::from(*bit)).unwrap_or(0);
                if value != 0 {
                    *current |= mask;
                } else {
                    *current &= !mask;
                }
            }
            Self::Integer { min, max, title, .. } => {
                if value < *min || value > *max {
                    return Err(KeyboardError::InvalidParameter(format!(
                        "{title} must be {min}-{max}"
                    )));
                }
                *current = value;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SettingsTab {
    pub name: String,
    pub fields: Vec<SettingField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SettingsSchema {
    pub tabs: Vec<SettingsTab>,
}

impl SettingsSchema {
    pub fn from_json(json: &str) -> Result<Self, KeyboardError> {
        serde_json::from_str(json)
            .map_err(|e| KeyboardError::InvalidParameter(format!("settings schema: {e}")))
    }

    pub fn builtin() -> Result<Self, KeyboardError> {
        Self::from_json(QMK_SETTINGS_JSON)
    }

    pub fn fields(&self) -> impl Iterator<Item = &SettingField> {
        self.tabs.iter().flat_map(|t| t.fields.iter())
    }

    /// Read width for a qsid: the widest field declared on it
    pub fn width_of(&self, qsid: u16) -> Option<u8> {
        self.fields()
            .filter(|f| f.qsid() == qsid)
            .map(SettingField::width)
            .max()
    }

    /// Field on `qsid`, selecting a bit for packed boolean settings
    pub fn field(&self, qsid: u16, bit: Option<u8>) -> Option<&SettingField> {
        self.fields().find(|f| match (f, bit) {
            (SettingField::Boolean { qsid: q, bit: b, .. }, Some(want)) => *q == qsid && *b == want,
            (SettingField::Integer { qsid: q, .. }, None) => *q == qsid,
            _ => false,
        })
    }
}

/// Collect every qsid the device reports, page by page
pub async fn query_supported(session: &ViaSession) -> Result<Vec<u16>, KeyboardError> {
    let mut seen = BTreeSet::new();
    let mut ids = Vec::new();
    let mut cur: u16 = 0;

    loop {
        let resp = session
            .send_vial(vial::QMK_SETTINGS_QUERY, &codec::le16(i64::from(cur)))
            .await?;

        let mut added = 0;
        let mut terminated = false;
        for qsid in resp.u16_array(Endian::Little) {
            if qsid == SENTINEL {
                terminated = true;
                break;
            }
            if seen.insert(qsid) {
                ids.push(qsid);
                added += 1;
            }
        }

        if terminated || added == 0 {
            break;
        }
        match cur.checked_add(PAGE_SIZE) {
            Some(next) => cur = next,
            None => break,
        }
    }

    debug!("Keyboard supports {} QMK settings", ids.len());
    Ok(ids)
}

/// Decode a GET response: `[status, value LE...]`; `None` when status is non-zero
pub fn decode_value(data: &[u8], width: u8) -> Result<Option<u32>, KeyboardError> {
    let width = usize::from(width.clamp(1, 4));
    let status = *data
        .first()
        .ok_or_else(|| KeyboardError::MalformedResponse("empty settings response".into()))?;
    if status != 0 {
        return Ok(None);
    }
    let bytes = data.get(1..1 + width).ok_or_else(|| {
        KeyboardError::MalformedResponse(format!("settings value needs {width} bytes"))
    })?;
    Ok(Some(codec::read_le_uint(bytes) as u32))
}

/// Fetch the values of `supported` qsids known to `schema`
pub async fn fetch(
    session: &ViaSession,
    schema: &SettingsSchema,
    supported: &[u16],
) -> Result<SettingsMap, KeyboardError> {
    let mut settings = SettingsMap::new();

    for &qsid in supported {
        let Some(width) = schema.width_of(qsid) else {
            debug!("Skipping unknown qsid {}", qsid);
            continue;
        };
        let resp = session
            .send_vial(vial::QMK_SETTINGS_GET, &codec::le16(i64::from(qsid)))
            .await?;
        match decode_value(resp.bytes(), width)? {
            Some(value) => {
                settings.insert(qsid, value);
            }
            None => warn!("Keyboard refused to read setting {}", qsid),
        }
    }

    Ok(settings)
}

/// SET arguments: qsid as LE16 followed by the value as LE32
pub fn encode_set(qsid: u16, value: u32) -> [u8; 6] {
    let mut args = [0u8; 6];
    args[..2].copy_from_slice(&codec::le16(i64::from(qsid)));
    args[2..].copy_from_slice(&codec::le32(i64::from(value)));
    args
}

/// Write the value held for `qsid` to the device
pub async fn push(
    session: &ViaSession,
    settings: Option<&SettingsMap>,
    qsid: u16,
) -> Result<(), KeyboardError> {
    let settings = settings.ok_or(KeyboardError::NoSettings)?;
    let value = *settings.get(&qsid).ok_or_else(|| {
        KeyboardError::InvalidParameter(format!("setting {qsid} has no loaded value"))
    })?;

    session
        .send_vial(vial::QMK_SETTINGS_SET, &encode_set(qsid, value))
        .await?;
    debug!("Pushed setting {} = {}", qsid, value);
    Ok(())
}

/// Restore firmware defaults for every setting
pub async fn reset(session: &ViaSession) -> Result<(), KeyboardError> {
    session.send_vial(vial::QMK_SETTINGS_RESET, &[]).await?;
    Ok(())
}
