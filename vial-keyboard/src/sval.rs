//! Svalboard vendor extension
//!
//! Multiplexed under its own opcode. A device speaks it only if the version
//! query answers with the ASCII tag `sval`; anything else (including an I/O
//! error) marks the extension unsupported for the session.

use tracing::{debug, info, warn};
use vial_transport::{Response, ViaSession};

use crate::error::KeyboardError;
use crate::info::Hsv;

/// Vendor opcode
pub const SVAL_IDENTIFIER: u8 = 0xEE;

pub const GET_PROTO_VERSION: u8 = 0x01;
pub const GET_FIRMWARE_VERSION: u8 = 0x02;
pub const LAYER_COLOR_GET: u8 = 0x10;
pub const LAYER_COLOR_SET: u8 = 0x11;

/// Identifying tag in the first four response bytes
pub const TAG: &[u8; 4] = b"sval";

/// Layers probed for colors when the layer count is not known yet
pub const DEFAULT_COLOR_LAYERS: usize = 16;

/// Result of a successful probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvalInfo {
    pub proto: u32,
    pub firmware: String,
}

async fn send(session: &ViaSession, sub: u8, args: &[u8]) -> Result<Response, KeyboardError> {
    let mut full = Vec::with_capacity(args.len() + 1);
    full.push(sub);
    full.extend_from_slice(args);
    Ok(session.send(SVAL_IDENTIFIER, &full).await?)
}

async fn try_probe(session: &ViaSession) -> Result<Option<SvalInfo>, KeyboardError> {
    let resp = send(session, GET_PROTO_VERSION, &[]).await?;
    let fields = resp.unpack("BBBB<I")?;
    let tag_matches = fields[..4]
        .iter()
        .zip(TAG.iter())
        .all(|(got, want)| *got == u64::from(*want));
    if !tag_matches {
        debug!("No sval tag in {:02X?}", &resp.bytes()[..4]);
        return Ok(None);
    }
    let proto = fields[4] as u32;

    let version = send(session, GET_FIRMWARE_VERSION, &[]).await?;
    let firmware: String = String::from_utf8_lossy(version.bytes())
        .chars()
        .filter(|c| *c != '\0')
        .collect();

    Ok(Some(SvalInfo { proto, firmware }))
}

/// Probe for the extension. Never fails: errors degrade to `None`.
pub async fn probe(session: &ViaSession) -> Option<SvalInfo> {
    match try_probe(session).await {
        Ok(Some(sval)) => {
            info!("Svalboard detected, proto {} firmware {}", sval.proto, sval.firmware);
            Some(sval)
        }
        Ok(None) => None,
        Err(e) => {
            debug!("Sval protocol not supported: {}", e);
            None
        }
    }
}

/// Read per-layer colors; a layer that fails to read is recorded as black
pub async fn pull_layer_colors(session: &ViaSession, layers: usize) -> Vec<Hsv> {
    let count = if layers == 0 { DEFAULT_COLOR_LAYERS } else { layers };
    let mut colors = Vec::with_capacity(count);

    for layer in 0..count {
        let color = match send(session, LAYER_COLOR_GET, &[layer as u8]).await {
            Ok(resp) => match resp.unpack("BBB") {
                Ok(hsv) => Hsv::new(hsv[0] as u8, hsv[1] as u8, hsv[2] as u8),
                Err(e) => {
                    warn!("Layer {} color unreadable: {}", layer, e);
                    Hsv::default()
                }
            },
            Err(e) => {
                debug!("Layer {} color unavailable: {}", layer, e);
                Hsv::default()
            }
        };
        colors.push(color);
    }
    colors
}

pub async fn set_layer_color(
    session: &ViaSession,
    layer: u8,
    color: Hsv,
) -> Result<(), KeyboardError> {
    send(
        session,
        LAYER_COLOR_SET,
        &[layer, color.hue, color.sat, color.val],
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vial_transport::mock::{report, MockTransport};
    use vial_transport::TransportError;

    #[tokio::test]
    async fn wrong_tag_stops_after_one_request() {
        let mock = Arc::new(MockTransport::new(|req| Ok(req.to_vec())));
        let session = ViaSession::with_transport(mock.clone());

        assert_eq!(probe(&session).await, None);
        assert_eq!(mock.sent_count(), 1);
    }

    #[tokio::test]
    async fn io_error_is_unsupported() {
        let mock = Arc::new(MockTransport::new(|_| {
            Err(TransportError::Communication("stall".into()))
        }));
        let session = ViaSession::with_transport(mock);
        assert_eq!(probe(&session).await, None);
    }

    #[tokio::test]
    async fn tag_match_reads_firmware() {
        let mock = Arc::new(MockTransport::new(|req| {
            Ok(match req[1] {
                GET_PROTO_VERSION => report(b"sval\x02\x00\x00\x00"),
                GET_FIRMWARE_VERSION => report(b"v1.4.0"),
                _ => req.to_vec(),
            })
        }));
        let session = ViaSession::with_transport(mock);

        let sval = probe(&session).await.unwrap();
        assert_eq!(sval.proto, 2);
        assert_eq!(sval.firmware, "v1.4.0");
    }

    #[tokio::test]
    async fn failed_layers_read_as_black() {
        let mock = Arc::new(MockTransport::new(|req| match req[2] {
            0 => Ok(report(&[10, 20, 30])),
            _ => Err(TransportError::Communication("no layer".into())),
        }));
        let session = ViaSession::with_transport(mock.clone());

        let colors = pull_layer_colors(&session, 0).await;
        assert_eq!(colors.len(), DEFAULT_COLOR_LAYERS);
        assert_eq!(colors[0], Hsv::new(10, 20, 30));
        assert_eq!(colors[1], Hsv::default());
        assert_eq!(mock.sent_count(), DEFAULT_COLOR_LAYERS);
    }

    #[tokio::test]
    async fn set_color_frames_hsv() {
        let mock = Arc::new(MockTransport::echo());
        let session = ViaSession::with_transport(mock.clone());
        set_layer_color(&session, 3, Hsv::new(1, 2, 3)).await.unwrap();
        assert_eq!(mock.sent()[0][..6], [0xEE, 0x11, 3, 1, 2, 3]);
    }
}
