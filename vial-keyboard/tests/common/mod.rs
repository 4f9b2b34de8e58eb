//! Scripted keyboard used by the integration tests
//!
//! `FakeKeyboard` answers the VIA, Vial and sval requests the keyboard
//! layer issues, from in-memory state.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use vial_transport::mock::{report, MockTransport};
use vial_transport::protocol::MSG_LEN;
use vial_transport::TransportError;

pub const KBID: u64 = 0x5A1B_0A4D_0000_0042;

pub struct FakeKeyboard {
    pub rows: usize,
    pub cols: usize,
    pub layers: u8,
    pub vial_proto: u32,
    /// Flat keymap, `layers * rows * cols` codes
    pub keymap: Vec<u16>,
    /// xz-compressed definition
    pub definition: Vec<u8>,
    pub sval: bool,
    pub qsids: Vec<u16>,
    pub settings: BTreeMap<u16, u32>,
    pub pressed: Vec<(usize, usize)>,
    pub macro_count: u8,
    pub macro_buffer: Vec<u8>,
}

pub fn xz(text: &str) -> Vec<u8> {
    let mut input = text.as_bytes();
    let mut out = Vec::new();
    lzma_rs::xz_compress(&mut input, &mut out).unwrap();
    out
}

impl FakeKeyboard {
    pub fn new(rows: usize, cols: usize, layers: u8) -> Self {
        let definition = serde_json::json!({
            "name": "Fake Board",
            "matrix": { "rows": rows, "cols": cols },
            "customKeycodes": [
                { "name": "SV_LEFT_DPI_INC", "title": "Increase Left DPI", "shortName": "LDPI+" }
            ],
            "layouts": { "keymap": [] }
        });
        let cells = usize::from(layers) * rows * cols;
        Self {
            rows,
            cols,
            layers,
            vial_proto: 6,
            keymap: (0..cells).map(|i| 0x0004 + i as u16).collect(),
            definition: xz(&definition.to_string()),
            sval: false,
            qsids: Vec::new(),
            settings: BTreeMap::new(),
            pressed: Vec::new(),
            macro_count: 3,
            macro_buffer: (0..40u8).collect(),
        }
    }

    pub fn with_sval(mut self) -> Self {
        self.sval = true;
        self
    }

    fn buffer_window(data: &[u8], req: &[u8]) -> Vec<u8> {
        let offset = usize::from(u16::from_be_bytes([req[1], req[2]]));
        let size = usize::from(req[3]);
        let mut resp = report(&req[..4]);
        for i in 0..size {
            resp[4 + i] = data.get(offset + i).copied().unwrap_or(0);
        }
        resp
    }

    fn settings_page(&self, cur: usize) -> Vec<u8> {
        let mut words: Vec<u16> = self.qsids.iter().skip(cur).take(16).copied().collect();
        if words.len() < 16 {
            words.push(0xFFFF);
        }
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        report(&bytes)
    }

    fn matrix_state(&self) -> Vec<u8> {
        let row_bytes = self.cols.div_ceil(8);
        let mut resp = report(&[0x02, 0x03]);
        for &(row, col) in &self.pressed {
            resp[2 + row * row_bytes + col / 8] |= 1 << (col % 8);
        }
        resp
    }

    pub fn respond(&mut self, req: &[u8]) -> Result<Vec<u8>, TransportError> {
        Ok(match req[0] {
            0x01 => report(&[0x01, 0x00, 0x09]),
            0x02 if req[1] == 0x03 => self.matrix_state(),
            0x05 => {
                let (layer, row, col) = (req[1] as usize, req[2] as usize, req[3] as usize);
                let idx = layer * self.rows * self.cols + row * self.cols + col;
                self.keymap[idx] = u16::from_be_bytes([req[4], req[5]]);
                req.to_vec()
            }
            0x0C => report(&[0x0C, self.macro_count]),
            0x0D => {
                let [hi, lo] = (self.macro_buffer.len() as u16).to_be_bytes();
                report(&[0x0D, hi, lo])
            }
            0x0E => Self::buffer_window(&self.macro_buffer, req),
            0x11 => report(&[0x11, self.layers]),
            0x12 => {
                let bytes: Vec<u8> = self.keymap.iter().flat_map(|k| k.to_be_bytes()).collect();
                Self::buffer_window(&bytes, req)
            }
            0xFE => self.respond_vial(req),
            0xEE if self.sval => self.respond_sval(req)?,
            _ => req.to_vec(),
        })
    }

    fn respond_vial(&mut self, req: &[u8]) -> Vec<u8> {
        match req[1] {
            0x00 => {
                let mut resp = self.vial_proto.to_le_bytes().to_vec();
                resp.extend_from_slice(&KBID.to_le_bytes());
                report(&resp)
            }
            0x01 => report(&(self.definition.len() as u32).to_le_bytes()),
            0x02 => {
                let block = u32::from_le_bytes([req[2], req[3], req[4], req[5]]) as usize;
                let start = (block * MSG_LEN).min(self.definition.len());
                let end = (start + MSG_LEN).min(self.definition.len());
                report(&self.definition[start..end])
            }
            0x09 => {
                let cur = usize::from(u16::from_le_bytes([req[2], req[3]]));
                self.settings_page(cur)
            }
            0x0A => {
                let qsid = u16::from_le_bytes([req[2], req[3]]);
                match self.settings.get(&qsid) {
                    Some(value) => {
                        let mut resp = vec![0u8];
                        resp.extend_from_slice(&value.to_le_bytes());
                        report(&resp)
                    }
                    None => report(&[1]),
                }
            }
            0x0B => {
                let qsid = u16::from_le_bytes([req[2], req[3]]);
                let value = u32::from_le_bytes([req[4], req[5], req[6], req[7]]);
                self.settings.insert(qsid, value);
                report(&[0])
            }
            0x0D => report(&[4, 8, 2]),
            _ => req.to_vec(),
        }
    }

    fn respond_sval(&self, req: &[u8]) -> Result<Vec<u8>, TransportError> {
        match req[1] {
            0x01 => Ok(report(b"sval\x01\x00\x00\x00")),
            0x02 => Ok(report(b"sval-fw-2.1")),
            0x10 if req[2] < self.layers => {
                let layer = req[2];
                Ok(report(&[layer * 10, 200, 255]))
            }
            0x10 => Err(TransportError::Communication("layer out of range".into())),
            _ => Ok(req.to_vec()),
        }
    }

    pub fn into_transport(mut self) -> Arc<MockTransport> {
        Arc::new(MockTransport::new(move |req| self.respond(req)))
    }
}
