//! Typed access to a single response report

use crate::codec::{self, Endian};
use crate::unpack::{self, UnpackError};

/// One response report (report ID already stripped)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    data: Vec<u8>,
}

impl Response {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Raw response bytes
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn u8_at(&self, index: usize) -> Result<u8, UnpackError> {
        self.data.get(index).copied().ok_or(UnpackError::TooShort {
            needed: index + 1,
            got: self.data.len(),
        })
    }

    pub fn u16_at(&self, offset: usize, endian: Endian) -> Result<u16, UnpackError> {
        codec::read_u16(&self.data, offset, endian).ok_or(UnpackError::TooShort {
            needed: offset + 2,
            got: self.data.len(),
        })
    }

    pub fn u32_at(&self, offset: usize, endian: Endian) -> Result<u32, UnpackError> {
        codec::read_u32(&self.data, offset, endian).ok_or(UnpackError::TooShort {
            needed: offset + 4,
            got: self.data.len(),
        })
    }

    /// Whole report as consecutive u16 words
    pub fn u16_array(&self, endian: Endian) -> Vec<u16> {
        self.data
            .chunks_exact(2)
            .map(|w| match endian {
                Endian::Little => u16::from_le_bytes([w[0], w[1]]),
                Endian::Big => u16::from_be_bytes([w[0], w[1]]),
            })
            .collect()
    }

    /// Decode all fields described by `format`
    pub fn unpack(&self, format: &str) -> Result<Vec<u64>, UnpackError> {
        unpack::unpack(format, &self.data)
    }

    /// Decode `format` and return the field at `index`
    pub fn unpack_at(&self, format: &str, index: usize) -> Result<u64, UnpackError> {
        let values = self.unpack(format)?;
        values.get(index).copied().ok_or(UnpackError::NoSuchField {
            index,
            len: values.len(),
        })
    }
}

impl From<Vec<u8>> for Response {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl AsRef<[u8]> for Response {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors() {
        let resp = Response::new(vec![0x01, 0x00, 0x09, 0x78, 0x56, 0x34, 0x12]);
        assert_eq!(resp.u8_at(0).unwrap(), 0x01);
        assert_eq!(resp.u16_at(1, Endian::Big).unwrap(), 0x0009);
        assert_eq!(resp.u32_at(3, Endian::Little).unwrap(), 0x12345678);
        assert_eq!(resp.unpack_at("B>H", 1).unwrap(), 9);
        assert!(resp.u8_at(7).is_err());
        assert_eq!(
            resp.unpack_at("B", 1),
            Err(UnpackError::NoSuchField { index: 1, len: 1 })
        );
    }

    #[test]
    fn word_array_drops_odd_tail() {
        let resp = Response::new(vec![0x00, 0x01, 0xFF, 0xFF, 0x07]);
        assert_eq!(resp.u16_array(Endian::Little), vec![0x0100, 0xFFFF]);
        assert_eq!(resp.u16_array(Endian::Big), vec![0x0001, 0xFFFF]);
    }
}
