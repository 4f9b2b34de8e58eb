//! Struct-style unpacking of response bytes
//!
//! Formats are a compact description of consecutive fields:
//!
//! | char | meaning |
//! |------|---------|
//! | `<`  | following fields are little-endian (default) |
//! | `>`  | following fields are big-endian |
//! | `B`  | u8 |
//! | `H`  | u16 |
//! | `I`  | u32 |
//! | `Q`  | u64 |
//! | `x`  | skip one byte |
//!
//! `"B>H"` is a byte followed by a big-endian u16; `"BBBB<I"` is four bytes
//! and a little-endian u32.

use thiserror::Error;

use crate::codec::Endian;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnpackError {
    #[error("unknown field '{0}' in unpack format")]
    UnknownField(char),

    #[error("response too short: format needs {needed} bytes, got {got}")]
    TooShort { needed: usize, got: usize },

    #[error("no field at index {index} (format has {len})")]
    NoSuchField { index: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Pad,
    Int { width: usize, endian: Endian },
}

fn parse_format(format: &str) -> Result<Vec<Field>, UnpackError> {
    let mut endian = Endian::Little;
    let mut fields = Vec::new();
    for c in format.chars() {
        let width = match c {
            '<' => {
                endian = Endian::Little;
                continue;
            }
            '>' => {
                endian = Endian::Big;
                continue;
            }
            ' ' => continue,
            'x' => {
                fields.push(Field::Pad);
                continue;
            }
            'B' => 1,
            'H' => 2,
            'I' => 4,
            'Q' => 8,
            other => return Err(UnpackError::UnknownField(other)),
        };
        fields.push(Field::Int { width, endian });
    }
    Ok(fields)
}

/// Number of bytes a format consumes
pub fn format_size(format: &str) -> Result<usize, UnpackError> {
    Ok(parse_format(format)?
        .iter()
        .map(|f| match f {
            Field::Pad => 1,
            Field::Int { width, .. } => *width,
        })
        .sum())
}

/// Decode `data` according to `format`, one value per non-pad field
pub fn unpack(format: &str, data: &[u8]) -> Result<Vec<u64>, UnpackError> {
    let fields = parse_format(format)?;
    let needed = format_size(format)?;
    if data.len() < needed {
        return Err(UnpackError::TooShort {
            needed,
            got: data.len(),
        });
    }

    let mut values = Vec::with_capacity(fields.len());
    let mut offset = 0;
    for field in fields {
        match field {
            Field::Pad => offset += 1,
            Field::Int { width, endian } => {
                let bytes = &data[offset..offset + width];
                let value = match endian {
                    Endian::Little => bytes
                        .iter()
                        .rev()
                        .fold(0u64, |acc, &b| (acc << 8) | b as u64),
                    Endian::Big => bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64),
                };
                values.push(value);
                offset += width;
            }
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_then_big_endian_word() {
        let data = [0x01, 0x00, 0x09, 0xFF];
        assert_eq!(unpack("B>H", &data).unwrap(), vec![0x01, 0x0009]);
    }

    #[test]
    fn vial_keyboard_id() {
        let mut data = vec![0x06, 0x00, 0x00, 0x00];
        data.extend_from_slice(&0x0123_4567_89AB_CDEFu64.to_le_bytes());
        assert_eq!(
            unpack("<IQ", &data).unwrap(),
            vec![6, 0x0123_4567_89AB_CDEF]
        );
    }

    #[test]
    fn tag_and_version() {
        let data = [b's', b'v', b'a', b'l', 0x02, 0x00, 0x00, 0x00];
        assert_eq!(
            unpack("BBBB<I", &data).unwrap(),
            vec![b's' as u64, b'v' as u64, b'a' as u64, b'l' as u64, 2]
        );
    }

    #[test]
    fn padding_is_skipped() {
        assert_eq!(unpack("xxB", &[9, 9, 7]).unwrap(), vec![7]);
        assert_eq!(format_size("xx>HI").unwrap(), 8);
    }

    #[test]
    fn short_data_is_an_error() {
        assert_eq!(
            unpack("BBBB<I", &[1, 2, 3]),
            Err(UnpackError::TooShort { needed: 8, got: 3 })
        );
    }

    #[test]
    fn unknown_field_is_an_error() {
        assert_eq!(unpack("Bz", &[0, 0]), Err(UnpackError::UnknownField('z')));
    }
}
