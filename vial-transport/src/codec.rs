//! Byte-order helpers shared by the protocol layers
//!
//! Everything here is pure: integers in, byte arrays (or integers) out.

/// Byte order of a multi-byte field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// Width of the elements handled by [`reverse_array_element_endianness`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordSize {
    Two,
    Four,
}

impl WordSize {
    pub fn bytes(self) -> usize {
        match self {
            WordSize::Two => 2,
            WordSize::Four => 4,
        }
    }
}

/// Split `value` into `byte_count` bytes in the requested order.
///
/// Negative values are truncated two's-complement style, so `-1` over two
/// bytes is `[0xFF, 0xFF]`.
pub fn to_endian_bytes(value: i64, byte_count: usize, endian: Endian) -> Vec<u8> {
    let mut out: Vec<u8> = (0..byte_count)
        .map(|i| {
            let shift = (8 * i).min(63);
            ((value >> shift) & 0xFF) as u8
        })
        .collect();
    if endian == Endian::Big {
        out.reverse();
    }
    out
}

pub fn le16(value: i64) -> [u8; 2] {
    (value as u16).to_le_bytes()
}

pub fn be16(value: i64) -> [u8; 2] {
    (value as u16).to_be_bytes()
}

pub fn le32(value: i64) -> [u8; 4] {
    (value as u32).to_le_bytes()
}

pub fn be32(value: i64) -> [u8; 4] {
    (value as u32).to_be_bytes()
}

/// Swap the byte order of every element.
///
/// Values wider than the element size are masked first. Applying this twice
/// returns the original sequence.
pub fn reverse_array_element_endianness(values: &[u32], size: WordSize) -> Vec<u32> {
    values
        .iter()
        .map(|&v| match size {
            WordSize::Two => (v as u16).swap_bytes() as u32,
            WordSize::Four => v.swap_bytes(),
        })
        .collect()
}

/// Read a `u16` at `offset`, `None` if out of bounds
pub fn read_u16(data: &[u8], offset: usize, endian: Endian) -> Option<u16> {
    let bytes: [u8; 2] = data.get(offset..offset + 2)?.try_into().ok()?;
    Some(match endian {
        Endian::Little => u16::from_le_bytes(bytes),
        Endian::Big => u16::from_be_bytes(bytes),
    })
}

/// Read a `u32` at `offset`, `None` if out of bounds
pub fn read_u32(data: &[u8], offset: usize, endian: Endian) -> Option<u32> {
    let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
    Some(match endian {
        Endian::Little => u32::from_le_bytes(bytes),
        Endian::Big => u32::from_be_bytes(bytes),
    })
}

/// Interpret a little-endian integer of arbitrary width (up to 8 bytes)
pub fn read_le_uint(data: &[u8]) -> u64 {
    data.iter()
        .take(8)
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | ((b as u64) << (8 * i)))
}

/// `[0, 1, .., n-1]`; empty for `n <= 0`
pub fn range(n: i64) -> Vec<usize> {
    if n <= 0 {
        return Vec::new();
    }
    (0..n as usize).collect()
}

/// `n` clones of `value`; empty for `n <= 0`.
///
/// Cloning an `Rc`/`Arc` shares the allocation, so every slot points at the
/// same value.
pub fn repeat<T: Clone>(value: T, n: i64) -> Vec<T> {
    if n <= 0 {
        return Vec::new();
    }
    vec![value; n as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn endian_bytes_16_and_32() {
        assert_eq!(to_endian_bytes(0x1234, 2, Endian::Little), vec![0x34, 0x12]);
        assert_eq!(to_endian_bytes(0x1234, 2, Endian::Big), vec![0x12, 0x34]);
        assert_eq!(
            to_endian_bytes(0x12345678, 4, Endian::Little),
            vec![0x78, 0x56, 0x34, 0x12]
        );
        assert_eq!(
            to_endian_bytes(0x12345678, 4, Endian::Big),
            vec![0x12, 0x34, 0x56, 0x78]
        );
    }

    #[test]
    fn little_reversed_is_big() {
        for n in [0i64, 1, -1, 0x1234, -0x1234, 0x7FFF, -32768, 0x12345678, -0x7FFF_FFFF] {
            for width in [2usize, 4] {
                let mut le = to_endian_bytes(n, width, Endian::Little);
                le.reverse();
                assert_eq!(le, to_endian_bytes(n, width, Endian::Big), "n={n} w={width}");
            }
        }
    }

    #[test]
    fn fixed_width_wrappers() {
        assert_eq!(le16(0), [0x00, 0x00]);
        assert_eq!(le16(0xFFFF), [0xFF, 0xFF]);
        assert_eq!(le16(0x1234), [0x34, 0x12]);
        assert_eq!(le16(-1), [0xFF, 0xFF]);
        assert_eq!(be16(0x1234), [0x12, 0x34]);
        assert_ne!(le16(0x1234), be16(0x1234));
        assert_eq!(le32(0xFFFF_FFFF), [0xFF; 4]);
        assert_eq!(le32(0x12345678), [0x78, 0x56, 0x34, 0x12]);
        assert_eq!(be32(0x12345678), [0x12, 0x34, 0x56, 0x78]);
        assert_eq!(le32(-1), [0xFF; 4]);
    }

    #[test]
    fn reverse_elements() {
        assert_eq!(
            reverse_array_element_endianness(&[0x1234, 0x5678, 0xABCD], WordSize::Two),
            vec![0x3412, 0x7856, 0xCDAB]
        );
        assert_eq!(
            reverse_array_element_endianness(&[0x12345678, 0xABCDEF00], WordSize::Four),
            vec![0x78563412, 0x00EFCDAB]
        );
        assert!(reverse_array_element_endianness(&[], WordSize::Two).is_empty());
        assert_eq!(
            reverse_array_element_endianness(&[0x1234], WordSize::Two),
            vec![0x3412]
        );
    }

    #[test]
    fn reverse_elements_is_self_inverse() {
        let words = [0x0000, 0x0001, 0x1234, 0xFF00, 0xFFFF];
        let once = reverse_array_element_endianness(&words, WordSize::Two);
        assert_eq!(reverse_array_element_endianness(&once, WordSize::Two), words);

        let dwords = [0, 1, 0x12345678, 0xDEADBEEF, u32::MAX];
        let once = reverse_array_element_endianness(&dwords, WordSize::Four);
        assert_eq!(reverse_array_element_endianness(&once, WordSize::Four), dwords);
    }

    #[test]
    fn read_helpers_bounds_check() {
        let data = [0x12, 0x34, 0x56, 0x78];
        assert_eq!(read_u16(&data, 0, Endian::Big), Some(0x1234));
        assert_eq!(read_u16(&data, 2, Endian::Little), Some(0x7856));
        assert_eq!(read_u16(&data, 3, Endian::Little), None);
        assert_eq!(read_u32(&data, 0, Endian::Little), Some(0x78563412));
        assert_eq!(read_u32(&data, 1, Endian::Little), None);
        assert_eq!(read_le_uint(&[0x78, 0x56, 0x34, 0x12]), 0x12345678);
        assert_eq!(read_le_uint(&[]), 0);
    }

    #[test]
    fn range_handles_non_positive() {
        assert_eq!(range(5), vec![0, 1, 2, 3, 4]);
        assert!(range(0).is_empty());
        assert!(range(-5).is_empty());
    }

    #[test]
    fn repeat_shares_identity() {
        let shared = Rc::new(vec![1, 2, 3]);
        let slots = repeat(Rc::clone(&shared), 3);
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(|s| Rc::ptr_eq(s, &shared)));
        assert!(repeat(7u8, 0).is_empty());
        assert!(repeat(7u8, -2).is_empty());
    }
}
