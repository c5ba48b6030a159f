// Unsigned integer elements of 1 to 4 bytes
// Reference: chirp/bitwise.py (u8/u16/ul16/u24/ul24/u32/ul32)

use super::types::Endianness;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElementError {
    #[error("Insufficient data: expected {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("Unsupported element width: {0} bytes")]
    UnsupportedWidth(usize),

    #[error("Value {value:#x} does not fit in {width} bytes")]
    ValueTooWide { value: u32, width: usize },
}

pub type Result<T> = std::result::Result<T, ElementError>;

fn check_width(width: usize) -> Result<()> {
    if !(1..=4).contains(&width) {
        return Err(ElementError::UnsupportedWidth(width));
    }
    Ok(())
}

/// Largest value a `width`-byte element can hold
pub fn uint_max(width: usize) -> u32 {
    if width >= 4 {
        u32::MAX
    } else {
        (1u32 << (width * 8)) - 1
    }
}

/// Read a `width`-byte unsigned integer from the start of `data`
pub fn read_uint(data: &[u8], width: usize, endianness: Endianness) -> Result<u32> {
    check_width(width)?;
    let bytes = data.get(..width).ok_or(ElementError::InsufficientData {
        expected: width,
        actual: data.len(),
    })?;

    let fold = |acc: u32, &b: &u8| (acc << 8) | u32::from(b);
    Ok(match endianness {
        Endianness::Big => bytes.iter().fold(0, fold),
        Endianness::Little => bytes.iter().rev().fold(0, fold),
    })
}

/// Encode `value` as a `width`-byte unsigned integer
pub fn write_uint(value: u32, width: usize, endianness: Endianness) -> Result<Vec<u8>> {
    check_width(width)?;
    if value > uint_max(width) {
        return Err(ElementError::ValueTooWide { value, width });
    }

    let le = value.to_le_bytes();
    let mut bytes = le[..width].to_vec();
    if endianness.is_big() {
        bytes.reverse();
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u16_read_write() {
        assert_eq!(read_uint(&[0x12, 0x34], 2, Endianness::Big).unwrap(), 0x1234);
        assert_eq!(read_uint(&[0x34, 0x12], 2, Endianness::Little).unwrap(), 0x1234);
        assert_eq!(write_uint(0x1234, 2, Endianness::Little).unwrap(), vec![0x34, 0x12]);
    }

    #[test]
    fn test_u24_read_write() {
        let data_be = [0x12, 0x34, 0x56];
        assert_eq!(read_uint(&data_be, 3, Endianness::Big).unwrap(), 0x123456);
        assert_eq!(write_uint(0x123456, 3, Endianness::Big).unwrap(), data_be);

        let data_le = [0x56, 0x34, 0x12];
        assert_eq!(read_uint(&data_le, 3, Endianness::Little).unwrap(), 0x123456);
        assert_eq!(write_uint(0x123456, 3, Endianness::Little).unwrap(), data_le);
    }

    #[test]
    fn test_value_too_wide() {
        assert_eq!(
            write_uint(0x1_0000, 2, Endianness::Big),
            Err(ElementError::ValueTooWide {
                value: 0x1_0000,
                width: 2
            })
        );
        assert!(write_uint(0xFF_FFFF, 3, Endianness::Big).is_ok());
        assert_eq!(uint_max(3), 0xFF_FFFF);
        assert_eq!(uint_max(4), u32::MAX);
    }

    #[test]
    fn test_insufficient_data() {
        let data = [0x12];
        assert!(read_uint(&data, 2, Endianness::Big).is_err());
        assert!(read_uint(&data, 3, Endianness::Little).is_err());
        assert_eq!(
            read_uint(&data, 5, Endianness::Big),
            Err(ElementError::UnsupportedWidth(5))
        );
    }
}
