// Binary-Coded Decimal (BCD) encoding/decoding
// Reference: chirp/bitwise.py (bbcd / lbcd)

use super::types::Endianness;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BcdError {
    #[error("Invalid BCD byte: {0:#04x}")]
    InvalidDigit(u8),

    #[error("Value {value} does not fit in {digits} BCD digits")]
    ValueTooLarge { value: u64, digits: usize },
}

pub type Result<T> = std::result::Result<T, BcdError>;

/// Split a BCD byte into its (tens, ones) digits
/// Example: 0x12 -> (1, 2), 0x95 -> (9, 5)
pub fn bcd_byte_to_digits(byte: u8) -> Result<(u8, u8)> {
    let tens = byte >> 4;
    let ones = byte & 0x0F;

    if tens > 9 || ones > 9 {
        return Err(BcdError::InvalidDigit(byte));
    }

    Ok((tens, ones))
}

/// Decode a BCD array, two digits per byte
/// Example: [0x14, 0x65, 0x20] (big-endian) -> 146520
pub fn bcd_to_int(bytes: &[u8], endianness: Endianness) -> Result<u64> {
    let mut value: u64 = 0;

    let mut push = |byte: u8| -> Result<()> {
        let (tens, ones) = bcd_byte_to_digits(byte)?;
        value = value * 100 + u64::from(tens * 10 + ones);
        Ok(())
    };

    match endianness {
        Endianness::Big => bytes.iter().try_for_each(|&b| push(b))?,
        Endianness::Little => bytes.iter().rev().try_for_each(|&b| push(b))?,
    }

    Ok(value)
}

/// Encode `value` into `num_bytes` BCD bytes
/// Example: 146520, 3 bytes, big-endian -> [0x14, 0x65, 0x20]
pub fn int_to_bcd(value: u64, num_bytes: usize, endianness: Endianness) -> Result<Vec<u8>> {
    let mut result = vec![0u8; num_bytes];
    let mut remaining = value;

    // Fill least significant byte first, then flip for big-endian storage
    for byte in result.iter_mut() {
        let pair = (remaining % 100) as u8;
        remaining /= 100;
        *byte = ((pair / 10) << 4) | (pair % 10);
    }

    if remaining > 0 {
        return Err(BcdError::ValueTooLarge {
            value,
            digits: num_bytes * 2,
        });
    }

    if endianness.is_big() {
        result.reverse();
    }

    Ok(result)
}

/// Largest value representable in `num_bytes` BCD bytes
pub fn bcd_max(num_bytes: usize) -> u64 {
    10u64.pow((num_bytes * 2) as u32) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcd_byte_conversion() {
        assert_eq!(bcd_byte_to_digits(0x12).unwrap(), (1, 2));
        assert_eq!(bcd_byte_to_digits(0x95).unwrap(), (9, 5));
        assert_eq!(bcd_byte_to_digits(0x00).unwrap(), (0, 0));
        assert_eq!(bcd_byte_to_digits(0xAB), Err(BcdError::InvalidDigit(0xAB)));
        assert!(bcd_byte_to_digits(0x1F).is_err());
    }

    #[test]
    fn test_bcd_to_int() {
        assert_eq!(bcd_to_int(&[0x14, 0x65, 0x20], Endianness::Big).unwrap(), 146520);
        assert_eq!(
            bcd_to_int(&[0x56, 0x34, 0x12], Endianness::Little).unwrap(),
            123456
        );
        assert!(bcd_to_int(&[0x14, 0xF5, 0x20], Endianness::Big).is_err());
    }

    #[test]
    fn test_int_to_bcd() {
        assert_eq!(
            int_to_bcd(146520, 3, Endianness::Big).unwrap(),
            vec![0x14, 0x65, 0x20]
        );
        assert_eq!(
            int_to_bcd(123456, 3, Endianness::Little).unwrap(),
            vec![0x56, 0x34, 0x12]
        );
        assert_eq!(int_to_bcd(600, 3, Endianness::Big).unwrap(), vec![0x00, 0x06, 0x00]);
        assert_eq!(
            int_to_bcd(1_000_000, 3, Endianness::Big),
            Err(BcdError::ValueTooLarge {
                value: 1_000_000,
                digits: 6
            })
        );
    }

    #[test]
    fn test_bcd_max() {
        assert_eq!(bcd_max(3), 999_999);
        assert_eq!(bcd_max(1), 99);
    }
}
