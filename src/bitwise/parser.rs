// nom parsers for BCD and terminated character fields
// Reference: chirp/bitwise.py

use super::bcd::bcd_to_int;
use super::types::Endianness;
use nom::{
    bytes::complete::{take, take_till},
    error::{Error, ErrorKind},
    IResult, Parser,
};

/// Parse a BCD value of `num_bytes` bytes
pub fn parse_bcd(num_bytes: usize, endianness: Endianness) -> impl Fn(&[u8]) -> IResult<&[u8], u64> {
    move |input: &[u8]| {
        let taken: IResult<&[u8], &[u8]> = take(num_bytes).parse(input);
        let (rest, bytes) = taken?;
        let value = bcd_to_int(bytes, endianness)
            .map_err(|_| nom::Err::Error(Error::new(input, ErrorKind::Verify)))?;
        Ok((rest, value))
    }
}

/// Take a fixed-width character field and return the bytes before `terminator`.
///
/// The whole field is always consumed, so parsers chained after this one stay
/// aligned with the layout regardless of where the terminator sits.
pub fn parse_terminated(
    len: usize,
    terminator: Option<u8>,
) -> impl Fn(&[u8]) -> IResult<&[u8], &[u8]> {
    move |input: &[u8]| {
        let taken: IResult<&[u8], &[u8]> = take(len).parse(input);
        let (rest, field) = taken?;
        let chars = match terminator {
            Some(t) => {
                let till: IResult<&[u8], &[u8]> = take_till(|b: u8| b == t).parse(field);
                till?.1
            }
            None => field,
        };
        Ok((rest, chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bcd() {
        let data = [0x14, 0x65, 0x20, 0xAA];
        let (rest, value) = parse_bcd(3, Endianness::Big)(&data).unwrap();
        assert_eq!(value, 146520);
        assert_eq!(rest, &[0xAA]);

        let (_, value) = parse_bcd(3, Endianness::Little)(&[0x56, 0x34, 0x12]).unwrap();
        assert_eq!(value, 123456);

        assert!(parse_bcd(2, Endianness::Big)(&[0x1A, 0x00]).is_err());
        assert!(parse_bcd(4, Endianness::Big)(&[0x12]).is_err());
    }

    #[test]
    fn test_parse_terminated() {
        let data = [0x01, 0x02, 0xFF, 0x03, 0xFF, 0xFF, 0x42];
        let (rest, chars) = parse_terminated(6, Some(0xFF))(&data).unwrap();
        assert_eq!(chars, &[0x01, 0x02]);
        assert_eq!(rest, &[0x42]);

        let (_, chars) = parse_terminated(3, Some(0xFF))(b"ABC").unwrap();
        assert_eq!(chars, b"ABC");

        let (_, chars) = parse_terminated(4, None)(b"AB\xFFC").unwrap();
        assert_eq!(chars, b"AB\xFFC");
    }
}
