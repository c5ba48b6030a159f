// Typed accessors over a memory image
// Reference: chirp/bitwise.py (struct arrays, bit-packed u8 fields, bbcd, char arrays)

use super::bcd::{int_to_bcd, BcdError};
use super::elements::{read_uint, uint_max, write_uint, ElementError};
use super::parser::parse_bcd;
use super::types::Endianness;
use crate::memmap::{MemoryMap, MemoryMapError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error(transparent)]
    Bounds(#[from] MemoryMapError),

    #[error("Element {index} is outside an array of {count}")]
    Index { index: usize, count: usize },

    #[error("Field at +{offset} ({len} bytes) exceeds a {size}-byte record")]
    Field { offset: usize, len: usize, size: usize },

    #[error("Value {value} does not fit in a {width}-bit field")]
    Overflow { value: u64, width: u32 },

    #[error(transparent)]
    Bcd(#[from] BcdError),

    #[error(transparent)]
    Element(#[from] ElementError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Fixed-size records repeated `count` times from `base`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordArray {
    pub base: usize,
    pub size: usize,
    pub count: usize,
}

impl RecordArray {
    pub const fn new(base: usize, size: usize, count: usize) -> Self {
        Self { base, size, count }
    }

    /// First byte past the last element
    pub const fn end(&self) -> usize {
        self.base + self.size * self.count
    }

    /// Absolute offset of element `index`
    pub fn offset(&self, index: usize) -> Result<usize> {
        if index >= self.count {
            return Err(LayoutError::Index {
                index,
                count: self.count,
            });
        }
        Ok(self.base + index * self.size)
    }

    pub fn view<'a>(&self, mmap: &'a MemoryMap, index: usize) -> Result<RecordView<'a>> {
        let offset = self.offset(index)?;
        Ok(RecordView {
            data: mmap.get(offset, self.size)?,
        })
    }

    pub fn view_mut<'a>(&self, mmap: &'a mut MemoryMap, index: usize) -> Result<RecordViewMut<'a>> {
        let offset = self.offset(index)?;
        Ok(RecordViewMut {
            data: mmap.get_mut(offset, self.size)?,
        })
    }
}

/// A bit-packed field inside one byte of a record.
///
/// `shift` counts from the least significant bit, so the first field declared
/// in a `u8 a:2, b:6;` group has `shift = 6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub byte: usize,
    pub shift: u8,
    pub width: u8,
}

impl BitField {
    pub const fn new(byte: usize, shift: u8, width: u8) -> Self {
        Self { byte, shift, width }
    }

    /// Largest raw value the field holds
    pub const fn max(&self) -> u8 {
        ((1u16 << self.width) - 1) as u8
    }

    pub const fn mask(&self) -> u8 {
        self.max() << self.shift
    }

    pub fn extract(&self, byte: u8) -> u8 {
        (byte & self.mask()) >> self.shift
    }

    /// Replace the field inside `byte`, leaving the other bits alone
    pub fn insert(&self, byte: u8, value: u8) -> Result<u8> {
        if value > self.max() {
            return Err(LayoutError::Overflow {
                value: u64::from(value),
                width: u32::from(self.width),
            });
        }
        Ok((byte & !self.mask()) | (value << self.shift))
    }
}

/// Unsigned integer of 1 to 4 bytes at a record offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UintField {
    pub offset: usize,
    pub width: usize,
    pub endianness: Endianness,
}

impl UintField {
    pub const fn new(offset: usize, width: usize, endianness: Endianness) -> Self {
        Self {
            offset,
            width,
            endianness,
        }
    }

    pub fn max(&self) -> u64 {
        u64::from(uint_max(self.width))
    }
}

/// BCD field of `len` bytes at a record offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcdField {
    pub offset: usize,
    pub len: usize,
    pub endianness: Endianness,
}

impl BcdField {
    pub const fn new(offset: usize, len: usize, endianness: Endianness) -> Self {
        Self {
            offset,
            len,
            endianness,
        }
    }
}

fn field_range(size: usize, offset: usize, len: usize) -> Result<std::ops::Range<usize>> {
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(offset..end),
        _ => Err(LayoutError::Field { offset, len, size }),
    }
}

/// Read-only view of one record
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    data: &'a [u8],
}

impl<'a> RecordView<'a> {
    pub fn bits(&self, field: &BitField) -> Result<u8> {
        let range = field_range(self.data.len(), field.byte, 1)?;
        Ok(field.extract(self.data[range.start]))
    }

    pub fn uint(&self, field: &UintField) -> Result<u32> {
        let range = field_range(self.data.len(), field.offset, field.width)?;
        Ok(read_uint(&self.data[range], field.width, field.endianness)?)
    }

    pub fn bcd(&self, field: &BcdField) -> Result<u64> {
        let range = field_range(self.data.len(), field.offset, field.len)?;
        let bytes = &self.data[range];
        match parse_bcd(field.len, field.endianness)(bytes) {
            Ok((_, value)) => Ok(value),
            // Report the offending byte rather than the parser position
            Err(_) => {
                let bad = bytes
                    .iter()
                    .copied()
                    .find(|b| (b >> 4) > 9 || (b & 0x0F) > 9)
                    .unwrap_or(0xFF);
                Err(BcdError::InvalidDigit(bad).into())
            }
        }
    }

    pub fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let range = field_range(self.data.len(), offset, len)?;
        Ok(&self.data[range])
    }

    /// The whole record
    pub fn raw(&self) -> &'a [u8] {
        self.data
    }
}

/// Mutable view of one record
#[derive(Debug)]
pub struct RecordViewMut<'a> {
    data: &'a mut [u8],
}

impl RecordViewMut<'_> {
    pub fn set_bits(&mut self, field: &BitField, value: u8) -> Result<()> {
        let range = field_range(self.data.len(), field.byte, 1)?;
        let byte = &mut self.data[range.start];
        *byte = field.insert(*byte, value)?;
        Ok(())
    }

    pub fn set_uint(&mut self, field: &UintField, value: u64) -> Result<()> {
        let range = field_range(self.data.len(), field.offset, field.width)?;
        let value = u32::try_from(value).map_err(|_| LayoutError::Overflow {
            value,
            width: (field.width * 8) as u32,
        })?;
        let bytes = write_uint(value, field.width, field.endianness)?;
        self.data[range].copy_from_slice(&bytes);
        Ok(())
    }

    pub fn set_bcd(&mut self, field: &BcdField, value: u64) -> Result<()> {
        let range = field_range(self.data.len(), field.offset, field.len)?;
        let bytes = int_to_bcd(value, field.len, field.endianness)?;
        self.data[range].copy_from_slice(&bytes);
        Ok(())
    }

    pub fn set_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let range = field_range(self.data.len(), offset, bytes.len())?;
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Set every byte of the record to `value`
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }
}
