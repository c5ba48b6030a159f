// Per-channel flag bits stored outside the channel records
// Reference: chirp/ict70.py (used/skips/pskips), chirp/vx3.py (flags[] nibbles)

use crate::memmap::{MemoryMap, MemoryMapError};

/// How a slot number maps onto bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// One bit per slot: byte `slot / 8`, bit `slot % 8` (LSB first)
    Flat,
    /// Two slots share a byte, one nibble each. `bit` selects the flag
    /// inside the low nibble; odd slots use the same bit in the high nibble.
    PairedNibble { bit: u8 },
}

/// Byte offset and mask of one slot's flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitAddress {
    pub byte: usize,
    pub mask: u8,
}

/// A bit array with one flag per channel slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagBitmap {
    pub base: usize,
    pub slots: usize,
    pub geometry: Geometry,
}

impl FlagBitmap {
    pub const fn flat(base: usize, slots: usize) -> Self {
        Self {
            base,
            slots,
            geometry: Geometry::Flat,
        }
    }

    pub const fn paired_nibble(base: usize, slots: usize, bit: u8) -> Self {
        Self {
            base,
            slots,
            geometry: Geometry::PairedNibble { bit },
        }
    }

    /// Bytes the bitmap occupies in the image
    pub const fn byte_len(&self) -> usize {
        match self.geometry {
            Geometry::Flat => self.slots.div_ceil(8),
            Geometry::PairedNibble { .. } => self.slots.div_ceil(2),
        }
    }

    pub fn locate(&self, slot: usize) -> BitAddress {
        match self.geometry {
            Geometry::Flat => BitAddress {
                byte: self.base + slot / 8,
                mask: 1 << (slot % 8),
            },
            Geometry::PairedNibble { bit } => BitAddress {
                byte: self.base + slot / 2,
                mask: 1 << (bit + 4 * (slot % 2) as u8),
            },
        }
    }

    fn address(&self, slot: usize) -> Result<BitAddress, MemoryMapError> {
        if slot >= self.slots {
            return Err(MemoryMapError::OutOfBounds {
                start: self.base + slot,
                end: self.base + slot + 1,
                size: self.base + self.byte_len(),
            });
        }
        Ok(self.locate(slot))
    }

    pub fn get(&self, mmap: &MemoryMap, slot: usize) -> Result<bool, MemoryMapError> {
        let addr = self.address(slot)?;
        Ok(mmap.get_byte(addr.byte)? & addr.mask != 0)
    }

    /// Set or clear one slot's bit with a single read-modify-write of its byte
    pub fn set(&self, mmap: &mut MemoryMap, slot: usize, value: bool) -> Result<(), MemoryMapError> {
        let addr = self.address(slot)?;
        let byte = mmap.get_byte(addr.byte)?;
        let byte = if value {
            byte | addr.mask
        } else {
            byte & !addr.mask
        };
        mmap.set_byte(addr.byte, byte)
    }
}
