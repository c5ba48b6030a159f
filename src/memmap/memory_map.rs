// Fixed-length memory image backing a radio's clone data
// Reference: chirp/memmap.py

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryMapError {
    #[error("Range {start:#06x}..{end:#06x} is outside the {size:#06x}-byte image")]
    OutOfBounds {
        start: usize,
        end: usize,
        size: usize,
    },
}

pub type Result<T> = std::result::Result<T, MemoryMapError>;

/// Raw image of a radio's configuration memory.
///
/// The length is fixed when the map is created. Every accessor checks the
/// requested range against it, so a layout that does not fit the image fails
/// loudly instead of reading neighbouring data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryMap {
    data: Vec<u8>,
}

impl MemoryMap {
    /// Create a new memory map from bytes
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Create a new memory map of `size` bytes, all set to `fill`
    pub fn filled(size: usize, fill: u8) -> Self {
        Self {
            data: vec![fill; size],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn check(&self, start: usize, len: usize) -> Result<std::ops::Range<usize>> {
        let end = start.checked_add(len).unwrap_or(usize::MAX);
        if end > self.data.len() {
            return Err(MemoryMapError::OutOfBounds {
                start,
                end,
                size: self.data.len(),
            });
        }
        Ok(start..end)
    }

    /// Get `len` bytes starting at `start`
    pub fn get(&self, start: usize, len: usize) -> Result<&[u8]> {
        let range = self.check(start, len)?;
        Ok(&self.data[range])
    }

    /// Get a mutable window of `len` bytes starting at `start`
    pub fn get_mut(&mut self, start: usize, len: usize) -> Result<&mut [u8]> {
        let range = self.check(start, len)?;
        Ok(&mut self.data[range])
    }

    pub fn get_byte(&self, pos: usize) -> Result<u8> {
        Ok(self.get(pos, 1)?[0])
    }

    pub fn set_byte(&mut self, pos: usize, value: u8) -> Result<()> {
        self.get_mut(pos, 1)?[0] = value;
        Ok(())
    }

    /// Overwrite a run of bytes starting at `pos`
    pub fn set_bytes(&mut self, pos: usize, bytes: &[u8]) -> Result<()> {
        self.get_mut(pos, bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    /// Set `len` bytes starting at `pos` to `value`
    pub fn fill(&mut self, pos: usize, len: usize, value: u8) -> Result<()> {
        self.get_mut(pos, len)?.fill(value);
        Ok(())
    }

    /// The whole image
    pub fn get_packed(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for MemoryMap {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

/// Create a hex dump of bytes (similar to hexdump -C), addresses starting at `base`
pub fn hexdump(base: usize, data: &[u8]) -> String {
    let mut output = String::new();

    for (i, chunk) in data.chunks(16).enumerate() {
        output.push_str(&format!("{:08x}  ", base + i * 16));

        for j in 0..16 {
            if j == 8 {
                output.push(' ');
            }
            match chunk.get(j) {
                Some(byte) => output.push_str(&format!("{:02x} ", byte)),
                None => output.push_str("   "),
            }
        }

        output.push_str(" |");
        for &byte in chunk {
            if (0x20..=0x7e).contains(&byte) {
                output.push(byte as char);
            } else {
                output.push('.');
            }
        }
        output.push_str("|\n");
    }

    output
}
