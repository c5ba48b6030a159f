// Radio driver traits
// Reference: chirp/chirp_common.py lines 1240-1500

use crate::bitwise::LayoutError;
use crate::core::{Memory, RadioFeatures};
use crate::memmap::MemoryMapError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RadioError {
    /// A raw field holds a value with no table entry
    #[error("Memory {number}: corrupt {field} (raw value {raw:#x})")]
    CorruptImage {
        number: u32,
        field: &'static str,
        raw: u32,
    },

    /// A memory carries a value the model cannot store
    #[error("Memory {number}: {field} {value:?} is not supported")]
    InvalidRecord {
        number: u32,
        field: &'static str,
        value: String,
    },

    #[error("Out of slots in bank {0}")]
    BankFull(u8),

    #[error("No bank {0} on this radio")]
    InvalidBank(u8),

    /// The layout addresses bytes the image does not have
    #[error("Layout does not fit the image: {0}")]
    Layout(#[from] LayoutError),

    #[error("Invalid memory location: {0}")]
    InvalidMemory(u32),

    #[error("Image is {actual} bytes, expected {expected}")]
    ImageSize { expected: usize, actual: usize },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl From<MemoryMapError> for RadioError {
    fn from(err: MemoryMapError) -> Self {
        RadioError::Layout(LayoutError::Bounds(err))
    }
}

pub type RadioResult<T> = std::result::Result<T, RadioError>;

/// Base trait for all radio drivers
pub trait Radio: Send {
    /// Get the radio vendor name
    fn vendor(&self) -> &str;

    /// Get the radio model name
    fn model(&self) -> &str;

    /// Get the radio's feature set
    fn get_features(&self) -> RadioFeatures;

    /// Get a printable name for this radio
    fn get_name(&self) -> String {
        format!("{} {}", self.vendor(), self.model())
    }

    /// Get a memory. Unused slots come back with `empty` set.
    fn get_memory(&self, number: u32) -> RadioResult<Memory>;

    /// Store a memory. Nothing is written when validation fails.
    fn set_memory(&mut self, memory: &Memory) -> RadioResult<()>;

    /// Delete a memory (mark as empty)
    fn delete_memory(&mut self, number: u32) -> RadioResult<()> {
        self.set_memory(&Memory::new_empty(number))
    }

    /// Get every non-empty memory.
    ///
    /// Stops at the first channel that fails to decode. Callers that want to
    /// skip corrupt channels should walk `memory_bounds` with `get_memory`.
    fn get_memories(&self) -> RadioResult<Vec<Memory>> {
        let (start, end) = self.get_features().memory_bounds;
        let mut memories = Vec::new();

        for i in start..=end {
            let mem = self.get_memory(i)?;
            if !mem.empty {
                memories.push(mem);
            }
        }

        Ok(memories)
    }

    /// Raw record bytes of one channel
    fn get_raw_memory(&self, number: u32) -> RadioResult<Vec<u8>>;

    /// Bank names; empty for radios without banks
    fn get_banks(&self) -> RadioResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn set_banks(&mut self, _names: &[String]) -> RadioResult<()> {
        Err(RadioError::Unsupported(format!(
            "{} has no banks",
            self.get_name()
        )))
    }

    /// Lowest index not yet used inside `bank`
    fn get_available_bank_index(&self, bank: u8) -> RadioResult<u8> {
        Err(RadioError::Unsupported(format!(
            "{} has no bank {}",
            self.get_name(),
            bank
        )))
    }

    /// Coerce a name into something the radio can store
    fn filter_name(&self, name: &str) -> String {
        name.to_string()
    }
}
