// Memory image storage
pub mod memory_map;

pub use memory_map::{hexdump, MemoryMap, MemoryMapError};
