// Core module containing fundamental CHIRP data structures
pub mod constants;
pub mod features;
pub mod memory;
pub mod power;

// Re-export commonly used types
pub use constants::*;
pub use features::{Advisory, RadioFeatures};
pub use memory::{BankSlot, Memory, MemoryError, Skip};
pub use power::{PowerError, PowerLevel};
