// chirp-codec: channel codecs for radio clone images

pub mod bitwise;
pub mod core;
pub mod drivers;
pub mod formats;
pub mod memmap;

// Re-export commonly used types
pub use core::{BankSlot, Memory, PowerLevel, RadioFeatures, Skip};
pub use drivers::{
    detect_model, get_model, list_models, ChannelCodec, ModelDescriptor, Radio, RadioError,
    RadioResult,
};
pub use formats::{load_img, open_img, save_img, Metadata};
pub use memmap::MemoryMap;

/// Crate version, written into saved .img metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
