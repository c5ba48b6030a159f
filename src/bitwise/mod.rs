// Binary layout primitives for radio memory images
// Typed stand-ins for chirp's bitwise DSL

pub mod bcd;
pub mod elements;
pub mod flags;
pub mod layout;
pub mod parser;
pub mod types;

pub use bcd::{bcd_max, bcd_to_int, int_to_bcd, BcdError};
pub use elements::{read_uint, write_uint, ElementError};
pub use flags::{BitAddress, FlagBitmap, Geometry};
pub use layout::{
    BcdField, BitField, LayoutError, RecordArray, RecordView, RecordViewMut, UintField,
};
pub use parser::{parse_bcd, parse_terminated};
pub use types::Endianness;
