// Common type definitions for binary layouts

use serde::{Deserialize, Serialize};

/// Byte order of a multi-byte field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Endianness {
    #[default]
    Big,
    Little,
}

impl Endianness {
    pub fn is_big(&self) -> bool {
        matches!(self, Endianness::Big)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_big_endian() {
        assert!(Endianness::default().is_big());
        assert!(!Endianness::Little.is_big());
    }
}
