// Whole-image checksum
// Reference: chirp/vx3.py _update_checksum

use super::descriptor::ChecksumSpec;
use crate::memmap::{MemoryMap, MemoryMapError};

/// Sum of the bytes in `[start, end)` modulo 256
pub fn compute(mmap: &MemoryMap, spec: &ChecksumSpec) -> Result<u8, MemoryMapError> {
    let len = spec.end.saturating_sub(spec.start);
    Ok(mmap
        .get(spec.start, len)?
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b)))
}

/// Checksum byte currently stored in the image
pub fn stored(mmap: &MemoryMap, spec: &ChecksumSpec) -> Result<u8, MemoryMapError> {
    mmap.get_byte(spec.at)
}

/// Recompute and store the checksum, returning the new value
pub fn recompute(mmap: &mut MemoryMap, spec: &ChecksumSpec) -> Result<u8, MemoryMapError> {
    let cs = compute(mmap, spec)?;
    mmap.set_byte(spec.at, cs)?;
    Ok(cs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: ChecksumSpec = ChecksumSpec {
        start: 0,
        end: 4,
        at: 4,
    };

    #[test]
    fn test_recompute() {
        let mut mmap = MemoryMap::new(vec![0x80, 0x80, 0x01, 0x02, 0x00]);
        assert_eq!(recompute(&mut mmap, &SPEC).unwrap(), 0x03);
        assert_eq!(stored(&mmap, &SPEC).unwrap(), 0x03);
        // Deterministic over unchanged data
        assert_eq!(compute(&mmap, &SPEC).unwrap(), 0x03);

        // Bytes outside the range don't count, including the checksum itself
        mmap.set_byte(4, 0x77).unwrap();
        assert_eq!(compute(&mmap, &SPEC).unwrap(), 0x03);
    }

    #[test]
    fn test_weak_sum() {
        let mut mmap = MemoryMap::new(vec![0x10, 0x20, 0x00, 0x00, 0x00]);
        let before = compute(&mmap, &SPEC).unwrap();

        mmap.set_byte(2, 0x01).unwrap();
        assert_ne!(compute(&mmap, &SPEC).unwrap(), before);

        // Changes that cancel out mod 256 go unnoticed
        mmap.set_bytes(0, &[0x90, 0xA0, 0x00]).unwrap();
        assert_eq!(compute(&mmap, &SPEC).unwrap(), before);
    }

    #[test]
    fn test_out_of_range() {
        let mut mmap = MemoryMap::filled(4, 0);
        assert!(recompute(&mut mmap, &SPEC).is_err());
    }
}
