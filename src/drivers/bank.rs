// Bank assignment and bank names
// Reference: chirp/ict70.py get_banks, set_banks, get_available_bank_index

use super::descriptor::BankLayout;
use super::traits::{RadioError, RadioResult};
use crate::core::BankSlot;
use crate::memmap::MemoryMap;
use std::collections::BTreeSet;
use tracing::debug;

/// Bank pair stored for `slot`, `None` when unassigned
pub fn read_slot(banks: &BankLayout, mmap: &MemoryMap, slot: usize) -> RadioResult<Option<BankSlot>> {
    let rec = banks.assignments.view(mmap, slot)?;
    let bank = rec.bits(&BankLayout::BANK)?;
    if bank == banks.unassigned {
        return Ok(None);
    }
    Ok(Some(BankSlot {
        bank,
        index: rec.bits(&BankLayout::INDEX)?,
    }))
}

pub fn write_slot(
    banks: &BankLayout,
    mmap: &mut MemoryMap,
    slot: usize,
    value: Option<BankSlot>,
) -> RadioResult<()> {
    let (bank, index) = match value {
        Some(s) => (s.bank, s.index),
        None => (banks.unassigned, banks.unassigned),
    };
    let mut rec = banks.assignments.view_mut(mmap, slot)?;
    rec.set_bits(&BankLayout::BANK, bank)?;
    rec.set_bits(&BankLayout::INDEX, index)?;
    Ok(())
}

/// Smallest index below the bank's capacity not used by any channel in `bank`.
///
/// `assigned` yields the bank pair of every channel; which of them are in use
/// is the caller's business.
pub fn allocate(
    banks: &BankLayout,
    bank: u8,
    assigned: impl IntoIterator<Item = BankSlot>,
) -> RadioResult<u8> {
    let taken: BTreeSet<u16> = assigned
        .into_iter()
        .filter(|s| s.bank == bank)
        .map(|s| u16::from(s.index))
        .collect();

    let free = (0..banks.index_capacity)
        .find(|i| !taken.contains(i))
        .and_then(|i| u8::try_from(i).ok());
    debug!("bank {}: {} indices taken, next {:?}", bank, taken.len(), free);
    free.ok_or(RadioError::BankFull(bank))
}

/// Bank names with trailing padding removed
pub fn read_names(banks: &BankLayout, mmap: &MemoryMap) -> RadioResult<Vec<String>> {
    (0..banks.bank_count())
        .map(|i| -> RadioResult<String> {
            let raw = banks.names.view(mmap, i)?.raw();
            let name: String = raw
                .iter()
                .map(|&b| if b.is_ascii_graphic() { char::from(b) } else { ' ' })
                .collect();
            Ok(name.trim_end().to_string())
        })
        .collect()
}

/// Uppercase, pad and store bank names. Missing trailing names are left alone.
pub fn write_names(banks: &BankLayout, mmap: &mut MemoryMap, names: &[String]) -> RadioResult<()> {
    if names.len() > banks.bank_count() {
        return Err(RadioError::InvalidRecord {
            number: names.len() as u32,
            field: "bank_names",
            value: format!("{} names for {} banks", names.len(), banks.bank_count()),
        });
    }

    let len = banks.name_len();
    let mut encoded = Vec::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        let upper = name.to_uppercase();
        if let Some(bad) = upper.chars().find(|c| !(c.is_ascii_graphic() || *c == ' ')) {
            return Err(RadioError::InvalidRecord {
                number: i as u32,
                field: "bank_name",
                value: bad.to_string(),
            });
        }
        let mut raw: Vec<u8> = upper.bytes().take(len).collect();
        raw.resize(len, b' ');
        encoded.push(raw);
    }

    for (i, raw) in encoded.iter().enumerate() {
        banks.names.view_mut(mmap, i)?.set_bytes(0, raw)?;
    }
    Ok(())
}
