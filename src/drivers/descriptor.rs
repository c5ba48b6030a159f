// Model descriptors: everything a codec needs to know about one radio
// Reference: chirp/ict70.py, chirp/vx3.py (mem_format, tables, class attributes)

use super::tables::{Lookup, PowerSpec};
use super::traits::{RadioError, RadioResult};
use crate::bitwise::{
    bcd_max, parse_terminated, BcdField, BitField, FlagBitmap, LayoutError, RecordArray,
    RecordView, RecordViewMut, UintField,
};
use crate::core::{RadioFeatures, CHARSET_ASCII, SKIP_VALUES};
use crate::memmap::{MemoryMap, MemoryMapError};

/// A frequency stored as an integer count of `step_hz`
#[derive(Debug, Clone, Copy)]
pub enum FreqField {
    Linear { field: UintField, step_hz: u64 },
    Bcd { field: BcdField, step_hz: u64 },
}

impl FreqField {
    pub fn step_hz(&self) -> u64 {
        match self {
            FreqField::Linear { step_hz, .. } | FreqField::Bcd { step_hz, .. } => *step_hz,
        }
    }

    /// Largest raw count the field holds
    pub fn max_raw(&self) -> u64 {
        match self {
            FreqField::Linear { field, .. } => field.max(),
            FreqField::Bcd { field, .. } => bcd_max(field.len),
        }
    }

    /// Raw count for `hz`, rounded down to the field's resolution
    pub fn to_raw(&self, hz: u64) -> Option<u64> {
        let raw = hz / self.step_hz();
        (raw <= self.max_raw()).then_some(raw)
    }

    pub fn read(&self, rec: &RecordView<'_>) -> Result<u64, LayoutError> {
        match self {
            FreqField::Linear { field, step_hz } => Ok(u64::from(rec.uint(field)?) * step_hz),
            FreqField::Bcd { field, step_hz } => Ok(rec.bcd(field)? * step_hz),
        }
    }

    pub fn write(&self, rec: &mut RecordViewMut<'_>, raw: u64) -> Result<(), LayoutError> {
        match self {
            FreqField::Linear { field, .. } => rec.set_uint(field, raw),
            FreqField::Bcd { field, .. } => rec.set_bcd(field, raw),
        }
    }
}

/// How name bytes map to characters
#[derive(Debug, Clone, Copy)]
pub enum Charset {
    /// Printable ASCII stored as-is; NUL bytes read as padding
    Ascii,
    /// 128-entry table indexed by the low seven bits of each byte
    Table(&'static [u8; 128]),
}

impl Charset {
    fn decode(&self, byte: u8) -> Option<char> {
        match self {
            Charset::Ascii => match byte {
                0x00 => Some(' '),
                0x20..=0x7E => Some(char::from(byte)),
                _ => None,
            },
            Charset::Table(table) => Some(char::from(table[usize::from(byte & 0x7F)])),
        }
    }

    fn encode(&self, ch: char) -> Option<u8> {
        match self {
            Charset::Ascii => u8::try_from(ch)
                .ok()
                .filter(|b| (0x20..=0x7E).contains(b)),
            Charset::Table(table) => {
                let byte = u8::try_from(ch).ok()?;
                table
                    .iter()
                    .position(|&c| c == byte)
                    .and_then(|i| u8::try_from(i).ok())
            }
        }
    }

    /// Every character that can be encoded, in table order
    pub fn characters(&self) -> String {
        match self {
            Charset::Ascii => CHARSET_ASCII.to_string(),
            Charset::Table(table) => {
                let mut out = String::new();
                for &b in table.iter() {
                    let ch = char::from(b);
                    if !out.contains(ch) {
                        out.push(ch);
                    }
                }
                out
            }
        }
    }
}

/// A fixed-length name inside the channel record
#[derive(Debug, Clone, Copy)]
pub struct NameField {
    pub offset: usize,
    pub len: usize,
    pub charset: Charset,
    /// Byte that ends the name early
    pub terminator: Option<u8>,
    /// Bit set in the first byte when the name is not blank
    pub nonblank_marker: Option<u8>,
}

impl NameField {
    /// Decode raw name bytes. Returns the offending byte on failure.
    pub fn decode(&self, raw: &[u8]) -> Result<String, u8> {
        let chars = match parse_terminated(self.len, self.terminator)(raw) {
            Ok((_, chars)) => chars,
            Err(_) => raw,
        };
        let mut name = String::with_capacity(self.len);
        for &byte in chars {
            name.push(self.charset.decode(byte).ok_or(byte)?);
        }
        Ok(name.trim_end().to_string())
    }

    /// Encode a name, space padded. Returns the offending character on failure.
    pub fn encode(&self, name: &str) -> Result<Vec<u8>, char> {
        let mut raw = Vec::with_capacity(self.len);
        for ch in name.chars() {
            raw.push(self.charset.encode(ch).ok_or(ch)?);
        }
        let pad = self.charset.encode(' ').ok_or(' ')?;
        raw.resize(self.len, pad);

        if let Some(marker) = self.nonblank_marker {
            if !name.trim().is_empty() {
                raw[0] |= marker;
            }
        }
        Ok(raw)
    }
}

/// A bit field whose raw value indexes a table
#[derive(Debug, Clone, Copy)]
pub struct EnumField<T: 'static> {
    pub bits: BitField,
    pub table: Lookup<T>,
}

/// Field map of one channel record
#[derive(Debug, Clone, Copy)]
pub struct ChannelFields {
    pub freq: FreqField,
    pub offset: FreqField,
    pub name: NameField,
    pub rtone: EnumField<f32>,
    /// `None` when the radio has one tone shared by encode and squelch
    pub ctone: Option<EnumField<f32>>,
    pub dtcs: EnumField<u16>,
    pub dtcs_polarity: Option<EnumField<&'static str>>,
    pub tmode: EnumField<&'static str>,
    pub duplex: EnumField<&'static str>,
    pub mode: EnumField<&'static str>,
    pub tuning_step: EnumField<f32>,
    /// `None` when the power bits are kept but not exposed
    pub power: Option<EnumField<PowerSpec>>,
}

/// How the used/empty state of a slot is stored
#[derive(Debug, Clone, Copy)]
pub enum UsedRule {
    /// One bit per slot, set when the slot is empty
    InvertedBit(FlagBitmap),
    /// Two bits per slot, used only when both are set
    Conjunction {
        valid: FlagBitmap,
        masked: FlagBitmap,
    },
}

impl UsedRule {
    pub fn is_used(&self, mmap: &MemoryMap, slot: usize) -> Result<bool, MemoryMapError> {
        match self {
            UsedRule::InvertedBit(unused) => Ok(!unused.get(mmap, slot)?),
            UsedRule::Conjunction { valid, masked } => {
                Ok(valid.get(mmap, slot)? && masked.get(mmap, slot)?)
            }
        }
    }

    /// Whether the slot's record was already initialised by the radio.
    /// The paired-flag models only look at `valid` here.
    pub fn was_allocated(&self, mmap: &MemoryMap, slot: usize) -> Result<bool, MemoryMapError> {
        match self {
            UsedRule::InvertedBit(unused) => Ok(!unused.get(mmap, slot)?),
            UsedRule::Conjunction { valid, .. } => valid.get(mmap, slot),
        }
    }

    pub fn mark(&self, mmap: &mut MemoryMap, slot: usize, used: bool) -> Result<(), MemoryMapError> {
        match self {
            UsedRule::InvertedBit(unused) => unused.set(mmap, slot, !used),
            UsedRule::Conjunction { valid, masked } => {
                masked.set(mmap, slot, used)?;
                valid.set(mmap, slot, used)
            }
        }
    }

    fn bitmaps(&self) -> Vec<&FlagBitmap> {
        match self {
            UsedRule::InvertedBit(unused) => vec![unused],
            UsedRule::Conjunction { valid, masked } => vec![valid, masked],
        }
    }
}

/// Per-slot bitmaps outside the record region
#[derive(Debug, Clone, Copy)]
pub struct Validity {
    pub used: UsedRule,
    pub skip: FlagBitmap,
    pub pskip: FlagBitmap,
}

/// A constant written into a freshly allocated record
#[derive(Debug, Clone, Copy)]
pub enum FieldDefault {
    Bits(BitField, u8),
    Bytes { offset: usize, len: usize, value: u8 },
}

impl FieldDefault {
    pub fn apply(&self, rec: &mut RecordViewMut<'_>) -> Result<(), LayoutError> {
        match *self {
            FieldDefault::Bits(field, value) => rec.set_bits(&field, value),
            FieldDefault::Bytes { offset, len, value } => rec.set_bytes(offset, &vec![value; len]),
        }
    }
}

/// What happens to the record bytes before fields are written
#[derive(Debug, Clone, Copy)]
pub enum RecordInit {
    /// Zero the record on every write, empty or not
    ZeroEveryWrite,
    /// Zero the record and apply hardware defaults only when an empty slot is
    /// filled; edits keep the bits the codec does not know about.
    ///
    /// Emptying a slot only clears its flags and leaves the old field bytes in
    /// place. The radio does the same, and zeroing them would make an image
    /// edited here differ from one edited on the set.
    DefaultFillOnAllocate(&'static [FieldDefault]),
}

/// Bank membership table and bank names
#[derive(Debug, Clone, Copy)]
pub struct BankLayout {
    /// One `{u8 bank, u8 index}` pair per channel
    pub assignments: RecordArray,
    /// One fixed-length name per bank
    pub names: RecordArray,
    /// Bank byte meaning "no bank"
    pub unassigned: u8,
    /// Number of distinct indices inside one bank
    pub index_capacity: u16,
}

impl BankLayout {
    pub const BANK: BitField = BitField::new(0, 0, 8);
    pub const INDEX: BitField = BitField::new(1, 0, 8);

    pub fn bank_count(&self) -> usize {
        self.names.count
    }

    pub fn name_len(&self) -> usize {
        self.names.size
    }
}

/// Sum of `[start, end)` mod 256 stored at `at`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumSpec {
    pub start: usize,
    pub end: usize,
    pub at: usize,
}

/// Clone transport parameters. Carried for callers, only the model id is
/// looked at here (detection of Yaesu images).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneParams {
    Icom {
        model_id: &'static [u8],
        end_frame: &'static [u8],
        /// (start, end, block size)
        ranges: &'static [(usize, usize, usize)],
    },
    Yaesu {
        /// Also stored at the start of the image
        model_id: &'static [u8],
        baud_rate: u32,
        block_lengths: &'static [usize],
        block_size: usize,
    },
}

impl CloneParams {
    /// Model id bytes expected at offset 0 of a downloaded image
    pub fn image_prefix(&self) -> Option<&'static [u8]> {
        match self {
            CloneParams::Icom { .. } => None,
            CloneParams::Yaesu { model_id, .. } => Some(model_id),
        }
    }
}

/// Complete description of one radio model's memory image
#[derive(Debug)]
pub struct ModelDescriptor {
    pub vendor: &'static str,
    pub model: &'static str,
    pub memsize: usize,
    /// Number of the first channel; slot = number - first_number
    pub first_number: u32,
    pub records: RecordArray,
    pub fields: ChannelFields,
    pub validity: Validity,
    pub init: RecordInit,
    pub banks: Option<BankLayout>,
    pub checksum: Option<ChecksumSpec>,
    pub clone: CloneParams,
    /// (low_hz, high_hz)
    pub valid_bands: &'static [(u64, u64)],
    pub can_odd_split: bool,
}

impl ModelDescriptor {
    pub fn channel_count(&self) -> usize {
        self.records.count
    }

    pub fn memory_bounds(&self) -> (u32, u32) {
        let last = self.first_number + self.records.count as u32 - 1;
        (self.first_number, last)
    }

    /// Record slot of channel `number`
    pub fn slot(&self, number: u32) -> RadioResult<usize> {
        let (lo, hi) = self.memory_bounds();
        if !(lo..=hi).contains(&number) {
            return Err(RadioError::InvalidMemory(number));
        }
        Ok((number - lo) as usize)
    }

    /// Check that every region of the layout lies inside `memsize`
    pub fn verify_layout(&self) -> RadioResult<()> {
        let mut regions = vec![("memory", self.records.base, self.records.end())];

        let validity = &self.validity;
        for bitmap in validity
            .used
            .bitmaps()
            .into_iter()
            .chain([&validity.skip, &validity.pskip])
        {
            regions.push(("flags", bitmap.base, bitmap.base + bitmap.byte_len()));
        }
        if let Some(banks) = &self.banks {
            regions.push(("banks", banks.assignments.base, banks.assignments.end()));
            regions.push(("bank_names", banks.names.base, banks.names.end()));
        }
        if let Some(cs) = &self.checksum {
            regions.push(("checksum", cs.start, cs.end));
            regions.push(("checksum", cs.at, cs.at + 1));
        }

        for (_, start, end) in regions {
            if end > self.memsize {
                return Err(MemoryMapError::OutOfBounds {
                    start,
                    end,
                    size: self.memsize,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Static capability descriptor
    pub fn features(&self) -> RadioFeatures {
        let f = &self.fields;
        let strings = |table: &Lookup<&'static str>| {
            table
                .distinct()
                .into_iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
        };

        let mut rf = RadioFeatures {
            memory_bounds: self.memory_bounds(),
            has_ctone: f.ctone.is_some(),
            has_dtcs_polarity: f.dtcs_polarity.is_some(),
            has_bank: self.banks.is_some(),
            has_bank_index: self.banks.is_some(),
            has_bank_names: self.banks.is_some(),
            can_odd_split: self.can_odd_split,
            valid_modes: strings(&f.mode.table),
            valid_tmodes: strings(&f.tmode.table),
            valid_duplexes: strings(&f.duplex.table),
            valid_tuning_steps: f.tuning_step.table.values.to_vec(),
            valid_bands: self.valid_bands.to_vec(),
            valid_skips: SKIP_VALUES.iter().map(|s| s.to_string()).collect(),
            valid_power_levels: f
                .power
                .map(|p| p.table.values.iter().map(PowerSpec::level).collect())
                .unwrap_or_default(),
            valid_characters: f.name.charset.characters(),
            valid_name_length: f.name.len,
            valid_tones: f.rtone.table.values.to_vec(),
            valid_dtcs_codes: f.dtcs.table.values.to_vec(),
            ..Default::default()
        };
        if let Some(pol) = &f.dtcs_polarity {
            rf.valid_dtcs_pols = strings(&pol.table);
        }
        rf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitwise::Endianness;

    const TABLE: [u8; 128] = {
        let mut t = [b'?'; 128];
        let digits = b"0123456789";
        let mut i = 0;
        while i < 10 {
            t[i] = digits[i];
            i += 1;
        }
        t[36] = b' ';
        t
    };

    fn table_name() -> NameField {
        NameField {
            offset: 0,
            len: 6,
            charset: Charset::Table(&TABLE),
            terminator: Some(0xFF),
            nonblank_marker: Some(0x80),
        }
    }

    #[test]
    fn test_ascii_name() {
        let name = NameField {
            offset: 0,
            len: 6,
            charset: Charset::Ascii,
            terminator: None,
            nonblank_marker: None,
        };
        assert_eq!(name.encode("CALL").unwrap(), b"CALL  ");
        assert_eq!(name.decode(b"CALL  ").unwrap(), "CALL");
        assert_eq!(name.decode(b"AB\0\0\0\0").unwrap(), "AB");
        assert_eq!(name.decode(b"AB\x80   "), Err(0x80));
        assert_eq!(name.encode("caf\u{e9}"), Err('\u{e9}'));
    }

    #[test]
    fn test_table_name() {
        let name = table_name();
        let raw = name.encode("12").unwrap();
        assert_eq!(raw, vec![0x81, 0x02, 36, 36, 36, 36]);
        assert_eq!(name.decode(&raw).unwrap(), "12");

        // Blank names carry no marker
        assert_eq!(name.encode("").unwrap(), vec![36; 6]);
        // Decoding stops at the sentinel
        assert_eq!(name.decode(&[0x83, 0x04, 0xFF, 0x01, 0x01, 0x01]).unwrap(), "34");
        assert_eq!(name.decode(&[0xFF; 6]).unwrap(), "");
        // '?' fills unused table slots, the first one wins on encode
        assert_eq!(name.encode("?").unwrap()[0], 0x80 | 10);
        assert_eq!(name.encode("A"), Err('A'));
    }

    #[test]
    fn test_freq_field() {
        let linear = FreqField::Linear {
            field: UintField::new(0, 3, Endianness::Big),
            step_hz: 5000,
        };
        assert_eq!(linear.to_raw(146_520_000), Some(29_304));
        assert_eq!(linear.to_raw(146_522_000), Some(29_304));
        assert_eq!(linear.to_raw(u64::MAX), None);

        let bcd = FreqField::Bcd {
            field: BcdField::new(2, 3, Endianness::Big),
            step_hz: 1000,
        };
        assert_eq!(bcd.to_raw(999_999_000), Some(999_999));
        assert_eq!(bcd.to_raw(1_000_000_000), None);
    }

    #[test]
    fn test_charset_characters() {
        assert_eq!(Charset::Ascii.characters().len(), 95);
        assert_eq!(Charset::Table(&TABLE).characters(), "0123456789? ");
    }
}
