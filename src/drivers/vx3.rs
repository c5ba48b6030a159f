// Yaesu VX-3 memory layout
// Reference: chirp/vx3.py

use super::descriptor::*;
use super::tables::Lookup;
use crate::bitwise::{BcdField, BitField, Endianness, FlagBitmap, RecordArray};
use crate::core::{DTCS_CODES, TONES};

const CHANNELS: usize = 900;
const FLAGS: usize = 0x20CA;

const DUPLEX: &[&str] = &["", "-", "+", "split"];
// The last entry is the radio's automatic mode
const MODES: &[&str] = &["FM", "AM", "WFM", "FM"];
const TMODES: &[&str] = &["", "Tone", "TSQL", "DTCS"];
// 9 kHz sits at index 1 on the radio
const STEPS: &[f32] = &[5.0, 9.0, 10.0, 12.5, 15.0, 20.0, 25.0, 50.0, 100.0];

/// Name characters; bytes index this table through their low seven bits
pub const CHARSET: &[u8; 128] = b"0123456789ABCDEFGHIJKLMNOPQRSTUV\
    WXYZ +-/?[](){}??_?????????????*\
    ??,'|????\\??????????????????????\
    ????????????????????????????????";

const POWER: BitField = BitField::new(5, 6, 2);
const UNKNOWN7: BitField = BitField::new(19, 4, 4);
const AUTOMODE: BitField = BitField::new(19, 3, 1);

// What the radio itself writes into a slot it has never used
const NEW_SLOT: &[FieldDefault] = &[
    FieldDefault::Bits(POWER, 0b11),
    FieldDefault::Bytes {
        offset: 6,
        len: 6,
        value: 0xFF,
    },
    FieldDefault::Bytes {
        offset: 17,
        len: 1,
        value: 0x0D,
    },
    FieldDefault::Bits(UNKNOWN7, 0b0001),
    FieldDefault::Bits(AUTOMODE, 1),
];

// struct {
//   u8 unknown1;
//   u8 mode:2, duplex:2, tune_step:4;
//   bbcd freq[3];
//   u8 power:2, unknown2:4, tmode:2;
//   u8 name[6];
//   bbcd offset[3];
//   u8 unknown3:2, tone:6;
//   u8 unknown4:1, dcs:7;
//   u8 unknown5; u8 unknown6;
//   u8 unknown7:4, automode:1, unknown8:3;
// } memory[900];
//
// Flags are one byte per pair of slots. The low nibble belongs to the even
// slot: pskip, skip, valid, masked from bit 3 down to bit 0.
pub static VX3: ModelDescriptor = ModelDescriptor {
    vendor: "Yaesu",
    model: "VX-3",
    memsize: 32587,
    first_number: 1,
    records: RecordArray::new(0x244A, 20, CHANNELS),
    fields: ChannelFields {
        freq: FreqField::Bcd {
            field: BcdField::new(2, 3, Endianness::Big),
            step_hz: 1000,
        },
        offset: FreqField::Bcd {
            field: BcdField::new(12, 3, Endianness::Big),
            step_hz: 1000,
        },
        name: NameField {
            offset: 6,
            len: 6,
            charset: Charset::Table(CHARSET),
            terminator: Some(0xFF),
            nonblank_marker: Some(0x80),
        },
        rtone: EnumField {
            bits: BitField::new(15, 0, 6),
            table: Lookup::new("tone", &TONES),
        },
        ctone: None,
        dtcs: EnumField {
            bits: BitField::new(16, 0, 7),
            table: Lookup::new("dcs", &DTCS_CODES),
        },
        dtcs_polarity: None,
        tmode: EnumField {
            bits: BitField::new(5, 0, 2),
            table: Lookup::new("tmode", TMODES),
        },
        duplex: EnumField {
            bits: BitField::new(1, 4, 2),
            table: Lookup::new("duplex", DUPLEX),
        },
        mode: EnumField {
            bits: BitField::new(1, 6, 2),
            table: Lookup::new("mode", MODES),
        },
        tuning_step: EnumField {
            bits: BitField::new(1, 0, 4),
            table: Lookup::new("tune_step", STEPS),
        },
        power: None,
    },
    validity: Validity {
        used: UsedRule::Conjunction {
            valid: FlagBitmap::paired_nibble(FLAGS, CHANNELS, 1),
            masked: FlagBitmap::paired_nibble(FLAGS, CHANNELS, 0),
        },
        skip: FlagBitmap::paired_nibble(FLAGS, CHANNELS, 2),
        pskip: FlagBitmap::paired_nibble(FLAGS, CHANNELS, 3),
    },
    init: RecordInit::DefaultFillOnAllocate(NEW_SLOT),
    banks: None,
    checksum: Some(ChecksumSpec {
        start: 0x0000,
        end: 0x7F4A,
        at: 0x7F4A,
    }),
    clone: CloneParams::Yaesu {
        model_id: b"AH028",
        baud_rate: 19200,
        block_lengths: &[10, 32577],
        block_size: 8,
    },
    valid_bands: &[(500_000, 999_000_000)],
    can_odd_split: true,
};
