// Icom IC-T70 memory layout
// Reference: chirp/ict70.py

use super::descriptor::*;
use super::tables::{Lookup, PowerSpec};
use crate::bitwise::{BitField, Endianness, FlagBitmap, RecordArray, UintField};
use crate::core::{DTCS_CODES, DTCS_POLARITIES, TONES};

const CHANNELS: usize = 300;

const TMODES: &[&str] = &["", "Tone", "TSQL", "TSQL", "DTCS", "DTCS"];
const DUPLEX: &[&str] = &["", "-", "+"];
const MODES: &[&str] = &["FM", "NFM"];
const TUNING_STEPS: &[f32] = &[5.0, 10.0, 12.5, 15.0, 20.0, 25.0, 30.0, 50.0, 100.0, 125.0, 200.0];
const POWER_LEVELS: &[PowerSpec] = &[
    PowerSpec { label: "High", watts: 5.0 },
    PowerSpec { label: "Low", watts: 0.5 },
    PowerSpec { label: "Mid", watts: 1.0 },
];

// struct {
//   u24 freq; ul16 offset; char name[6];
//   u8 unknown2:2, rtone:6;
//   u8 unknown3:2, ctone:6;
//   u8 unknown4:1, dtcs:7;
//   u8 tuning_step:4, narrow:1, unknown5:1, duplex:2;
//   u8 unknown6:1, power:2, dtcs_polarity:2, tmode:3;
// } memory[300];
pub static ICT70: ModelDescriptor = ModelDescriptor {
    vendor: "Icom",
    model: "IC-T70",
    memsize: 0x19E0,
    first_number: 0,
    records: RecordArray::new(0x0000, 16, CHANNELS),
    fields: ChannelFields {
        freq: FreqField::Linear {
            field: UintField::new(0, 3, Endianness::Big),
            step_hz: 5000,
        },
        offset: FreqField::Linear {
            field: UintField::new(3, 2, Endianness::Little),
            step_hz: 5000,
        },
        name: NameField {
            offset: 5,
            len: 6,
            charset: Charset::Ascii,
            terminator: None,
            nonblank_marker: None,
        },
        rtone: EnumField {
            bits: BitField::new(11, 0, 6),
            table: Lookup::new("rtone", &TONES),
        },
        ctone: Some(EnumField {
            bits: BitField::new(12, 0, 6),
            table: Lookup::new("ctone", &TONES),
        }),
        dtcs: EnumField {
            bits: BitField::new(13, 0, 7),
            table: Lookup::new("dtcs", &DTCS_CODES),
        },
        dtcs_polarity: Some(EnumField {
            bits: BitField::new(15, 3, 2),
            table: Lookup::new("dtcs_polarity", DTCS_POLARITIES),
        }),
        tmode: EnumField {
            bits: BitField::new(15, 0, 3),
            table: Lookup::new("tmode", TMODES),
        },
        duplex: EnumField {
            bits: BitField::new(14, 0, 2),
            table: Lookup::new("duplex", DUPLEX),
        },
        // The narrow bit
        mode: EnumField {
            bits: BitField::new(14, 3, 1),
            table: Lookup::new("mode", MODES),
        },
        tuning_step: EnumField {
            bits: BitField::new(14, 4, 4),
            table: Lookup::new("tuning_step", TUNING_STEPS),
        },
        power: Some(EnumField {
            bits: BitField::new(15, 5, 2),
            table: Lookup::new("power", POWER_LEVELS),
        }),
    },
    validity: Validity {
        used: UsedRule::InvertedBit(FlagBitmap::flat(0x12E0, CHANNELS)),
        skip: FlagBitmap::flat(0x1306, CHANNELS),
        pskip: FlagBitmap::flat(0x132C, CHANNELS),
    },
    init: RecordInit::ZeroEveryWrite,
    banks: Some(BankLayout {
        assignments: RecordArray::new(0x1360, 2, CHANNELS),
        names: RecordArray::new(0x16D0, 6, 26),
        unassigned: 0xFF,
        index_capacity: 256,
    }),
    checksum: None,
    clone: CloneParams::Icom {
        model_id: b"\x32\x53\x00\x01",
        end_frame: b"Icom Inc.CF",
        ranges: &[(0x0000, 0x19E0, 32)],
    },
    valid_bands: &[(136_000_000, 174_000_000), (400_000_000, 479_000_000)],
    can_odd_split: false,
};
