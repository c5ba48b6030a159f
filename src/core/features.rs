// Radio feature flags and capabilities
// Reference: chirp/chirp_common.py lines 891-1211

use super::constants::*;
use super::memory::Memory;
use super::power::PowerLevel;
use serde::{Deserialize, Serialize};

/// Radio feature flags describing what a radio supports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioFeatures {
    pub has_bank_index: bool,
    pub has_dtcs: bool,
    pub has_dtcs_polarity: bool,
    pub has_mode: bool,
    pub has_offset: bool,
    pub has_name: bool,
    pub has_bank: bool,
    pub has_bank_names: bool,
    pub has_tuning_step: bool,
    pub has_ctone: bool,
    pub can_odd_split: bool,
    pub can_delete: bool,

    pub valid_modes: Vec<String>,
    pub valid_tmodes: Vec<String>,
    pub valid_duplexes: Vec<String>,
    pub valid_tuning_steps: Vec<f32>,
    pub valid_bands: Vec<(u64, u64)>, // (low_hz, high_hz) pairs
    pub valid_skips: Vec<String>,
    pub valid_power_levels: Vec<PowerLevel>,
    pub valid_characters: String,
    pub valid_name_length: usize,
    pub valid_tones: Vec<f32>,
    pub valid_dtcs_pols: Vec<String>,
    pub valid_dtcs_codes: Vec<u16>,

    /// Memory bounds (min, max), inclusive
    pub memory_bounds: (u32, u32),
}

impl Default for RadioFeatures {
    fn default() -> Self {
        Self {
            has_bank_index: false,
            has_dtcs: true,
            has_dtcs_polarity: true,
            has_mode: true,
            has_offset: true,
            has_name: true,
            has_bank: true,
            has_bank_names: false,
            has_tuning_step: true,
            has_ctone: true,
            can_odd_split: false,
            can_delete: true,

            valid_modes: vec!["FM".to_string()],
            valid_tmodes: Vec::new(),
            valid_duplexes: vec!["".to_string(), "+".to_string(), "-".to_string()],
            valid_tuning_steps: Vec::new(),
            valid_bands: Vec::new(),
            valid_skips: vec!["".to_string(), "S".to_string()],
            valid_power_levels: Vec::new(),
            valid_characters: CHARSET_UPPER_NUMERIC.to_string(),
            valid_name_length: NAME_LENGTH,
            valid_tones: TONES.to_vec(),
            valid_dtcs_pols: DTCS_POLARITIES.iter().map(|s| s.to_string()).collect(),
            valid_dtcs_codes: DTCS_CODES.to_vec(),
            memory_bounds: (0, 1),
        }
    }
}

/// Advisory finding about a memory that the image can still store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory(pub String);

impl RadioFeatures {
    /// Whether `number` lies inside `memory_bounds`
    pub fn in_bounds(&self, number: u32) -> bool {
        let (lo, hi) = self.memory_bounds;
        (lo..=hi).contains(&number)
    }

    /// Number of channel slots
    pub fn channel_count(&self) -> usize {
        let (lo, hi) = self.memory_bounds;
        (hi - lo + 1) as usize
    }

    /// Concise string representation of valid bands
    pub fn concise_bands(&self) -> String {
        let short = |hz: u64| {
            Memory::format_freq(hz)
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_string()
        };
        self.valid_bands
            .iter()
            .map(|(lo, hi)| format!("{}-{}MHz", short(*lo), short(*hi)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn in_band(&self, freq: u64) -> bool {
        self.valid_bands.is_empty()
            || self
                .valid_bands
                .iter()
                .any(|(lo, hi)| freq >= *lo && freq < *hi)
    }

    /// Check the parts of a memory the radio may refuse to use even though the
    /// image can hold them: receive and transmit frequency against the bands.
    pub fn advise(&self, mem: &Memory) -> Vec<Advisory> {
        let mut msgs = Vec::new();
        if mem.empty {
            return msgs;
        }

        if !self.in_band(mem.freq) {
            msgs.push(Advisory(format!(
                "Frequency {} is out of supported ranges {}",
                Memory::format_freq(mem.freq),
                self.concise_bands()
            )));
        }

        let tx_freq = match mem.duplex.as_str() {
            "split" => Some(mem.offset),
            "-" => Some(mem.freq.saturating_sub(mem.offset)),
            "+" => Some(mem.freq + mem.offset),
            _ => None,
        };
        if let Some(tx) = tx_freq {
            if !self.in_band(tx) {
                msgs.push(Advisory(format!(
                    "TX freq {} is out of supported range",
                    Memory::format_freq(tx)
                )));
            }
        }

        msgs
    }
}
