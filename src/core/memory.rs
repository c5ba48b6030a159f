// Memory structure representing a single radio memory channel
// Reference: chirp/chirp_common.py lines 280-645

use super::power::PowerLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid skip value: {0}")]
    InvalidSkip(String),
}

pub type Result<T> = std::result::Result<T, MemoryError>;

/// Scan behaviour of a channel. A channel is never both skipped and
/// priority-skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Skip {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "S")]
    Skip,
    #[serde(rename = "P")]
    PrioritySkip,
}

impl Skip {
    pub const ALL: [Skip; 3] = [Skip::None, Skip::Skip, Skip::PrioritySkip];

    pub fn as_str(&self) -> &'static str {
        match self {
            Skip::None => "",
            Skip::Skip => "S",
            Skip::PrioritySkip => "P",
        }
    }

    /// Resolve the two scan bits of a channel; priority-skip wins when both are set
    pub fn from_bits(skip: bool, pskip: bool) -> Self {
        if pskip {
            Skip::PrioritySkip
        } else if skip {
            Skip::Skip
        } else {
            Skip::None
        }
    }
}

impl FromStr for Skip {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" => Ok(Skip::None),
            "S" => Ok(Skip::Skip),
            "P" => Ok(Skip::PrioritySkip),
            other => Err(MemoryError::InvalidSkip(other.to_string())),
        }
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bank membership of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSlot {
    pub bank: u8,
    pub index: u8,
}

/// A single radio memory channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Memory channel number
    pub number: u32,

    /// Whether this memory is empty. No other field is meaningful when set.
    pub empty: bool,

    /// Frequency in Hz
    pub freq: u64,

    /// Offset frequency in Hz (transmit frequency when duplex is "split")
    pub offset: u64,

    /// Channel name
    pub name: String,

    /// Tone mode ("", "Tone", "TSQL", "DTCS")
    pub tmode: String,

    /// Transmit tone (CTCSS) in Hz
    pub rtone: f32,

    /// Receive tone (CTCSS) in Hz
    pub ctone: f32,

    /// DTCS code
    pub dtcs: u16,

    /// DTCS polarity ("NN", "NR", "RN", "RR")
    pub dtcs_polarity: String,

    /// Duplex ("", "+", "-", "split")
    pub duplex: String,

    /// Mode (e.g., "FM", "NFM", "AM", "WFM")
    pub mode: String,

    /// Tuning step in kHz
    pub tuning_step: f32,

    pub power: Option<PowerLevel>,

    pub skip: Skip,

    pub bank: Option<BankSlot>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Memory {
    /// Create a new memory with default values
    pub fn new(number: u32) -> Self {
        Self {
            number,
            empty: false,
            freq: 0,
            offset: 600_000,
            name: String::new(),
            tmode: String::new(),
            rtone: 88.5,
            ctone: 88.5,
            dtcs: 23,
            dtcs_polarity: "NN".to_string(),
            duplex: String::new(),
            mode: "FM".to_string(),
            tuning_step: 5.0,
            power: None,
            skip: Skip::None,
            bank: None,
        }
    }

    /// Create an empty memory
    pub fn new_empty(number: u32) -> Self {
        Self {
            empty: true,
            ..Self::new(number)
        }
    }

    /// Parse a frequency string and return Hz
    /// Supports formats: "146.520", "146.520 MHz", "146520 kHz"
    pub fn parse_freq(freqstr: &str) -> Result<u64> {
        let freqstr = freqstr.trim();
        let invalid = || MemoryError::InvalidFrequency(freqstr.to_string());

        if freqstr.is_empty() {
            return Ok(0);
        }

        if let Some(stripped) = freqstr.strip_suffix("MHz") {
            return Self::parse_freq(stripped);
        }

        if let Some(stripped) = freqstr.strip_suffix("kHz") {
            let khz: u64 = stripped.trim().parse().map_err(|_| invalid())?;
            return khz.checked_mul(1000).ok_or_else(invalid);
        }

        match freqstr.split_once('.') {
            Some((mhz, frac)) => {
                if frac.len() > 6 || frac.contains('.') {
                    return Err(invalid());
                }
                let mhz: u64 = if mhz.is_empty() {
                    0
                } else {
                    mhz.parse().map_err(|_| invalid())?
                };
                // Right-pad the fraction to Hz
                let hz: u64 = format!("{:0<6}", frac).parse().map_err(|_| invalid())?;
                mhz.checked_mul(1_000_000)
                    .and_then(|whole| whole.checked_add(hz))
                    .ok_or_else(invalid)
            }
            None => {
                let mhz: u64 = freqstr.parse().map_err(|_| invalid())?;
                mhz.checked_mul(1_000_000).ok_or_else(invalid)
            }
        }
    }

    /// Format frequency in Hz as a string (e.g., "146.520000")
    pub fn format_freq(freq: u64) -> String {
        format!("{}.{:06}", freq / 1_000_000, freq % 1_000_000)
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.empty {
            return write!(f, "Memory {}: (empty)", self.number);
        }

        let tenc = if self.tmode == "Tone" { "*" } else { " " };
        let tsql = if self.tmode == "TSQL" { "*" } else { " " };
        let dtcs = if self.tmode == "DTCS" { "*" } else { " " };
        let dup = if self.duplex.is_empty() {
            "/"
        } else {
            &self.duplex
        };

        write!(
            f,
            "Memory {}: {}{}{} {} ({}) r{:.1}{} c{:.1}{} d{:03}{}{} [{:.2}]",
            self.number,
            Self::format_freq(self.freq),
            dup,
            Self::format_freq(self.offset),
            self.mode,
            self.name,
            self.rtone,
            tenc,
            self.ctone,
            tsql,
            self.dtcs,
            dtcs,
            self.dtcs_polarity,
            self.tuning_step
        )?;

        if let Some(power) = &self.power {
            write!(f, " {}", power)?;
        }
        if self.skip != Skip::None {
            write!(f, " skip={}", self.skip)?;
        }
        if let Some(slot) = self.bank {
            write!(f, " bank={}/{}", slot.bank, slot.index)?;
        }
        Ok(())
    }
}
