// Enumeration tables shared by decode and encode
// Reference: chirp/ict70.py and chirp/vx3.py (TMODES, DUPLEX, STEPS, ... lists)

use super::traits::{RadioError, RadioResult};
use crate::core::PowerLevel;
use std::fmt;

/// Ordered values indexed by a raw field.
///
/// Position is the raw value, so tables keep hardware order even when it is
/// not sorted, and may list a value twice. Encoding picks the first position.
#[derive(Debug, Clone, Copy)]
pub struct Lookup<T: 'static> {
    pub field: &'static str,
    pub values: &'static [T],
}

impl<T: PartialEq + fmt::Display> Lookup<T> {
    pub const fn new(field: &'static str, values: &'static [T]) -> Self {
        Self { field, values }
    }

    /// Domain value for a raw index read from channel `number`
    pub fn decode(&self, number: u32, raw: u8) -> RadioResult<&'static T> {
        self.values
            .get(usize::from(raw))
            .ok_or(RadioError::CorruptImage {
                number,
                field: self.field,
                raw: u32::from(raw),
            })
    }

    /// Raw index for `value`, checked before anything is written
    pub fn encode(&self, number: u32, value: &T) -> RadioResult<u8> {
        self.encode_by(number, value, |candidate| candidate == value)
    }

    /// Raw index of the first entry accepted by `pred`
    pub fn encode_by<D: fmt::Display + ?Sized>(
        &self,
        number: u32,
        shown: &D,
        pred: impl Fn(&T) -> bool,
    ) -> RadioResult<u8> {
        self.values
            .iter()
            .position(pred)
            .and_then(|i| u8::try_from(i).ok())
            .ok_or_else(|| RadioError::InvalidRecord {
                number,
                field: self.field,
                value: shown.to_string(),
            })
    }

    /// Domain values with duplicates removed, in table order
    pub fn distinct(&self) -> Vec<&'static T> {
        let mut out: Vec<&'static T> = Vec::new();
        for value in self.values {
            if !out.contains(&value) {
                out.push(value);
            }
        }
        out
    }
}

impl Lookup<&'static str> {
    /// Raw index for a borrowed string value
    pub fn encode_str(&self, number: u32, value: &str) -> RadioResult<u8> {
        self.encode_by(number, value, |candidate| *candidate == value)
    }
}

/// A power level as stored in a static table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSpec {
    pub label: &'static str,
    pub watts: f32,
}

impl PowerSpec {
    pub fn level(&self) -> PowerLevel {
        PowerLevel::from_watts(self.label, self.watts)
    }
}

impl fmt::Display for PowerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}
