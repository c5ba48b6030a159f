// Power level abstraction
// Reference: chirp/chirp_common.py lines 178-241

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PowerError {
    #[error("Invalid power specification: {0}")]
    InvalidFormat(String),
}

lazy_static! {
    static ref POWER_RE: Regex =
        Regex::new(r"^\s*([0-9]*\.?[0-9]+)\s*([Ww]?)\s*$").expect("power regex is valid");
}

/// A power level supported by a radio
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PowerLevel {
    /// Display label (e.g., "High", "5W")
    label: String,
    /// Power in dBm
    dbm: f32,
}

impl PowerLevel {
    /// Create a new power level from watts
    pub fn from_watts(label: impl Into<String>, watts: f32) -> Self {
        Self {
            label: label.into(),
            dbm: watts_to_dbm(watts),
        }
    }

    /// Create an auto-named power level from watts (e.g., "5.0W", "10W")
    pub fn auto_named(watts: f32) -> Self {
        let label = if watts >= 10.0 {
            format!("{}W", watts as i32)
        } else {
            format!("{:.1}W", watts)
        };
        Self::from_watts(label, watts)
    }

    pub fn watts(&self) -> f32 {
        dbm_to_watts(self.dbm)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// True when `other` names this level, by label or by the same wattage
    pub fn matches(&self, other: &PowerLevel) -> bool {
        self.label.eq_ignore_ascii_case(&other.label) || (self.dbm - other.dbm).abs() < 0.01
    }

    /// Parse a power string ("5", "5W", "0.5W")
    pub fn parse(powerstr: &str) -> Result<Self, PowerError> {
        let caps = POWER_RE
            .captures(powerstr)
            .ok_or_else(|| PowerError::InvalidFormat(powerstr.to_string()))?;
        let watts: f32 = caps[1]
            .parse()
            .map_err(|_| PowerError::InvalidFormat(powerstr.to_string()))?;
        Ok(Self::auto_named(watts))
    }
}

impl fmt::Display for PowerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl PartialOrd for PowerLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.dbm.partial_cmp(&other.dbm)
    }
}

/// Convert watts to dBm
pub fn watts_to_dbm(watts: f32) -> f32 {
    10.0 * watts.log10() + 30.0
}

/// Convert dBm to watts, rounded to 0.1 W
pub fn dbm_to_watts(dbm: f32) -> f32 {
    (10.0_f32.powf(dbm / 10.0) / 1000.0 * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_conversions() {
        assert_eq!(watts_to_dbm(1.0), 30.0);
        assert!((dbm_to_watts(30.0) - 1.0).abs() < 0.01);
        assert!((dbm_to_watts(37.0) - 5.0).abs() < 0.1);
    }

    #[test]
    fn test_power_level_creation() {
        let p = PowerLevel::from_watts("High", 5.0);
        assert_eq!(p.label(), "High");
        assert!((p.watts() - 5.0).abs() < 0.1);

        assert_eq!(PowerLevel::auto_named(10.0).label(), "10W");
        assert_eq!(PowerLevel::auto_named(0.5).label(), "0.5W");
    }

    #[test]
    fn test_power_parse() {
        assert_eq!(PowerLevel::parse("5").unwrap().label(), "5.0W");
        assert_eq!(PowerLevel::parse(" 5W ").unwrap().label(), "5.0W");
        assert_eq!(PowerLevel::parse("0.5w").unwrap().label(), "0.5W");
        assert!(PowerLevel::parse("5 dBm").is_err());
        assert!(PowerLevel::parse("").is_err());
    }

    #[test]
    fn test_matches() {
        let high = PowerLevel::from_watts("High", 5.0);
        assert!(high.matches(&PowerLevel::parse("5W").unwrap()));
        assert!(high.matches(&PowerLevel::from_watts("high", 4.0)));
        assert!(!high.matches(&PowerLevel::from_watts("Low", 0.5)));
        assert!(PowerLevel::from_watts("Low", 0.5) < high);
    }
}
