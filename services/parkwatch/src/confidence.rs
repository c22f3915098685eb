//! Confidence score formatting and tiering
//!
//! Detection confidence reaches the client either as a fraction (`0.0..=1.0`)
//! or as a percentage (`0.0..=100.0`). [`Confidence`] carries the scale
//! explicitly and normalizes to a percentage exactly once. Untagged values go
//! through [`Confidence::from_raw`], which keeps the legacy heuristic: anything
//! `<= 1` is a fraction, anything larger is already a percentage.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Percentages strictly above this are `High`
pub const HIGH_THRESHOLD: f64 = 70.0;
/// Percentages at or above this (and not `High`) are `Medium`
pub const MEDIUM_THRESHOLD: f64 = 50.0;

/// Values within this distance of a tenth are treated as that tenth
const SNAP_TOLERANCE: f64 = 1e-9;
/// Magnitudes at or above this skip snapping and tie handling
const SNAP_LIMIT: f64 = 1e9;

/// Scale a confidence value was produced in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceScale {
    Fraction,
    Percent,
}

/// Coarse confidence classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "high"),
            ConfidenceLevel::Medium => write!(f, "medium"),
            ConfidenceLevel::Low => write!(f, "low"),
        }
    }
}

/// A confidence score tagged with its scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    value: f64,
    scale: ConfidenceScale,
}

impl Confidence {
    pub fn fraction(value: f64) -> Self {
        Self {
            value,
            scale: ConfidenceScale::Fraction,
        }
    }

    pub fn percent(value: f64) -> Self {
        Self {
            value,
            scale: ConfidenceScale::Percent,
        }
    }

    /// Tag an untagged value, guessing the scale from its magnitude
    pub fn from_raw(value: f64) -> Self {
        if value <= 1.0 {
            Self::fraction(value)
        } else {
            Self::percent(value)
        }
    }

    pub fn scale(&self) -> ConfidenceScale {
        self.scale
    }

    /// The score on the canonical 0-100 scale; non-finite input reads as 0
    pub fn percentage(&self) -> f64 {
        if !self.value.is_finite() {
            return 0.0;
        }
        let pct = match self.scale {
            ConfidenceScale::Fraction => self.value * 100.0,
            ConfidenceScale::Percent => self.value,
        };
        // 0.57 * 100.0 is 56.99999999999999; snap float noise onto the tenth
        if pct.abs() >= SNAP_LIMIT {
            return pct;
        }
        let tenths = (pct * 10.0).round();
        if (pct * 10.0 - tenths).abs() < SNAP_TOLERANCE * 10.0 {
            tenths / 10.0
        } else {
            pct
        }
    }

    /// One-decimal display string, e.g. `"75.6"`.
    ///
    /// Exact halves round away from zero, so `82.25` shows as `"82.3"`.
    pub fn display(&self) -> String {
        let pct = self.percentage();
        if pct.abs() < SNAP_LIMIT {
            let scaled = pct * 10.0;
            // mul_add yields the product's rounding error; zero means `scaled` is exact
            let exact = pct.mul_add(10.0, -scaled) == 0.0;
            if exact && scaled.fract().abs() == 0.5 {
                return format!("{:.1}", scaled.round() / 10.0);
            }
        }
        format!("{:.1}", pct)
    }

    pub fn level(&self) -> ConfidenceLevel {
        let pct = self.percentage();
        if pct > HIGH_THRESHOLD {
            ConfidenceLevel::High
        } else if pct >= MEDIUM_THRESHOLD {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.display())
    }
}

/// Format an untagged confidence value; absent values read as `"0.0"`
pub fn format_confidence(raw: Option<f64>) -> String {
    raw.map(|v| Confidence::from_raw(v).display())
        .unwrap_or_else(|| "0.0".to_string())
}

/// Tier an untagged confidence value; absent values are `Low`
pub fn confidence_level(raw: Option<f64>) -> ConfidenceLevel {
    raw.map(|v| Confidence::from_raw(v).level())
        .unwrap_or(ConfidenceLevel::Low)
}
