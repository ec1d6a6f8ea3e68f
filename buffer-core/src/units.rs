//! Unit conversion for buffer quantities.
//!
//! Every quantity belongs to one [`UnitFamily`], and every family has a single
//! base unit (liters, grams, moles, molar, g/L, or a plain fraction). Values
//! only ever move between a unit and its family's base unit; nothing here
//! converts across families.
//!
//! Unit lookup ignores case and surrounding whitespace, and treats the micro
//! glyphs `µ` and `μ` as the letter `u`.

use crate::error::BufferError;
use serde::{Deserialize, Serialize};
use std::fmt;

const VOLUME_TO_L: &[(&str, f64)] = &[("l", 1.0), ("ml", 1e-3), ("ul", 1e-6), ("nl", 1e-9)];

const MASS_TO_G: &[(&str, f64)] = &[("g", 1.0), ("mg", 1e-3), ("ug", 1e-6), ("ng", 1e-9)];

const AMOUNT_TO_MOL: &[(&str, f64)] = &[
    ("mol", 1.0),
    ("mmol", 1e-3),
    ("umol", 1e-6),
    ("nmol", 1e-9),
    ("pmol", 1e-12),
];

const MOLAR_TO_M: &[(&str, f64)] = &[
    ("m", 1.0),
    ("mm", 1e-3),
    ("um", 1e-6),
    ("nm", 1e-9),
    ("pm", 1e-12),
];

// 1 mg/mL == 1 ug/uL == 1 g/L
const MASSVOL_TO_G_PER_L: &[(&str, f64)] = &[
    ("g/l", 1.0),
    ("mg/ml", 1.0),
    ("ug/ml", 1e-3),
    ("ng/ml", 1e-6),
    ("mg/l", 1e-3),
    ("ug/ul", 1.0),
];

// 1 % (v/v) == 0.01
const VOLVOL_TO_FRACTION: &[(&str, f64)] = &[("%", 0.01), ("v/v%", 0.01)];

/// Lowercased, trimmed unit with micro glyphs folded to `u`.
pub fn normalize_unit(unit: &str) -> String {
    unit.trim().replace(['µ', 'μ'], "u").to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitFamily {
    Volume,
    Mass,
    Amount,
    Molar,
    MassVolume,
    VolumeFraction,
}

impl UnitFamily {
    pub const ALL: [UnitFamily; 6] = [
        UnitFamily::Volume,
        UnitFamily::Mass,
        UnitFamily::Amount,
        UnitFamily::Molar,
        UnitFamily::MassVolume,
        UnitFamily::VolumeFraction,
    ];

    fn table(self) -> &'static [(&'static str, f64)] {
        match self {
            UnitFamily::Volume => VOLUME_TO_L,
            UnitFamily::Mass => MASS_TO_G,
            UnitFamily::Amount => AMOUNT_TO_MOL,
            UnitFamily::Molar => MOLAR_TO_M,
            UnitFamily::MassVolume => MASSVOL_TO_G_PER_L,
            UnitFamily::VolumeFraction => VOLVOL_TO_FRACTION,
        }
    }

    pub fn base_unit(self) -> &'static str {
        match self {
            UnitFamily::Volume => "L",
            UnitFamily::Mass => "g",
            UnitFamily::Amount => "mol",
            UnitFamily::Molar => "M",
            UnitFamily::MassVolume => "g/L",
            UnitFamily::VolumeFraction => "fraction",
        }
    }

    /// The normalized unit names this family accepts.
    pub fn units(self) -> impl Iterator<Item = &'static str> {
        self.table().iter().map(|(name, _)| *name)
    }

    /// Whether `unit` is in this family's table.
    pub fn recognizes(self, unit: &str) -> bool {
        self.lookup(&normalize_unit(unit)).is_some()
    }

    fn lookup(self, normalized: &str) -> Option<f64> {
        self.table()
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, factor)| *factor)
    }

    /// Multiplier taking one `unit` to the family's base unit.
    pub fn factor(self, unit: &str) -> Result<f64, BufferError> {
        self.lookup(&normalize_unit(unit))
            .ok_or_else(|| BufferError::UnsupportedUnit {
                family: self,
                unit: unit.to_string(),
            })
    }

    pub fn to_base(self, value: f64, unit: &str) -> Result<f64, BufferError> {
        Ok(value * self.factor(unit)?)
    }

    pub fn from_base(self, base_value: f64, unit: &str) -> Result<f64, BufferError> {
        Ok(base_value / self.factor(unit)?)
    }
}

impl fmt::Display for UnitFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UnitFamily::Volume => "volume",
            UnitFamily::Mass => "mass",
            UnitFamily::Amount => "amount",
            UnitFamily::Molar => "molar",
            UnitFamily::MassVolume => "mass/vol",
            UnitFamily::VolumeFraction => "v/v",
        };
        f.write_str(label)
    }
}

pub fn to_liters(value: f64, unit: &str) -> Result<f64, BufferError> {
    UnitFamily::Volume.to_base(value, unit)
}

pub fn from_liters(liters: f64, unit: &str) -> Result<f64, BufferError> {
    UnitFamily::Volume.from_base(liters, unit)
}

pub fn to_grams(value: f64, unit: &str) -> Result<f64, BufferError> {
    UnitFamily::Mass.to_base(value, unit)
}

pub fn from_grams(grams: f64, unit: &str) -> Result<f64, BufferError> {
    UnitFamily::Mass.from_base(grams, unit)
}

pub fn to_moles(value: f64, unit: &str) -> Result<f64, BufferError> {
    UnitFamily::Amount.to_base(value, unit)
}

pub fn from_moles(moles: f64, unit: &str) -> Result<f64, BufferError> {
    UnitFamily::Amount.from_base(moles, unit)
}

/// The three ways a concentration can be expressed.
///
/// Classification tries molar, then mass/volume, then volume/volume. The
/// tables are disjoint, so the order only matters for which error is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcentrationKind {
    #[serde(rename = "molar")]
    Molar,
    #[serde(rename = "massvol")]
    MassVolume,
    #[serde(rename = "volvol")]
    VolumeFraction,
}

impl ConcentrationKind {
    pub const ALL: [ConcentrationKind; 3] = [
        ConcentrationKind::Molar,
        ConcentrationKind::MassVolume,
        ConcentrationKind::VolumeFraction,
    ];

    pub fn family(self) -> UnitFamily {
        match self {
            ConcentrationKind::Molar => UnitFamily::Molar,
            ConcentrationKind::MassVolume => UnitFamily::MassVolume,
            ConcentrationKind::VolumeFraction => UnitFamily::VolumeFraction,
        }
    }

    /// Finds the concentration family of `unit`, if any.
    pub fn classify(unit: &str) -> Option<Self> {
        let normalized = normalize_unit(unit);
        Self::ALL
            .into_iter()
            .find(|kind| kind.family().lookup(&normalized).is_some())
    }
}

impl fmt::Display for ConcentrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.family(), f)
    }
}

/// A classified concentration. The value and unit are kept as given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Concentration {
    kind: ConcentrationKind,
    value: f64,
    unit: String,
    #[serde(skip)]
    factor: f64,
}

impl Concentration {
    pub fn parse(value: f64, unit: &str) -> Result<Self, BufferError> {
        let kind = ConcentrationKind::classify(unit)
            .ok_or_else(|| BufferError::UnrecognizedConcentrationUnit(unit.to_string()))?;
        let factor = kind.family().factor(unit)?;
        Ok(Self {
            kind,
            value,
            unit: unit.to_string(),
            factor,
        })
    }

    pub fn kind(&self) -> ConcentrationKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Value in the family's base unit (M, g/L or fraction).
    pub fn to_base(&self) -> f64 {
        self.value * self.factor
    }

    pub fn as_molar(&self) -> Result<f64, BufferError> {
        self.base_if(ConcentrationKind::Molar)
    }

    pub fn as_grams_per_liter(&self) -> Result<f64, BufferError> {
        self.base_if(ConcentrationKind::MassVolume)
    }

    pub fn as_fraction(&self) -> Result<f64, BufferError> {
        self.base_if(ConcentrationKind::VolumeFraction)
    }

    fn base_if(&self, expected: ConcentrationKind) -> Result<f64, BufferError> {
        if self.kind != expected {
            return Err(BufferError::ConcentrationKindMismatch {
                expected,
                actual: self.kind,
            });
        }
        Ok(self.to_base())
    }
}

impl fmt::Display for Concentration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
