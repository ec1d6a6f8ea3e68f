use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw value paired with the unit string it was given in.
///
/// The unit is kept exactly as the caller wrote it; interpreting it is the
/// job of the unit conversion layer in `buffer-core`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement<T> {
    pub value: T,
    pub unit: String,
}

impl<T> Measurement<T> {
    pub fn new(value: T, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Measurement<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
