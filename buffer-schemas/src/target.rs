use serde::{Deserialize, Serialize};

/// What the user wants in the final buffer, e.g. `Tris-HCl` at `50 mM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetComponent {
    /// Must match a catalog key exactly.
    pub name: String,
    pub final_value: f64,
    /// e.g. mM, uM, mg/mL, g/L, %
    pub final_unit: String,
}

impl TargetComponent {
    pub fn new(name: impl Into<String>, final_value: f64, final_unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            final_value,
            final_unit: final_unit.into(),
        }
    }
}
