//! The raw shape of one catalog row, as it arrives from a spreadsheet export
//! or a YAML catalog file.
//!
//! Every field other than `name` and `stock_type` is optional here because
//! which ones are meaningful depends on the type. Typed validation happens when
//! `buffer-core` turns a record into a `StockItem`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StockRecord {
    pub name: String,
    /// `stock_solution` or `powder`. Left as free text so an unknown value can
    /// be reported with the reagent it belongs to.
    #[serde(rename = "type")]
    pub stock_type: String,

    // Stock solution fields
    #[serde(default)]
    pub concentration_value: Option<f64>,
    #[serde(default)]
    pub concentration_unit: Option<String>,

    // Powder fields
    #[serde(default)]
    pub mw_g_per_mol: Option<f64>,
    #[serde(default)]
    pub purity_fraction: Option<f64>,

    #[serde(default)]
    pub solvent: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl StockRecord {
    pub fn stock_solution(name: &str, value: f64, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            stock_type: "stock_solution".to_string(),
            concentration_value: Some(value),
            concentration_unit: Some(unit.to_string()),
            ..Self::default()
        }
    }

    pub fn powder(name: &str, mw_g_per_mol: Option<f64>, purity_fraction: Option<f64>) -> Self {
        Self {
            name: name.to_string(),
            stock_type: "powder".to_string(),
            mw_g_per_mol,
            purity_fraction,
            ..Self::default()
        }
    }
}
