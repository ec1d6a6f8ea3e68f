//! Typed catalog entries.
//!
//! A catalog row is either a liquid stock at a known concentration or a dry
//! powder weighed out by molar mass or mass/volume. The two shapes share the
//! [`Reagent`] capability: given a target concentration and a final volume,
//! say how much of this reagent goes in.

use crate::{
    error::BufferError,
    units::{Concentration, ConcentrationKind},
};
use buffer_schemas::stock::StockRecord;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    StockSolution,
    Powder,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::StockSolution => "stock_solution",
            SourceType::Powder => "powder",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one target asks of one reagent, in base units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Addition {
    /// Liters of stock to pipette in.
    Volume { liters: f64 },
    /// Grams of powder to weigh out. `purity_fraction` is set when the mass
    /// was inflated to make up for an impure lot.
    Mass {
        grams: f64,
        purity_fraction: Option<f64>,
    },
}

pub trait Reagent {
    fn name(&self) -> &str;
    fn notes(&self) -> &str;
    fn source_type(&self) -> SourceType;

    /// Amount of this reagent needed to reach `target` in `final_volume_l` liters.
    fn prepare(
        &self,
        target: &Concentration,
        final_volume_l: f64,
    ) -> Result<Addition, BufferError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockSolution {
    pub name: String,
    pub concentration: Concentration,
    pub solvent: String,
    pub notes: String,
}

impl StockSolution {
    pub fn new(name: impl Into<String>, concentration: Concentration) -> Self {
        Self {
            name: name.into(),
            concentration,
            solvent: String::new(),
            notes: String::new(),
        }
    }
}

impl Reagent for StockSolution {
    fn name(&self) -> &str {
        &self.name
    }

    fn notes(&self) -> &str {
        &self.notes
    }

    fn source_type(&self) -> SourceType {
        SourceType::StockSolution
    }

    fn prepare(
        &self,
        target: &Concentration,
        final_volume_l: f64,
    ) -> Result<Addition, BufferError> {
        let stock = &self.concentration;
        if target.kind() != stock.kind() {
            return Err(BufferError::ConcentrationMismatch {
                name: self.name.clone(),
                target_kind: target.kind(),
                target_unit: target.unit().to_string(),
                stock_kind: stock.kind(),
                stock_unit: stock.unit().to_string(),
            });
        }

        let stock_base = stock.to_base();
        if !(stock_base.is_finite() && stock_base > 0.0) {
            return Err(BufferError::InvalidStockConcentration {
                name: self.name.clone(),
                value: stock.value(),
                unit: stock.unit().to_string(),
            });
        }

        // C1 * V1 = C2 * V2
        let liters = (target.to_base() / stock_base) * final_volume_l;
        Ok(Addition::Volume { liters })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Powder {
    pub name: String,
    /// Only needed for molar targets.
    pub molar_mass_g_per_mol: Option<f64>,
    pub purity_fraction: f64,
    pub solvent: String,
    pub notes: String,
}

impl Powder {
    pub fn new(name: impl Into<String>, molar_mass_g_per_mol: Option<f64>) -> Self {
        Self {
            name: name.into(),
            molar_mass_g_per_mol,
            purity_fraction: 1.0,
            solvent: String::new(),
            notes: String::new(),
        }
    }

    pub fn with_purity(mut self, purity_fraction: f64) -> Result<Self, BufferError> {
        validate_purity(&self.name, purity_fraction)?;
        self.purity_fraction = purity_fraction;
        Ok(self)
    }
}

impl Reagent for Powder {
    fn name(&self) -> &str {
        &self.name
    }

    fn notes(&self) -> &str {
        &self.notes
    }

    fn source_type(&self) -> SourceType {
        SourceType::Powder
    }

    fn prepare(
        &self,
        target: &Concentration,
        final_volume_l: f64,
    ) -> Result<Addition, BufferError> {
        let raw_grams = match target.kind() {
            ConcentrationKind::VolumeFraction => {
                return Err(BufferError::VolumeFractionPowder {
                    name: self.name.clone(),
                    unit: target.unit().to_string(),
                });
            }
            ConcentrationKind::MassVolume => target.to_base() * final_volume_l,
            ConcentrationKind::Molar => {
                let molar_mass = self
                    .molar_mass_g_per_mol
                    .filter(|mw| mw.is_finite() && *mw > 0.0)
                    .ok_or_else(|| BufferError::MissingMolarMass(self.name.clone()))?;
                let moles = target.to_base() * final_volume_l;
                moles * molar_mass
            }
        };

        validate_purity(&self.name, self.purity_fraction)?;
        if self.purity_fraction < 1.0 {
            return Ok(Addition::Mass {
                grams: raw_grams / self.purity_fraction,
                purity_fraction: Some(self.purity_fraction),
            });
        }
        Ok(Addition::Mass {
            grams: raw_grams,
            purity_fraction: None,
        })
    }
}

fn validate_purity(name: &str, purity_fraction: f64) -> Result<(), BufferError> {
    // Written so that NaN is rejected too.
    if !(purity_fraction > 0.0 && purity_fraction <= 1.0) {
        return Err(BufferError::InvalidPurity {
            name: name.to_string(),
            value: purity_fraction,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum StockItem {
    Solution(StockSolution),
    Powder(Powder),
}

impl StockItem {
    fn as_reagent(&self) -> &dyn Reagent {
        match self {
            StockItem::Solution(solution) => solution,
            StockItem::Powder(powder) => powder,
        }
    }
}

impl Reagent for StockItem {
    fn name(&self) -> &str {
        self.as_reagent().name()
    }

    fn notes(&self) -> &str {
        self.as_reagent().notes()
    }

    fn source_type(&self) -> SourceType {
        self.as_reagent().source_type()
    }

    fn prepare(
        &self,
        target: &Concentration,
        final_volume_l: f64,
    ) -> Result<Addition, BufferError> {
        self.as_reagent().prepare(target, final_volume_l)
    }
}

impl From<StockSolution> for StockItem {
    fn from(solution: StockSolution) -> Self {
        StockItem::Solution(solution)
    }
}

impl From<Powder> for StockItem {
    fn from(powder: Powder) -> Self {
        StockItem::Powder(powder)
    }
}

impl TryFrom<StockRecord> for StockItem {
    type Error = BufferError;

    fn try_from(record: StockRecord) -> Result<Self, Self::Error> {
        let name = record.name.trim().to_string();
        let solvent = trimmed(record.solvent);
        let notes = trimmed(record.notes);

        match record.stock_type.trim().to_lowercase().as_str() {
            "stock_solution" => {
                let unit = trimmed(record.concentration_unit);
                let value = match record.concentration_value {
                    Some(value) if !unit.is_empty() => value,
                    _ => return Err(BufferError::MissingConcentration(name)),
                };
                let concentration = Concentration::parse(value, &unit)?;
                Ok(StockItem::Solution(StockSolution {
                    name,
                    concentration,
                    solvent,
                    notes,
                }))
            }
            "powder" => {
                let purity_fraction = record.purity_fraction.unwrap_or(1.0);
                validate_purity(&name, purity_fraction)?;
                Ok(StockItem::Powder(Powder {
                    name,
                    molar_mass_g_per_mol: record.mw_g_per_mol,
                    purity_fraction,
                    solvent,
                    notes,
                }))
            }
            _ => Err(BufferError::UnknownStockType {
                name,
                stock_type: record.stock_type,
            }),
        }
    }
}

fn trimmed(field: Option<String>) -> String {
    field.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Stock items keyed by name.
pub type Catalog = HashMap<String, StockItem>;

/// Builds the name-keyed catalog. A later entry with the same name replaces an
/// earlier one.
pub fn catalog_from_items(items: impl IntoIterator<Item = StockItem>) -> Catalog {
    let mut catalog = Catalog::new();
    for item in items {
        let name = item.name().to_string();
        if catalog.insert(name.clone(), item).is_some() {
            log::warn!("Duplicate stock '{}' in catalog; keeping the later entry", name);
        }
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conc(value: f64, unit: &str) -> Concentration {
        Concentration::parse(value, unit).unwrap()
    }

    #[test]
    fn solution_dilutes_proportionally() {
        let tris = StockSolution::new("Tris-HCl", conc(1.0, "M"));
        let Addition::Volume { liters } = tris.prepare(&conc(50.0, "mM"), 0.1).unwrap() else {
            panic!("stock solutions add volume");
        };
        assert!((liters - 0.005).abs() < 1e-15);
    }

    #[test]
    fn solution_rejects_zero_or_non_finite_concentration() {
        for value in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let broken = StockSolution::new("Tris-HCl", conc(value, "M"));
            let err = broken.prepare(&conc(50.0, "mM"), 0.1).unwrap_err();
            assert!(
                matches!(err, BufferError::InvalidStockConcentration { .. }),
                "{value}: {err}"
            );
            assert!(err.to_string().contains("'Tris-HCl'"));
        }
    }

    #[test]
    fn powder_massvol_ignores_molar_mass() {
        let bsa = Powder::new("BSA", None);
        let addition = bsa.prepare(&conc(2.0, "mg/mL"), 0.05).unwrap();
        assert_eq!(
            addition,
            Addition::Mass {
                grams: 0.1,
                purity_fraction: None
            }
        );
    }

    #[test]
    fn powder_molar_requires_positive_molar_mass() {
        for mw in [None, Some(0.0), Some(-58.44), Some(f64::NAN)] {
            let nacl = Powder::new("NaCl", mw);
            let err = nacl.prepare(&conc(150.0, "mM"), 0.1).unwrap_err();
            assert!(matches!(err, BufferError::MissingMolarMass(ref name) if name == "NaCl"));
        }
    }

    #[test]
    fn powder_reports_purity_adjustment() {
        let nacl = Powder::new("NaCl", Some(58.44)).with_purity(0.5).unwrap();
        let addition = nacl.prepare(&conc(1.0, "M"), 1.0).unwrap();
        let Addition::Mass { grams, purity_fraction } = addition else {
            panic!("powders add mass");
        };
        assert!((grams - 116.88).abs() < 1e-9);
        assert_eq!(purity_fraction, Some(0.5));
    }

    #[test]
    fn with_purity_rejects_out_of_range() {
        for purity in [0.0, -0.1, 1.01, f64::NAN] {
            assert!(Powder::new("NaCl", Some(58.44)).with_purity(purity).is_err());
        }
    }

    #[test]
    fn record_with_unknown_type_is_rejected() {
        let mut record = StockRecord::powder("NaCl", Some(58.44), None);
        record.stock_type = "liquid".to_string();
        let err = StockItem::try_from(record).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid type 'liquid' for 'NaCl'. Use 'stock_solution' or 'powder'."
        );
    }

    #[test]
    fn record_type_is_case_insensitive_and_fields_are_trimmed() {
        let mut record = StockRecord::stock_solution(" BSA ", 10.0, "mg/mL");
        record.stock_type = "Stock_Solution".to_string();
        record.notes = Some("  keep on ice ".to_string());
        let item = StockItem::try_from(record).unwrap();
        assert_eq!(item.name(), "BSA");
        assert_eq!(item.notes(), "keep on ice");
        assert_eq!(item.source_type(), SourceType::StockSolution);
    }

    #[test]
    fn solution_record_requires_value_and_unit() {
        let mut record = StockRecord::stock_solution("BSA", 10.0, "mg/mL");
        record.concentration_unit = Some("  ".to_string());
        assert!(matches!(
            StockItem::try_from(record),
            Err(BufferError::MissingConcentration(_))
        ));

        let mut record = StockRecord::stock_solution("BSA", 10.0, "mg/mL");
        record.concentration_value = None;
        assert!(matches!(
            StockItem::try_from(record),
            Err(BufferError::MissingConcentration(_))
        ));
    }

    #[test]
    fn powder_record_defaults_purity_and_validates_range() {
        let item = StockItem::try_from(StockRecord::powder("NaCl", Some(58.44), None)).unwrap();
        let StockItem::Powder(powder) = item else {
            panic!("expected powder");
        };
        assert_eq!(powder.purity_fraction, 1.0);

        let record = StockRecord::powder("NaCl", Some(58.44), Some(1.5));
        let err = StockItem::try_from(record).unwrap_err();
        assert!(matches!(err, BufferError::InvalidPurity { value, .. } if value == 1.5));
    }

    #[test]
    fn later_duplicate_replaces_earlier() {
        let catalog = catalog_from_items([
            StockItem::from(Powder::new("NaCl", Some(58.44))),
            StockItem::from(Powder::new("NaCl", Some(58.5))),
        ]);
        assert_eq!(catalog.len(), 1);
        let StockItem::Powder(powder) = &catalog["NaCl"] else {
            panic!("expected powder");
        };
        assert_eq!(powder.molar_mass_g_per_mol, Some(58.5));
    }
}
