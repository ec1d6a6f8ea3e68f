//! Recipe computation: targets in, line items and warnings out.

use crate::{
    error::BufferError,
    reagent::{Addition, Catalog, Reagent, SourceType},
    units::{self, Concentration, UnitFamily},
};
use buffer_schemas::{measurement::Measurement, target::TargetComponent};
use serde::Serialize;

pub const BRING_TO_VOLUME_NAME: &str = "Bring to final volume (solvent/buffer)";
pub const BRING_TO_VOLUME_NOTES: &str = "Add solvent/buffer to reach final volume.";

/// Units the recipe lines are reported in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputUnits {
    pub volume: String,
    pub mass: String,
}

impl Default for OutputUnits {
    fn default() -> Self {
        Self {
            volume: "uL".to_string(),
            mass: "mg".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineAmount {
    Volume(Measurement<f64>),
    Mass(Measurement<f64>),
}

/// What a line stands for: one requested reagent, or the closing top-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeStep {
    Reagent,
    BringToVolume,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeLine {
    pub name: String,
    pub source_type: SourceType,
    pub step: RecipeStep,
    pub amount: LineAmount,
    pub notes: String,
}

impl RecipeLine {
    pub fn volume(&self) -> Option<&Measurement<f64>> {
        match &self.amount {
            LineAmount::Volume(volume) => Some(volume),
            LineAmount::Mass(_) => None,
        }
    }

    pub fn mass(&self) -> Option<&Measurement<f64>> {
        match &self.amount {
            LineAmount::Mass(mass) => Some(mass),
            LineAmount::Volume(_) => None,
        }
    }

    pub fn is_bring_to_volume(&self) -> bool {
        self.step == RecipeStep::BringToVolume
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeResult {
    /// Echoed back exactly as requested.
    pub final_volume: Measurement<f64>,
    pub lines: Vec<RecipeLine>,
    pub warnings: Vec<String>,
}

impl RecipeResult {
    /// The first reagent line for `name`. Never the bring-to-volume step.
    pub fn line(&self, name: &str) -> Option<&RecipeLine> {
        self.lines
            .iter()
            .find(|line| !line.is_bring_to_volume() && line.name == name)
    }

    pub fn bring_to_volume(&self) -> Option<&RecipeLine> {
        self.lines.iter().find(|line| line.is_bring_to_volume())
    }
}

/// A fluent builder for a `RecipeEngine`.
pub struct RecipeBuilder<'a> {
    catalog: &'a Catalog,
    targets: Vec<TargetComponent>,
    final_volume: Option<Measurement<f64>>,
    output: OutputUnits,
}

impl<'a> RecipeBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            targets: Vec::new(),
            final_volume: None,
            output: OutputUnits::default(),
        }
    }

    /// Appends `targets`, keeping their order.
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = TargetComponent>) -> Self {
        self.targets.extend(targets);
        self
    }

    /// Appends a single target, e.g. `("NaCl", 150.0, "mM")`.
    pub fn with_target(mut self, name: &str, value: f64, unit: &str) -> Self {
        self.targets.push(TargetComponent::new(name, value, unit));
        self
    }

    /// Sets the volume the buffer is made up to.
    pub fn with_final_volume(mut self, value: f64, unit: &str) -> Self {
        self.final_volume = Some(Measurement::new(value, unit));
        self
    }

    /// Sets the unit volume lines are reported in. Defaults to `uL`.
    pub fn with_output_volume_unit(mut self, unit: &str) -> Self {
        self.output.volume = unit.to_string();
        self
    }

    /// Sets the unit mass lines are reported in. Defaults to `mg`.
    pub fn with_output_mass_unit(mut self, unit: &str) -> Self {
        self.output.mass = unit.to_string();
        self
    }

    /// Replaces both output units at once.
    pub fn with_output_units(mut self, output: OutputUnits) -> Self {
        self.output = output;
        self
    }

    /// Checks every unit that does not depend on a target and returns a ready
    /// engine.
    ///
    /// # Errors
    ///
    /// Fails if no final volume was given, if it is not a finite number, or
    /// if the final volume, output volume or output mass unit is not in its
    /// family.
    pub fn build(self) -> Result<RecipeEngine<'a>, BufferError> {
        let final_volume = self.final_volume.ok_or(BufferError::FinalVolumeNotDefined)?;
        let final_volume_l = units::to_liters(final_volume.value, &final_volume.unit)?;
        if !final_volume_l.is_finite() {
            return Err(BufferError::InvalidFinalVolume {
                value: final_volume.value,
                unit: final_volume.unit,
            });
        }
        UnitFamily::Volume.factor(&self.output.volume)?;
        UnitFamily::Mass.factor(&self.output.mass)?;

        Ok(RecipeEngine {
            catalog: self.catalog,
            targets: self.targets,
            final_volume,
            final_volume_l,
            output: self.output,
        })
    }
}

pub struct RecipeEngine<'a> {
    catalog: &'a Catalog,
    targets: Vec<TargetComponent>,
    final_volume: Measurement<f64>,
    final_volume_l: f64,
    output: OutputUnits,
}

impl RecipeEngine<'_> {
    pub fn compute(&self) -> Result<RecipeResult, BufferError> {
        let mut lines = Vec::with_capacity(self.targets.len() + 1);
        let mut warnings = Vec::new();
        let mut total_stock_l = 0.0;

        for target in &self.targets {
            let item = self
                .catalog
                .get(&target.name)
                .ok_or_else(|| BufferError::ComponentNotFound(target.name.clone()))?;
            let wanted = Concentration::parse(target.final_value, &target.final_unit)
                .map_err(|_| BufferError::UnsupportedTargetUnit {
                    name: target.name.clone(),
                    unit: target.final_unit.clone(),
                })?;
            if !target.final_value.is_finite() {
                return Err(BufferError::InvalidTargetValue {
                    name: target.name.clone(),
                    value: target.final_value,
                });
            }

            let amount = match item.prepare(&wanted, self.final_volume_l)? {
                Addition::Volume { liters } => {
                    total_stock_l += liters;
                    LineAmount::Volume(self.volume_in_output_unit(liters)?)
                }
                Addition::Mass {
                    grams,
                    purity_fraction,
                } => {
                    if let Some(purity) = purity_fraction {
                        let warning = format!(
                            "'{}': adjusted mass for purity_fraction={}.",
                            item.name(),
                            purity
                        );
                        log::warn!("{}", warning);
                        warnings.push(warning);
                    }
                    LineAmount::Mass(Measurement::new(
                        units::from_grams(grams, &self.output.mass)?,
                        self.output.mass.as_str(),
                    ))
                }
            };

            log::debug!("{} {} -> {:?}", target.name, wanted, amount);
            lines.push(RecipeLine {
                name: item.name().to_string(),
                source_type: item.source_type(),
                step: RecipeStep::Reagent,
                amount,
                notes: item.notes().trim().to_string(),
            });
        }

        if total_stock_l > self.final_volume_l {
            let liters = UnitFamily::Volume.base_unit();
            let warning = format!(
                "Total stock volumes ({} {liters}) exceed final volume ({} {liters}). \
                 Check targets/stock concentrations.",
                total_stock_l, self.final_volume_l
            );
            log::warn!("{}", warning);
            warnings.push(warning);
        }

        let remaining_l = (self.final_volume_l - total_stock_l).max(0.0);
        lines.push(RecipeLine {
            name: BRING_TO_VOLUME_NAME.to_string(),
            source_type: SourceType::StockSolution,
            step: RecipeStep::BringToVolume,
            amount: LineAmount::Volume(self.volume_in_output_unit(remaining_l)?),
            notes: BRING_TO_VOLUME_NOTES.to_string(),
        });

        Ok(RecipeResult {
            final_volume: self.final_volume.clone(),
            lines,
            warnings,
        })
    }

    fn volume_in_output_unit(&self, liters: f64) -> Result<Measurement<f64>, BufferError> {
        Ok(Measurement::new(
            units::from_liters(liters, &self.output.volume)?,
            self.output.volume.as_str(),
        ))
    }
}

/// Computes the recipe for `targets` in `final_volume` using the stocks in
/// `catalog`.
///
/// Either every target resolves and a complete result comes back, possibly
/// with warnings, or the first failing target aborts the whole computation.
pub fn compute_recipe(
    catalog: &Catalog,
    targets: &[TargetComponent],
    final_volume: &Measurement<f64>,
    output: &OutputUnits,
) -> Result<RecipeResult, BufferError> {
    RecipeBuilder::new(catalog)
        .with_targets(targets.iter().cloned())
        .with_final_volume(final_volume.value, &final_volume.unit)
        .with_output_units(output.clone())
        .build()?
        .compute()
}
