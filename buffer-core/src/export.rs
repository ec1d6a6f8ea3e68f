use crate::{
    error::BufferError,
    recipe::{LineAmount, RecipeResult},
};
use csv::Writer;
use serde::Serialize;
use std::{fs, io, path::Path};

/// One CSV row. Exactly one of the volume or mass pairs is filled; the other
/// serializes as empty cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeRow {
    pub name: String,
    pub source_type: String,
    pub add_volume_value: Option<f64>,
    pub add_volume_unit: Option<String>,
    pub add_mass_value: Option<f64>,
    pub add_mass_unit: Option<String>,
    pub notes: String,
}

pub fn recipe_to_rows(result: &RecipeResult) -> Vec<RecipeRow> {
    result
        .lines
        .iter()
        .map(|line| {
            let (volume, mass) = match &line.amount {
                LineAmount::Volume(volume) => (Some(volume), None),
                LineAmount::Mass(mass) => (None, Some(mass)),
            };
            RecipeRow {
                name: line.name.clone(),
                source_type: line.source_type.to_string(),
                add_volume_value: volume.map(|v| v.value),
                add_volume_unit: volume.map(|v| v.unit.clone()),
                add_mass_value: mass.map(|m| m.value),
                add_mass_unit: mass.map(|m| m.unit.clone()),
                notes: line.notes.clone(),
            }
        })
        .collect()
}

pub fn write_recipe_csv<W: io::Write>(result: &RecipeResult, writer: W) -> Result<(), csv::Error> {
    let mut writer = Writer::from_writer(writer);
    for row in recipe_to_rows(result) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_recipe_csv(result: &RecipeResult, path: &Path) -> Result<(), BufferError> {
    let display = path.display().to_string();
    let file = fs::File::create(path).map_err(|e| BufferError::FileIO(display.clone(), e))?;
    write_recipe_csv(result, file).map_err(|e| BufferError::CsvError(display, e))
}
