use anyhow::{bail, Context, Result};
use buffer_core::{catalog, Catalog, OutputUnits};
use buffer_schemas::{file_formats::RequestFile, measurement::Measurement, target::TargetComponent};
use std::{fs, path::Path};

/// Everything one recipe computation needs, after merging the request file
/// with command-line overrides.
#[derive(Debug)]
pub struct RecipeRequest {
    pub final_volume: Measurement<f64>,
    pub targets: Vec<TargetComponent>,
    pub output: OutputUnits,
}

/// Command-line values that take precedence over a request file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub final_volume: Option<f64>,
    pub final_unit: Option<String>,
    pub targets: Vec<String>,
    pub volume_unit: Option<String>,
    pub mass_unit: Option<String>,
}

pub fn load_catalog(path: &Path, sheet: &str) -> Result<Catalog> {
    println!("Loading stocks from '{}'...", path.display());
    let catalog = catalog::load_catalog_sheet(path, sheet)
        .with_context(|| format!("Failed to load stocks from {:?}", path))?;
    println!("Loaded {} stock(s).", catalog.len());
    Ok(catalog)
}

pub fn load_request_file(path: &Path) -> Result<RequestFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {:?}", path))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse YAML from {:?}", path))
}

/// Parses `Name,value,unit`, e.g. `Tris-HCl,50,mM`.
pub fn parse_target(raw: &str) -> Result<TargetComponent> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [name, value, unit] = parts.as_slice() else {
        bail!("Invalid --target format: '{}'. Use 'Name,value,unit'", raw);
    };
    if name.is_empty() || unit.is_empty() {
        bail!("Invalid --target format: '{}'. Use 'Name,value,unit'", raw);
    }
    let value: f64 = value
        .parse()
        .with_context(|| format!("Invalid value '{}' in --target '{}'", value, raw))?;
    Ok(TargetComponent::new(*name, value, *unit))
}

/// Merges an optional request file with command-line overrides.
///
/// Command-line targets are appended after the file's targets.
pub fn resolve_request(file: Option<RequestFile>, overrides: Overrides) -> Result<RecipeRequest> {
    let mut output = OutputUnits::default();
    let mut targets = Vec::new();
    let mut final_volume = None;

    if let Some(file) = file {
        final_volume = Some(file.final_volume);
        targets = file.targets;
        if let Some(unit) = file.output_volume_unit {
            output.volume = unit;
        }
        if let Some(unit) = file.output_mass_unit {
            output.mass = unit;
        }
    }

    if let Some(value) = overrides.final_volume {
        let unit = overrides
            .final_unit
            .clone()
            .or_else(|| final_volume.as_ref().map(|v: &Measurement<f64>| v.unit.clone()))
            .unwrap_or_else(|| "mL".to_string());
        final_volume = Some(Measurement::new(value, unit));
    } else if let (Some(unit), Some(volume)) = (overrides.final_unit, final_volume.as_mut()) {
        volume.unit = unit;
    }

    for raw in &overrides.targets {
        targets.push(parse_target(raw)?);
    }
    if let Some(unit) = overrides.volume_unit {
        output.volume = unit;
    }
    if let Some(unit) = overrides.mass_unit {
        output.mass = unit;
    }

    let Some(final_volume) = final_volume else {
        bail!(
            "A final volume is required: pass --final-volume or a --request file with final_volume"
        );
    };
    if targets.is_empty() {
        log::warn!("No targets given; the recipe will only contain the bring-to-volume step");
    }

    Ok(RecipeRequest {
        final_volume,
        targets,
        output,
    })
}
