use crate::units::{ConcentrationKind, UnitFamily};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("Component '{0}' not found in stocks")]
    ComponentNotFound(String),

    #[error("Unsupported {family} unit: {unit}")]
    UnsupportedUnit { family: UnitFamily, unit: String },

    #[error("Unrecognized concentration unit: {0}")]
    UnrecognizedConcentrationUnit(String),

    #[error("Unsupported target unit '{unit}' for '{name}'")]
    UnsupportedTargetUnit { name: String, unit: String },

    #[error("Concentration is {actual}, not {expected}")]
    ConcentrationKindMismatch {
        expected: ConcentrationKind,
        actual: ConcentrationKind,
    },

    #[error(
        "Target for '{name}' is {target_kind} ({target_unit}) but stock is \
         {stock_kind} ({stock_unit}). Use a {target_kind} stock or change target unit."
    )]
    ConcentrationMismatch {
        name: String,
        target_kind: ConcentrationKind,
        target_unit: String,
        stock_kind: ConcentrationKind,
        stock_unit: String,
    },

    #[error(
        "Cannot use v/v concentration ({unit}) with powder stock for '{name}'. \
         Use molar or mass/vol units instead."
    )]
    VolumeFractionPowder { name: String, unit: String },

    #[error("Invalid type '{stock_type}' for '{name}'. Use 'stock_solution' or 'powder'.")]
    UnknownStockType { name: String, stock_type: String },

    #[error("Stock solution '{0}' requires concentration_value and concentration_unit")]
    MissingConcentration(String),

    #[error("Invalid stock concentration for '{name}': {value} {unit}")]
    InvalidStockConcentration { name: String, value: f64, unit: String },

    #[error("Powder '{0}' requires a positive mw_g_per_mol for molar targets")]
    MissingMolarMass(String),

    #[error("purity_fraction for '{name}' must be in (0, 1], got {value}")]
    InvalidPurity { name: String, value: f64 },

    #[error("Final volume is missing")]
    FinalVolumeNotDefined,

    #[error("Final volume must be a finite number, got {value} {unit}")]
    InvalidFinalVolume { value: f64, unit: String },

    #[error("Target value for '{name}' must be a finite number, got {value}")]
    InvalidTargetValue { name: String, value: f64 },

    #[error("Missing required column '{0}' in stocks file")]
    MissingColumn(String),

    #[error("Unsupported catalog format for '{0}'. Use .xlsx, .csv, .yaml or .yml")]
    UnsupportedCatalogFormat(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to parse YAML from '{0}': {1}")]
    YamlParsing(String, #[source] serde_yaml::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),

    #[error("Invalid stock row in '{0}': {1}")]
    InvalidRow(String, #[source] csv::Error),

    #[error("Failed to open workbook '{0}': {1}")]
    Workbook(String, #[source] calamine::XlsxError),

    #[error("Sheet '{sheet}' not found in '{path}'")]
    SheetNotFound { path: String, sheet: String },
}
