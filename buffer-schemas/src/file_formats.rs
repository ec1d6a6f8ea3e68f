use crate::{measurement::Measurement, stock::StockRecord, target::TargetComponent};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub schema_version: String,
    pub stocks: Vec<StockRecord>,
}

/// A buffer request as written in a `request.yaml`.
#[derive(Debug, Deserialize)]
pub struct RequestFile {
    pub schema_version: String,
    pub final_volume: Measurement<f64>,
    pub targets: Vec<TargetComponent>,
    #[serde(default)]
    pub output_volume_unit: Option<String>,
    #[serde(default)]
    pub output_mass_unit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_file_parses_with_optional_units_absent() {
        let yaml = r#"
schema_version: "1"
final_volume: { value: 100.0, unit: mL }
targets:
  - { name: Tris-HCl, final_value: 50.0, final_unit: mM }
  - { name: NaCl, final_value: 150.0, final_unit: mM }
"#;
        let request: RequestFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(request.final_volume, Measurement::new(100.0, "mL"));
        assert_eq!(request.targets.len(), 2);
        assert_eq!(request.targets[1].name, "NaCl");
        assert!(request.output_volume_unit.is_none());
        assert!(request.output_mass_unit.is_none());
    }

    #[test]
    fn catalog_file_reads_type_discriminator_as_text() {
        let yaml = r#"
schema_version: "1"
stocks:
  - name: Glycerol
    type: stock_solution
    concentration_value: 100
    concentration_unit: "%"
  - name: NaCl
    type: powder
    mw_g_per_mol: 58.44
"#;
        let catalog: CatalogFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(catalog.stocks[0].stock_type, "stock_solution");
        assert_eq!(catalog.stocks[0].concentration_unit.as_deref(), Some("%"));
        assert_eq!(catalog.stocks[1].mw_g_per_mol, Some(58.44));
        assert_eq!(catalog.stocks[1].purity_fraction, None);
    }
}
