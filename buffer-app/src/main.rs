use anyhow::{Context, Result};
use buffer_core::{catalog, compute_recipe, export};
use clap::Parser;
use env_logger::Env;
use std::path::{Path, PathBuf};

mod config;
mod report;

/// Buffer Builder: stocks + targets -> recipe.
#[derive(Debug, Parser)]
#[command(name = "buffer-builder", version, about)]
struct Cli {
    /// Stock catalog (.xlsx, .csv or .yaml)
    #[arg(long)]
    stocks: PathBuf,

    /// Workbook sheet holding the stocks (.xlsx only)
    #[arg(long, default_value = catalog::DEFAULT_SHEET)]
    sheet: String,

    /// YAML request with final_volume, targets and optional output units
    #[arg(long)]
    request: Option<PathBuf>,

    /// Final volume value
    #[arg(long)]
    final_volume: Option<f64>,

    /// Final volume unit, e.g. mL, uL, L [default: mL]
    #[arg(long)]
    final_unit: Option<String>,

    /// Target "Name,value,unit" (repeatable)
    #[arg(long = "target")]
    targets: Vec<String>,

    /// Output CSV path, or a directory to write a timestamped file into
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output volume unit for additions [default: uL]
    #[arg(long)]
    vol_unit: Option<String>,

    /// Output mass unit for powders [default: mg]
    #[arg(long)]
    mass_unit: Option<String>,

    /// Print the recipe as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env).init();

    if !cli.json {
        println!("--- Buffer Builder ---");
    }

    let catalog = config::load_catalog(&cli.stocks, &cli.sheet)?;
    let request_file = cli
        .request
        .as_deref()
        .map(config::load_request_file)
        .transpose()?;
    let request = config::resolve_request(
        request_file,
        config::Overrides {
            final_volume: cli.final_volume,
            final_unit: cli.final_unit,
            targets: cli.targets,
            volume_unit: cli.vol_unit,
            mass_unit: cli.mass_unit,
        },
    )?;

    let result = compute_recipe(
        &catalog,
        &request.targets,
        &request.final_volume,
        &request.output,
    )
    .context("Failed to compute recipe")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        report::print_recipe(&result);
    }

    if let Some(out) = cli.out {
        let path = output_path(&out);
        export::export_recipe_csv(&result, &path)
            .with_context(|| format!("Failed to export recipe to {:?}", path))?;
        if !cli.json {
            println!("\nSaved CSV: {}", path.display());
        }
    }

    Ok(())
}

/// An existing directory gets a timestamped `recipe_*.csv` inside it.
fn output_path(out: &Path) -> PathBuf {
    if out.is_dir() {
        out.join(format!("recipe_{}.csv", chrono::Utc::now().format("%Y%m%d_%H%M%S")))
    } else {
        out.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_defaults_to_stocks() {
        let cli = Cli::try_parse_from(["buffer-builder", "--stocks", "stocks.xlsx"]).unwrap();
        assert_eq!(cli.sheet, "stocks");
    }

    #[test]
    fn sheet_can_be_chosen() {
        let cli = Cli::try_parse_from([
            "buffer-builder",
            "--stocks",
            "lab.xlsx",
            "--sheet",
            "Bench 2",
            "--target",
            "NaCl,150,mM",
        ])
        .unwrap();
        assert_eq!(cli.sheet, "Bench 2");
        assert_eq!(cli.targets, ["NaCl,150,mM"]);
    }
}
