use buffer_core::{recipe::LineAmount, RecipeResult};

/// Prints a recipe the way a bench protocol reads: volume, warnings, steps.
pub fn print_recipe(result: &RecipeResult) {
    println!("\nFinal volume: {}", result.final_volume);

    if !result.warnings.is_empty() {
        println!("\nWARNINGS:");
        for warning in &result.warnings {
            println!(" - {}", warning);
        }
    }

    println!("\nRECIPE:");
    for line in &result.lines {
        let amount = match &line.amount {
            LineAmount::Volume(volume) => volume,
            LineAmount::Mass(mass) => mass,
        };
        if line.notes.is_empty() {
            println!("- {}: {} {}", line.name, format_amount(amount.value), amount.unit);
        } else {
            println!(
                "- {}: {} {}  ({})",
                line.name,
                format_amount(amount.value),
                amount.unit,
                line.notes
            );
        }
    }
}

const SIGNIFICANT_DIGITS: i32 = 6;

/// Six significant figures without trailing zeros, switching to an exponent
/// below 1e-4 and from 1e6 up (`1.23457e+06`).
pub fn format_amount(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{}", value);
    }

    // Rounding to the kept digits first can carry into the next power of ten.
    let scientific = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if (-4..SIGNIFICANT_DIGITS).contains(&exponent) {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        trim_fraction(format!("{:.*}", decimals, value))
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa.to_string()), sign, exponent.abs())
    }
}

fn trim_fraction(digits: String) -> String {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        digits
    }
}
