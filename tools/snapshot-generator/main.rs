use ahash::AHashMap;
use clap::Parser;
use katachi::data::{RawForm, SnapshotFile};
use katachi::prelude::*;
use rand::Rng;
use rand::rngs::ThreadRng;
use std::fs;

/// A CLI tool to generate random value snapshots for a Katachi form
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the form definition JSON file
    form_path: String,

    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_snapshot.json")]
    output: String,

    /// Probability that a field is left without a value
    #[arg(long, default_value_t = 0.1)]
    blank: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if !(0.0..=1.0).contains(&cli.blank) {
        eprintln!("Error: --blank ({}) must be between 0 and 1", cli.blank);
        std::process::exit(1);
    }

    let form_json = fs::read_to_string(&cli.form_path)?;
    let form = RawForm::from_json(&form_json)?.into_form()?;
    println!(
        "Generating a snapshot for {} fields from '{}'...",
        form.fields.len(),
        cli.form_path
    );

    let mut snapshot = AHashMap::new();
    for field in &form.fields {
        // Calculated values are produced by the engine.
        if field.is_calculated() || rng.random_bool(cli.blank) {
            continue;
        }
        let value = generate_value(&mut rng, field);
        log::debug!("{} = {}", field.name, value);
        snapshot.insert(field.id, value);
    }

    let json_output = SnapshotFile::from_snapshot(&snapshot).to_json_pretty()?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated {} values and saved them to '{}'",
        snapshot.len(),
        cli.output
    );

    Ok(())
}

/// Generates a plausible value for the field based on its type and options.
fn generate_value(rng: &mut ThreadRng, field: &FieldDefinition) -> FieldValue {
    match (&field.field_type, &field.options) {
        (_, FieldOptions::Choices { choices, multiple }) if !choices.is_empty() => {
            if *multiple {
                let picked: Vec<FieldValue> = choices
                    .iter()
                    .filter(|_| rng.random_bool(0.5))
                    .map(|c| FieldValue::from(c.as_str()))
                    .collect();
                FieldValue::List(picked)
            } else {
                FieldValue::from(choices[rng.random_range(0..choices.len())].as_str())
            }
        }
        (_, FieldOptions::Numeric { min, max, .. }) => {
            let low = min.unwrap_or(0.0);
            let high = max.unwrap_or(low + 100.0).max(low + 1.0);
            FieldValue::Number(rng.random_range(low..high).round())
        }
        (FieldType::Number | FieldType::Range, _) => {
            FieldValue::Number(rng.random_range(0..1000) as f64)
        }
        (FieldType::Rating, _) => FieldValue::Number(rng.random_range(1..=5) as f64),
        (FieldType::Checkbox | FieldType::Switch, _) => FieldValue::Bool(rng.random_bool(0.5)),
        (FieldType::Email, _) => format!("user{}@example.com", rng.random_range(1..1000)).into(),
        (FieldType::Url, _) => format!("https://example.com/{}", rng.random_range(1..1000)).into(),
        (FieldType::Date, _) => format!(
            "2024-{:02}-{:02}",
            rng.random_range(1..=12),
            rng.random_range(1..=28)
        )
        .into(),
        (FieldType::DateTime, _) => format!(
            "2024-{:02}-{:02} {:02}:{:02}:00",
            rng.random_range(1..=12),
            rng.random_range(1..=28),
            rng.random_range(0..24),
            rng.random_range(0..60)
        )
        .into(),
        (FieldType::Time, _) => format!(
            "{:02}:{:02}",
            rng.random_range(0..24),
            rng.random_range(0..60)
        )
        .into(),
        (FieldType::CheckboxList, _) => FieldValue::List(Vec::new()),
        _ => format!("{} {}", field.name, rng.random_range(1..100)).into(),
    }
}
