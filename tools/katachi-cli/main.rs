use ahash::AHashMap;
use clap::Parser;
use katachi::data::{RawForm, SnapshotFile};
use katachi::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::time::Instant;

/// Recalculates a dynamic form: calculated values, visibility and validation rules
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the form definition JSON file
    form_path: Option<String>,
    /// Optional path to an id-keyed snapshot JSON file
    snapshot_path: Option<String>,

    /// Load a compiled form artifact instead of a form JSON file
    #[arg(long)]
    artifact: Option<String>,

    /// Save the compiled form as a bincode artifact
    #[arg(long)]
    save_artifact: Option<String>,

    /// Explain the visibility and conditional rules of every field
    #[arg(short, long)]
    explain: bool,

    /// JSON file with engine limits
    #[arg(long)]
    limits: Option<String>,

    #[arg(long)]
    max_formula_tokens: Option<usize>,

    #[arg(long)]
    max_formula_depth: Option<usize>,

    #[arg(long)]
    max_conditions: Option<usize>,

    /// Run in interactive mode to be prompted for field values
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.human {
        run_interactive(cli);
    } else {
        run_non_interactive(cli);
    }
}

/// Compiles the form named on the command line, or loads a compiled artifact.
fn load_evaluator(cli: &Cli, form_path: Option<String>) -> Evaluator {
    let compile_start = Instant::now();

    let compiled = if let Some(artifact_path) = &cli.artifact {
        CompiledForm::from_file(artifact_path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load artifact: {}", e)))
    } else {
        let form_path = form_path.unwrap_or_else(|| {
            exit_with_error("A form path or --artifact is required.");
        });
        let form_json = fs::read_to_string(&form_path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to read form file '{}': {}", form_path, e))
        });
        let form = RawForm::from_json(&form_json)
            .and_then(RawForm::into_form)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert form: {}", e)));

        Compiler::builder(form)
            .with_limits(resolve_limits(cli))
            .build()
            .compile()
            .unwrap_or_else(|e| exit_with_error(&format!("Form compilation failed: {}", e)))
    };

    println!(
        "Form ready: {} fields, {} calculated, in {:?}",
        compiled.fields().len(),
        compiled.calculations.len(),
        compile_start.elapsed()
    );
    for diagnostic in &compiled.diagnostics {
        println!("  ! {}", diagnostic);
    }

    if let Some(path) = &cli.save_artifact {
        compiled
            .save(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to save artifact: {}", e)));
        println!("Saved compiled form to '{}'", path);
    }

    Evaluator::new(compiled)
}

fn resolve_limits(cli: &Cli) -> EngineLimits {
    let mut limits = match &cli.limits {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| EngineLimits::from_json(&json).map_err(|e| e.to_string()))
            .unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to load limits from '{}': {}", path, e))
            }),
        None => EngineLimits::default(),
    };
    if let Some(n) = cli.max_formula_tokens {
        limits.max_formula_tokens = n;
    }
    if let Some(n) = cli.max_formula_depth {
        limits.max_formula_depth = n;
    }
    if let Some(n) = cli.max_conditions {
        limits.max_conditions = n;
    }
    limits
}

/// Runs the CLI in non-interactive mode, taking all arguments from the command line.
fn run_non_interactive(cli: Cli) {
    let total_start = Instant::now();
    let evaluator = load_evaluator(&cli, cli.form_path.clone());

    let values = match &cli.snapshot_path {
        Some(path) => SnapshotFile::from_file(path)
            .unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to load snapshot from '{}': {}", path, e))
            })
            .to_snapshot(),
        None => {
            println!("No snapshot file provided. Starting from empty values.");
            AHashMap::new()
        }
    };

    let eval_start = Instant::now();
    let pass = evaluator.recalculate(&values);
    let eval_duration = eval_start.elapsed();

    print_pass(&evaluator, &pass, cli.explain);

    println!("\n--- Performance Summary ---");
    println!("Recalculation:        {:?}", eval_duration);
    println!("Total Execution:      {:?}", total_start.elapsed());
    println!();
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
fn run_interactive(cli: Cli) {
    println!("--- Katachi Interactive Mode ---");

    let form_path = match &cli.form_path {
        Some(path) => Some(path.clone()),
        None if cli.artifact.is_some() => None,
        None => Some(prompt_for_input("Enter form path", Some("data/form.json"))),
    };
    let evaluator = load_evaluator(&cli, form_path);

    let mut values: AHashMap<FieldId, FieldValue> = match &cli.snapshot_path {
        Some(path) => SnapshotFile::from_file(path)
            .map(|s| s.to_snapshot())
            .unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to load snapshot from '{}': {}", path, e))
            }),
        None => AHashMap::new(),
    };

    let pass = evaluator.recalculate(&values);
    print_pass(&evaluator, &pass, cli.explain);
    // Carry the formatted calculated values into the next pass.
    values = pass.snapshot;

    loop {
        println!("\nSet a field value (leave the field empty to quit).");
        let target = prompt_for_input("Field name or id", None);
        if target.is_empty() {
            break;
        }
        let Some(field) = find_field(evaluator.compiled(), &target) else {
            println!("No field named '{}'.", target);
            continue;
        };
        let id = field.id;
        let input = prompt_for_input(&format!("Value for '{}' (JSON or text)", field.name), None);
        values.insert(id, parse_input(&input));

        let pass = evaluator.recalculate(&values);
        print_pass(&evaluator, &pass, cli.explain);
        values = pass.snapshot;
    }
}

fn find_field<'a>(compiled: &'a CompiledForm, target: &str) -> Option<&'a FieldDefinition> {
    match target.parse::<FieldId>() {
        Ok(id) => compiled.field(id),
        Err(_) => compiled.fields().iter().find(|f| f.name == target),
    }
}

/// Parses prompt input as JSON when possible, otherwise as plain text.
fn parse_input(input: &str) -> FieldValue {
    if input.is_empty() {
        return FieldValue::Null;
    }
    serde_json::from_str::<serde_json::Value>(input)
        .map(|json| FieldValue::from_json(&json))
        .unwrap_or_else(|_| FieldValue::Text(input.to_string()))
}

fn print_pass(evaluator: &Evaluator, pass: &Recalculation, explain: bool) {
    println!("\n--- Fields ---");
    for field in evaluator.compiled().fields() {
        let state = if pass.is_visible(field.id) {
            "shown "
        } else {
            "hidden"
        };
        let value = pass
            .snapshot
            .get(&field.id)
            .map_or_else(|| "-".to_string(), |v| v.to_json().to_string());
        println!("[{}] {} (#{}) = {}", state, field.name, field.id, value);

        if let Some(rules) = pass.rules_for(field.id) {
            if !rules.is_empty() {
                println!("           rules: {}", rules.join("|"));
            }
        }
        if explain {
            if let Some(reason) = evaluator.explain(field.id, pass) {
                for line in reason.lines() {
                    println!("           -> {}", line);
                }
            }
        }
    }

    if !pass.diagnostics.is_empty() {
        println!("\n--- Diagnostics ---");
        for diagnostic in &pass.diagnostics {
            println!("  ! {}", diagnostic);
        }
    }
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    if let Err(e) = io::stdout().flush() {
        exit_with_error(&format!("Failed to write prompt: {}", e));
    }

    if let Err(e) = io::stdin().read_line(&mut line) {
        exit_with_error(&format!("Failed to read line: {}", e));
    }
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
