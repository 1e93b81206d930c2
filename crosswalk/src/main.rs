//! Crosswalk CLI - Generate SQL imports from control crosswalk data
//!
//! # Main Commands
//!
//! ```bash
//! crosswalk generate                          # EU_AI_AICM_Crosswalk_v6.csv -> import_ai_controls.sql
//! crosswalk generate input.csv -t governance-controls
//! crosswalk generate input.csv -m mapping.json --stdout
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! crosswalk parse input.csv          # Dump parsed records as JSON
//! crosswalk summary input.csv        # Controls per domain
//! crosswalk mapping governance       # Print a built-in mapping
//! crosswalk classify SEC-07 🔴       # Pillar and risk level
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to change verbosity.

use clap::{Parser, Subcommand};
use crosswalk::{
    classify_pillar, classify::classify_risk_opt, controls_from_records, generate, load,
    summarize, GenerateOptions, Settings, TableKind,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "crosswalk")]
#[command(about = "Generate SQL imports from AI-governance control crosswalk data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a batch INSERT script from a crosswalk CSV
    Generate {
        /// Input CSV file (default: $CROSSWALK_INPUT or EU_AI_AICM_Crosswalk_v6.csv)
        input: Option<PathBuf>,

        /// Output SQL file (default: $CROSSWALK_OUTPUT or import_<table>.sql)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target table: ai-controls or governance-controls
        #[arg(short, long)]
        table: Option<TableKind>,

        /// Custom mapping JSON file instead of the built-in one
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Print the script instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Parse a CSV file and output JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit typed controls (lists split, mandatory columns checked)
        #[arg(long)]
        typed: bool,
    },

    /// Show controls per domain
    Summary {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Print a built-in mapping as JSON
    Mapping {
        /// ai-controls or governance-controls
        #[arg(default_value = "ai-controls")]
        table: TableKind,
    },

    /// Show the pillar and risk level for a control
    Classify {
        /// Control identifier, e.g. SEC-07
        id: String,

        /// Validation-scale marker
        marker: Option<String>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            input,
            output,
            table,
            mapping,
            delimiter,
            stdout,
        } => cmd_generate(input, output, table, mapping, delimiter, stdout),

        Commands::Parse {
            input,
            delimiter,
            output,
            typed,
        } => cmd_parse(&input, delimiter, output.as_deref(), typed),

        Commands::Summary { input, delimiter } => cmd_summary(&input, delimiter),

        Commands::Mapping { table } => cmd_mapping(table),

        Commands::Classify { id, marker } => cmd_classify(&id, marker.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Structured logs on stderr, stdout stays for SQL and JSON.
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crosswalk=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn cmd_generate(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    table: Option<TableKind>,
    mapping: Option<PathBuf>,
    delimiter: Option<char>,
    stdout: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::from_env()?;
    if let Some(input) = input {
        settings.input = input;
    }
    if let Some(output) = output {
        settings.output = Some(output);
    }
    if let Some(table) = table {
        settings.table = table;
    }
    if let Some(mapping) = mapping {
        settings.mapping = Some(mapping);
    }

    let import_mapping = settings.import_mapping()?;
    let mut options = GenerateOptions::new(settings.input.clone(), import_mapping)
        .with_delimiter(delimiter);
    if !stdout {
        options = options.with_output(settings.output_path());
    }

    let result = generate(&options)?;

    if stdout {
        println!("{}", result.script);
    }
    info!(rows = result.row_count, "done");
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
    typed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(input = %input.display(), "parsing CSV");

    let result = load(input, delimiter)?;
    info!(
        encoding = %result.encoding,
        delimiter = ?result.delimiter,
        columns = %result.headers.join(", "),
        records = result.records.len(),
        "parsed"
    );

    let json = if typed {
        serde_json::to_string_pretty(&controls_from_records(&result.records)?)?
    } else {
        serde_json::to_string_pretty(&result.records)?
    };
    write_output(&json, output)?;

    Ok(())
}

fn cmd_summary(input: &Path, delimiter: Option<char>) -> Result<(), Box<dyn std::error::Error>> {
    let result = load(input, delimiter)?;
    let summary = summarize(&result.records);

    println!("Total Controls: {}", summary.total);
    println!("Domains: {}", summary.domains.len());
    for (domain, count) in &summary.domains {
        println!("  - {}: {} controls", domain, count);
    }
    Ok(())
}

fn cmd_mapping(table: TableKind) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", table.mapping().to_json()?);
    Ok(())
}

fn cmd_classify(id: &str, marker: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Pillar: {}", classify_pillar(id));
    println!("Risk level: {}", classify_risk_opt(marker));
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            info!(output = %p.display(), "output written");
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
