// declscan: C header and API registry symbol extraction

mod console;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use declscan::registry::{self, Registry};
use declscan::symbols::SymbolSnapshot;
use declscan::{scan_header, ScanConfig, ScanError};

#[derive(Parser)]
#[clap(version, author, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract symbols from a C header
    Header(InputArgs),
    /// Extract per-feature symbols from an API registry XML file
    Registry(InputArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Input file
    file: PathBuf,
    /// TOML scan configuration
    #[clap(long)]
    config: Option<PathBuf>,
    /// Print the symbol table as JSON
    #[clap(long, num_args = 0)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::builder()
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Header(args) => run_header(&args),
        Command::Registry(args) => run_registry(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ScanConfig, ScanError> {
    match path {
        Some(path) => ScanConfig::load(path),
        None => Ok(ScanConfig::default()),
    }
}

fn read_input(path: &Path) -> Result<String, ScanError> {
    fs::read_to_string(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn run_header(args: &InputArgs) -> Result<(), ScanError> {
    let config = console::stage("Loading config", || load_config(args.config.as_deref()))?;
    let source = console::stage("Reading header", || read_input(&args.file))?;
    let table = console::stage("Parsing header", || scan_header(&source, &config))?;

    let snapshot = table.snapshot();
    if args.json {
        print_json(&snapshot);
    } else {
        print_summary(&args.file.display().to_string(), &snapshot);
    }
    Ok(())
}

fn run_registry(args: &InputArgs) -> Result<(), ScanError> {
    let config = console::stage("Loading config", || load_config(args.config.as_deref()))?;
    let xml = console::stage("Reading registry", || read_input(&args.file))?;
    let Registry { pool, features } =
        console::stage("Parsing registry", || registry::parse_registry(&xml, &config))?;

    if args.json {
        let snapshots: Vec<_> = features.iter().map(|f| f.snapshot()).collect();
        print_json(&serde_json::json!({
            "unknown_types": pool.unknown_types(),
            "features": snapshots,
        }));
        return Ok(());
    }

    println!(
        "Pool: {} constants, {} functions",
        pool.constant_count(),
        pool.function_count()
    );
    for feature in &features {
        let profile = if feature.embedded { " (embedded)" } else { "" };
        println!(
            "  {:?} {}{profile}: {} constants, {} functions",
            feature.kind,
            feature.name,
            feature.symbols.constants().len(),
            feature.symbols.functions().len()
        );
    }
    print_unknown(pool.unknown_types());
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("Error: failed to serialize output: {err}"),
    }
}

fn print_summary(name: &str, snapshot: &SymbolSnapshot) {
    println!("{name}:");
    println!("  {} constants", snapshot.constants.len());
    println!("  {} definitions", snapshot.definitions.len());
    println!("  {} structs", snapshot.structs.len());
    println!("  {} functions", snapshot.functions.len());
    print_unknown(&snapshot.unknown_types);
}

fn print_unknown(unknown: &[String]) {
    if !unknown.is_empty() {
        println!("Unknown types: {}", unknown.join(", "));
    }
}
