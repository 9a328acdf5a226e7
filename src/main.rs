//! procmap CLI Entry Point
//!
//! Maps a process description file to a diagram description and a
//! serialized record.
//!
//! # Usage
//!
//! ```bash
//! # Map a text description into the current directory
//! procmap process.txt
//!
//! # Write artifacts elsewhere, with custom layout settings
//! procmap onboarding.yaml --out-dir build --config procmap.yaml
//!
//! # Skip malformed connections instead of failing
//! procmap onboarding.json --drop-invalid-connections
//! ```

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use colored::Colorize;
use log::{error, info};

use procmap::process::ConnectionPolicy;
use procmap::store::{output_stem, save_document};
use procmap::{load_input, to_document, Mapper, MapperConfig, ProcessError, ProcessMap};
use procmap::{APP_NAME, VERSION};

/// Command-line configuration parsed from arguments.
#[derive(Debug, Default)]
struct Config {
    input_path: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    drop_invalid_connections: bool,
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME.bold(), VERSION);
    println!("Business Process Swimlane Mapper");
    println!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: procmap [OPTIONS] <INPUT>");
    println!();
    println!("Arguments:");
    println!("  <INPUT>                     Process description (.txt, .yaml, .yml or .json)");
    println!();
    println!("Options:");
    println!("  --out-dir DIR               Directory for generated files (default: .)");
    println!("  --config FILE               YAML mapper configuration");
    println!("  --drop-invalid-connections  Skip malformed connections instead of failing");
    println!("  --verbose                   Enable debug logging");
    println!("  --help                      Show this help message");
    println!("  --version                   Show version information");
    println!();
    println!("Examples:");
    println!("  procmap process.txt");
    println!("  procmap onboarding.yaml --out-dir build --config procmap.yaml");
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--drop-invalid-connections" => {
                config.drop_invalid_connections = true;
            }
            "--out-dir" => {
                i += 1;
                let dir = args.get(i).ok_or("--out-dir requires a directory argument")?;
                config.out_dir = Some(PathBuf::from(dir));
            }
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config requires a file argument")?;
                config.config_path = Some(PathBuf::from(path));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                if config.input_path.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                config.input_path = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    if config.input_path.is_none() {
        return Err("Missing <INPUT> file".to_string());
    }
    Ok(config)
}

/// Prints a short colored summary of the mapped process.
fn print_summary(map: &ProcessMap) {
    let diagram = &map.diagram;

    println!();
    println!("{} {}", "Mapped".green().bold(), diagram.title.bold());
    if !diagram.footer.is_empty() {
        println!("  {}", diagram.footer.dimmed());
    }
    println!(
        "  {} steps, {} connections, {} pools, {} lanes",
        diagram.nodes.len(),
        diagram.edges.len(),
        diagram.pools.len(),
        diagram.lanes.len()
    );
    for lane in &diagram.lanes {
        let members = diagram.nodes.iter().filter(|n| n.lane_id == lane.lane_id).count();
        println!("  {} {}/{} ({})", "|".cyan(), lane.pool, lane.lane, members);
    }
    for lane_id in map.layout.overflowing_lanes() {
        println!("  {} lane {} is wider than the configured maximum", "!".yellow(), lane_id);
    }
    println!();
}

/// Prints every finding carried by a parse or validation failure.
fn print_failure(err: &ProcessError) {
    let findings: Vec<String> = err
        .connection_errors()
        .iter()
        .map(ToString::to_string)
        .chain(err.violations().iter().map(ToString::to_string))
        .collect();

    eprintln!();
    if findings.is_empty() {
        eprintln!("{} {}", "Error:".red().bold(), err);
        return;
    }
    eprintln!("{} {} problem(s) found", "Error:".red().bold(), findings.len());
    for finding in findings {
        eprintln!("  {} {}", "x".red(), finding);
    }
}

/// Maps the input file described by `config`.
fn run(config: Config) -> Result<(), ProcessError> {
    setup_logging(config.verbose);
    print_banner();

    let mut mapper_config = match &config.config_path {
        Some(path) => MapperConfig::load(path)?,
        None => MapperConfig::default(),
    };
    if config.drop_invalid_connections {
        mapper_config = mapper_config.with_connection_policy(ConnectionPolicy::Drop);
    }

    let input = config
        .input_path
        .ok_or_else(|| ProcessError::Config("Missing <INPUT> file".to_string()))?;
    let record = load_input(&input).map_err(|e| {
        error!("Failed to load process from '{}'", input.display());
        e
    })?;

    let map = Mapper::new(mapper_config).map(record)?;

    let out_dir = config.out_dir.unwrap_or_else(|| PathBuf::from("."));
    let stem = output_stem(map.graph.name());

    let diagram_path = out_dir.join(format!("{}.diagram.json", stem));
    save_document(&diagram_path, &serde_json::to_value(&map.diagram)?)?;

    let record_path = out_dir.join(format!("{}.record.json", stem));
    save_document(&record_path, &to_document(&map.graph, Some(&map.layout))?)?;

    print_summary(&map);
    info!("Diagram: {}", diagram_path.display());
    info!("Record:  {}", record_path.display());

    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    // Argument errors are reported here, once, with usage
    let config = match parse_arguments(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_failure(&e);
            ExitCode::FAILURE
        }
    }
}
