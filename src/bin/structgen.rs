//! Record Generator CLI
//!
//! Generates Rust records from JSON Schema documents and checks instance
//! documents against the generated rules.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use familiar_structgen::{compile_config, generate, write_output, Codec, StructgenConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "structgen")]
#[command(about = "Generate Rust records from JSON Schema documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the record source file
    Generate {
        /// Schema files or directories (overrides config)
        #[arg(short, long)]
        input: Vec<PathBuf>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Generated module name
        #[arg(short, long)]
        package: Option<String>,
        /// Extra config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Decode instance documents with the generated reader rules
    Validate {
        /// Schema files or directories (overrides config)
        #[arg(short, long)]
        input: Vec<PathBuf>,
        /// Record or alias name the instances are decoded as
        #[arg(short, long)]
        record: String,
        /// Instance documents (JSON)
        #[arg(required = true)]
        instances: Vec<PathBuf>,
        /// Name given to untitled document roots (overrides config)
        #[arg(long)]
        root_name: Option<String>,
        /// Extra config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `false` when validation found problems
fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Generate { input, output, package, config } => {
            let mut settings = StructgenConfig::load_from(config.as_deref())
                .context("failed to load configuration")?;
            if !input.is_empty() {
                settings.input.paths = input;
            }
            if output.is_some() {
                settings.output.path = output;
            }
            if let Some(package) = package.filter(|p| !p.trim().is_empty()) {
                settings.output.package = package;
            }
            if settings.input.paths.is_empty() {
                anyhow::bail!("no input paths given (use --input or [input] paths in structgen.toml)");
            }

            let generated = generate(&settings)?;
            match &settings.output.path {
                Some(path) => {
                    write_output(&generated.code, path)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!(
                        "✅ Generated {} records and {} aliases -> {}",
                        generated.record_count,
                        generated.alias_count,
                        path.display()
                    );
                }
                None => print!("{}", generated.code),
            }
            Ok(true)
        }

        Commands::Validate { input, record, instances, root_name, config } => {
            let mut settings = StructgenConfig::load_from(config.as_deref())
                .context("failed to load configuration")?;
            if !input.is_empty() {
                settings.input.paths = input;
            }
            if let Some(root_name) = root_name.filter(|r| !r.trim().is_empty()) {
                settings.naming.root_name = root_name;
            }
            if settings.input.paths.is_empty() {
                anyhow::bail!("no input paths given (use --input or [input] paths in structgen.toml)");
            }

            let compiled = compile_config(&settings)?;
            let codec = Codec::new(&compiled.consolidated);
            println!("🔍 Validating {} instance(s) as {}", instances.len(), record);

            let mut all_valid = true;
            for path in &instances {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let value: serde_json::Value = serde_json::from_str(&content)
                    .with_context(|| format!("failed to parse {}", path.display()))?;

                let decoded = match codec.decode(&record, &value) {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        println!("  ❌ {} - {}", path.display(), e);
                        all_valid = false;
                        continue;
                    }
                };

                let faults = decoded.as_record().map(|r| r.validate()).unwrap_or_default();
                if faults.is_empty() {
                    println!("  ✅ {} - valid", path.display());
                } else {
                    println!("  ❌ {} - {} missing field(s)", path.display(), faults.len());
                    for fault in faults {
                        println!("     • {}", fault);
                    }
                    all_valid = false;
                }
            }
            Ok(all_valid)
        }
    }
}
