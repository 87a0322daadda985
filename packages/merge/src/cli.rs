//! Command-line interface for the descriptor merger.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;

use crate::config::MergeConfig;
use crate::error::Result;
use crate::merge::MergeReport;
use crate::registry::create_dialect_registry;
use crate::service::{inspect_file, merge_files, Inspection};

/// Descriptor Merge - Merge XML deployment descriptors section by section.
#[derive(Parser)]
#[command(name = "descriptor-merge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge an overlay descriptor into an original descriptor.
    Merge {
        /// Descriptor to merge into
        original: PathBuf,

        /// Descriptor providing additions and changes
        overlay: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// YAML file with per-section strategies
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Strategy for one section (e.g., filter=preserve), repeatable
        #[arg(short, long = "strategy", value_name = "SECTION=STRATEGY")]
        strategies: Vec<String>,

        /// Dialect key (default: detected from the original)
        #[arg(short, long)]
        dialect: Option<String>,
    },

    /// Show the dialect, version and sections of a descriptor.
    Inspect {
        /// Descriptor to inspect
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the supported dialects and their section order.
    Dialects,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            original,
            overlay,
            output,
            config,
            strategies,
            dialect,
        } => merge_command(
            &original,
            &overlay,
            output.as_deref(),
            config.as_deref(),
            &strategies,
            dialect,
        ),
        Commands::Inspect { file, json } => inspect_command(&file, json),
        Commands::Dialects => {
            dialects_command();
            Ok(())
        }
    }
}

/// Build the merge configuration: file first, then command-line assignments.
fn load_config(
    config: Option<&Path>,
    strategies: &[String],
    dialect: Option<String>,
) -> Result<MergeConfig> {
    let mut merge_config = match config {
        Some(path) => MergeConfig::from_file(path)?,
        None => MergeConfig::default(),
    };
    for assignment in strategies {
        merge_config.apply_assignment(assignment)?;
    }
    if dialect.is_some() {
        merge_config.dialect = dialect;
    }
    Ok(merge_config)
}

/// Execute the merge command.
fn merge_command(
    original: &Path,
    overlay: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    strategies: &[String],
    dialect: Option<String>,
) -> Result<()> {
    let merge_config = load_config(config, strategies, dialect)?;
    let outcome = merge_files(original, overlay, &merge_config)?;

    match output {
        Some(path) => {
            std::fs::write(path, &outcome.xml)?;
            print_report(&outcome.report);
            eprintln!();
            eprintln!("{} {}", style("Saved to:").green().bold(), path.display());
        }
        None => {
            print!("{}", outcome.xml);
            print_report(&outcome.report);
        }
    }

    Ok(())
}

/// Print the per-section report to stderr so stdout stays valid XML.
fn print_report(report: &MergeReport) {
    eprintln!(
        "{} {} descriptor",
        style("Merged").bold(),
        style(&report.dialect).cyan()
    );
    for section in report.sections.iter().filter(|section| section.changed > 0) {
        eprintln!(
            "  {:<28} {:<10} {}",
            section.section,
            section.strategy.as_str(),
            style(section.changed).green()
        );
    }
    eprintln!("  Total changed: {}", style(report.total()).green().bold());
}

/// Execute the inspect command.
fn inspect_command(file: &Path, json: bool) -> Result<()> {
    let inspection = inspect_file(file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
    } else {
        print_inspection(&inspection);
    }
    Ok(())
}

fn print_inspection(inspection: &Inspection) {
    println!("  Dialect: {}", style(&inspection.dialect).cyan());
    if let Some(version) = &inspection.version {
        println!("  Version: {version}");
    }
    for section in &inspection.sections {
        println!("  {:<28} {}", section.section, section.count);
    }
    if !inspection.unknown.is_empty() {
        println!(
            "  Unknown elements: {}",
            style(inspection.unknown.join(", ")).yellow().bold()
        );
    }
}

/// Execute the dialects command.
fn dialects_command() {
    let registry = create_dialect_registry();
    for key in registry.keys() {
        let Ok(dialect) = registry.create(key) else {
            continue;
        };
        println!(
            "{} <{}>",
            style(key).cyan().bold(),
            dialect.root_name()
        );
        println!("  {}", dialect.top_level_names().join(", "));
    }
}
