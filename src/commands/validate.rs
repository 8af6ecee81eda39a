use anyhow::{Result, bail};
use colored::Colorize;
use std::path::Path;

use devfile_lint::loader::{DevfileLoader, LoadError};
use devfile_lint::validation::ValidationReport;

use super::OutputFormat;

pub fn validate_command(path: &Path, format: OutputFormat) -> Result<()> {
    let loader = DevfileLoader::new(path)?;
    let devfile_path = loader.path().to_path_buf();

    match loader.load_validated() {
        Ok(_) => {
            match format {
                OutputFormat::Text => println!(
                    "{} {} is valid",
                    "✅".green(),
                    devfile_path.display()
                ),
                OutputFormat::Json => println!("[]"),
            }
            Ok(())
        }
        Err(LoadError::Invalid { report, .. }) => {
            print_report(&report, format)?;
            bail!(
                "{} has {} validation problem(s)",
                devfile_path.display(),
                report.len()
            );
        }
        Err(LoadError::Syntax(error)) => {
            eprintln!("{:?}", miette::Report::new(*error));
            bail!("Failed to parse {}", devfile_path.display());
        }
        Err(other) => Err(other.into()),
    }
}

fn print_report(report: &ValidationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Text => {
            for violation in report {
                eprintln!(
                    "{} [{}] {}",
                    "✗".red().bold(),
                    violation.kind(),
                    violation
                );
            }
            eprintln!();
        }
    }
    Ok(())
}
