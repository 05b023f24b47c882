//! Output formatting for the migration report

use colored::Colorize;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::migrator::{Confirmation, MigrationOutcome, MigrationReport};

pub mod json;
pub mod table;

/// Format and print the report to stdout
pub fn print_report(report: &MigrationReport, format: OutputFormat) -> Result<()> {
    let output = format_report(report, format)?;
    println!("{}", output);
    Ok(())
}

/// Render the report in the requested format
pub fn format_report(report: &MigrationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(json::format_json(report)?),
        OutputFormat::Pretty => Ok(format_pretty(report)),
    }
}

fn format_pretty(report: &MigrationReport) -> String {
    let mut lines = Vec::new();

    match &report.outcome {
        MigrationOutcome::NothingToMigrate => {
            lines.push(format!(
                "{} No secrets to migrate in {}",
                "✓".green(),
                report.source.to_string().bold()
            ));
        }
        MigrationOutcome::Published {
            workflow_path,
            confirmation,
        } => {
            lines.push(format!("{} Migration workflow published", "✓".green()));
            lines.push(String::new());
            lines.push(format!("  Mode:      {}", report.mode));
            lines.push(format!("  Source:    {}", report.source));
            lines.push(format!("  Target:    {}", report.target));
            lines.push(format!("  Branch:    {}", report.branch));
            lines.push(format!("  Workflow:  {}", workflow_path));

            if let Some(inventory) = &report.inventory {
                lines.push(String::new());
                lines.push(table::format_table(&table::secret_rows(inventory)));
            }

            if !report.environments_created.is_empty() {
                lines.push(String::new());
                lines.push(format!(
                    "Environments created: {}",
                    report.environments_created.join(", ")
                ));
            }

            lines.push(String::new());
            match confirmation {
                Confirmation::Run { status, url, .. } => {
                    lines.push(format!("Workflow run {}: {}", status, url.bold()));
                }
                Confirmation::Fallback { url } => {
                    lines.push(format!(
                        "{} No workflow run observed yet. Check: {}",
                        "!".yellow(),
                        url.bold()
                    ));
                }
            }
            lines.push(
                "The workflow deletes the temporary credentials and the branch when it finishes."
                    .dimmed()
                    .to_string(),
            );
        }
    }

    if !report.warnings.is_empty() {
        lines.push(String::new());
        lines.push(format!("{}", "Warnings:".yellow().bold()));
        for warning in &report.warnings {
            lines.push(format!("  {} {}", "!".yellow(), warning));
        }
    }

    lines.join("\n")
}
