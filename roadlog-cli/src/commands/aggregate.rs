//! `roadlog aggregate` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use roadlog_core::config::RoadlogConfig;
use roadlog_correlator::{Correlator, CorrelatorConfig, CorrelatorConfigBuilder, RunReport};

use crate::cli::AggregateArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `aggregate` command.
///
/// The report is rendered even when some run groups fail; the command then
/// returns `CliError::Aggregate` so the process exits non-zero.
pub async fn execute(
    args: AggregateArgs,
    config: &RoadlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let correlator_config = build_correlator_config(&args, config)?;

    info!(
        data_dir = %args.data_dir.display(),
        output_dir = %correlator_config.output_dir.display(),
        "starting aggregate"
    );

    let correlator = Correlator::new(correlator_config)?;
    let run = correlator.run(&args.data_dir).await?;

    let report = AggregateReport {
        success: run.is_success(),
        run,
    };
    writer.render(&report)?;

    if !report.success {
        return Err(CliError::Aggregate(format!(
            "{} run group(s) failed",
            report.run.failures.len()
        )));
    }

    Ok(())
}

/// Merge the `[correlator]` section with command-line overrides.
fn build_correlator_config(
    args: &AggregateArgs,
    config: &RoadlogConfig,
) -> Result<CorrelatorConfig, CliError> {
    let base = CorrelatorConfig::from_core(&config.correlator)?;
    let mut builder = CorrelatorConfigBuilder::from_config(base);

    if let Some(dir) = &args.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(file) = &args.merged_output {
        builder = builder.merged_output(file);
    }
    if args.sequential {
        builder = builder.parallel(false);
    }

    Ok(builder.build()?)
}

/// Aggregate run report.
#[derive(Serialize)]
pub struct AggregateReport {
    /// Whether every run group was committed
    pub success: bool,
    /// Per-group summaries and failures
    #[serde(flatten)]
    pub run: RunReport,
}

impl Render for AggregateReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Aggregate: {}", self.run.data_dir.display().to_string().bold())?;
        writeln!(
            w,
            "  Groups: {} committed, {} failed",
            self.run.groups.len(),
            self.run.failures.len()
        )?;
        writeln!(w, "  Rows: {}", self.run.total_rows)?;

        if !self.run.groups.is_empty() {
            writeln!(w)?;
            writeln!(
                w,
                "  {:<12} {:>6} {:>10} {:>8} {:>10}  OUTPUT",
                "GROUP", "PAIRS", "LINES", "ROWS", "TIME(ms)"
            )?;
            for group in &self.run.groups {
                let output = group
                    .output
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(merged)".to_owned());
                writeln!(
                    w,
                    "  {:<12} {:>6} {:>10} {:>8} {:>10}  {}",
                    group.group, group.pairs, group.lines, group.rows, group.elapsed_ms, output
                )?;
            }
        }

        if let Some(merged) = &self.run.merged_output {
            writeln!(w)?;
            writeln!(w, "  Merged table: {}", merged.display().to_string().green())?;
        }

        if !self.run.failures.is_empty() {
            writeln!(w)?;
            for failure in &self.run.failures {
                writeln!(
                    w,
                    "  {} {}: {}",
                    "FAILED".red().bold(),
                    failure.group,
                    failure.error.red()
                )?;
            }
        }

        if self.success {
            writeln!(w, "  Result: {}", "OK".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "FAILED".red().bold())?;
        }

        Ok(())
    }
}
