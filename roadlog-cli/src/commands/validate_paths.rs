//! `roadlog validate-paths` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use roadlog_core::config::RoadlogConfig;
use roadlog_path_validator::{PathValidator, ScanReport};

use crate::cli::ValidatePathsArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `validate-paths` command.
///
/// Violations are findings rather than failures, so the command succeeds
/// whenever the log could be read.
pub async fn execute(
    args: ValidatePathsArgs,
    config: &RoadlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let row_width = args.row_width.unwrap_or(config.validator.row_width);
    let validator = PathValidator::new(row_width)?;

    info!(log = %args.log.display(), row_width, "validating paths");

    let scan = validator.scan_file(&args.log).await?;
    let report = PathReport {
        source: args.log.display().to_string(),
        row_width,
        scan,
    };
    writer.render(&report)?;

    Ok(())
}

/// Path validation report for one log.
#[derive(Serialize)]
pub struct PathReport {
    /// Scanned log file
    pub source: String,
    /// Grid row width used for the check
    pub row_width: i64,
    /// Scan counters and violations
    #[serde(flatten)]
    pub scan: ScanReport,
}

impl Render for PathReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for violation in &self.scan.violations {
            writeln!(w, "{}", violation.to_string().yellow())?;
        }

        writeln!(
            w,
            "{}: {} paths checked, {} skipped, {} invalid (row width {})",
            self.source.bold(),
            self.scan.paths_scanned,
            self.scan.skipped,
            self.scan.violations.len(),
            self.row_width
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadlog_path_validator::Violation;

    fn report() -> PathReport {
        PathReport {
            source: "10-5-0.log".to_owned(),
            row_width: 84,
            scan: ScanReport {
                lines: 4,
                paths_scanned: 2,
                skipped: 1,
                violations: vec![Violation {
                    line: 3,
                    path_text: "0, 1, 2, 86, 87".to_owned(),
                    pair: (2, 86),
                }],
            },
        }
    }

    #[test]
    fn test_path_report_render_text() {
        let mut buffer = Vec::new();
        report().render_text(&mut buffer).expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("INVALID PATH on line 3: 0, 1, 2, 86, 87: [2, 86]"));
        assert!(output.contains("2 paths checked, 1 skipped, 1 invalid (row width 84)"));
    }

    #[test]
    fn test_path_report_json() {
        let json = serde_json::to_string(&report()).expect("JSON serialization should succeed");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("should parse JSON");

        assert_eq!(parsed["source"].as_str(), Some("10-5-0.log"));
        assert_eq!(parsed["row_width"].as_i64(), Some(84));
        assert_eq!(parsed["paths_scanned"].as_u64(), Some(2));
        let violations = parsed["violations"].as_array().expect("violations should be array");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0]["line"].as_u64(), Some(3));
        assert_eq!(violations[0]["pair"][0].as_i64(), Some(2));
        assert_eq!(violations[0]["pair"][1].as_i64(), Some(86));
    }
}
