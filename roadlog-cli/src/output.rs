//! Text/JSON rendering of command reports
//!
//! Every report (`AggregateReport`, `PathReport`, config reports) is written
//! through [`OutputWriter`], selected by the global `--output` flag.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Writes command reports as colored text or pretty JSON.
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(payload, &mut handle)
    }

    /// Render a payload into `w`; JSON output ends with a newline.
    pub fn render_to<T: Render + Serialize>(
        &self,
        payload: &T,
        w: &mut dyn Write,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => {
                payload.render_text(w)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Human-readable form of a report.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

#[cfg(test)]
mod tests {
    use roadlog_path_validator::{ScanReport, Violation};

    use super::*;
    use crate::commands::config::ConfigReport;
    use crate::commands::validate_paths::PathReport;

    fn path_report() -> PathReport {
        PathReport {
            source: "10-5-0.log".to_owned(),
            row_width: 84,
            scan: ScanReport {
                lines: 4,
                paths_scanned: 3,
                skipped: 1,
                violations: vec![Violation {
                    line: 2,
                    path_text: "0, 1, 2, 86, 87".to_owned(),
                    pair: (2, 86),
                }],
            },
        }
    }

    fn render(format: OutputFormat) -> String {
        let mut buffer = Vec::new();
        OutputWriter::new(format)
            .render_to(&path_report(), &mut buffer)
            .expect("rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_text_format_uses_report_renderer() {
        let output = render(OutputFormat::Text);

        assert!(output.contains("INVALID PATH on line 2"), "should list the violation");
        assert!(
            output.contains("3 paths checked, 1 skipped, 1 invalid (row width 84)"),
            "should print the summary line: {output}"
        );
        assert!(!output.trim_start().starts_with('{'), "text output is not JSON");
    }

    #[test]
    fn test_json_format_flattens_scan_counters() {
        let output = render(OutputFormat::Json);
        assert!(output.ends_with('\n'), "json output should end with newline");

        let parsed: serde_json::Value =
            serde_json::from_str(&output).expect("should parse back to JSON");
        assert_eq!(parsed["source"].as_str(), Some("10-5-0.log"));
        assert_eq!(parsed["row_width"].as_i64(), Some(84));
        assert_eq!(parsed["paths_scanned"].as_u64(), Some(3));
        assert!(parsed.get("scan").is_none(), "scan report should be flattened");
        assert_eq!(parsed["violations"][0]["pair"], serde_json::json!([2, 86]));
    }

    #[test]
    fn test_json_omits_unset_config_section() {
        let report = ConfigReport {
            source: "roadlog.toml".to_owned(),
            section: None,
            config_toml: "[validator]\nrow_width = 84\n".to_owned(),
        };

        let mut buffer = Vec::new();
        OutputWriter::new(OutputFormat::Json)
            .render_to(&report, &mut buffer)
            .expect("json rendering should succeed");
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).expect("should parse JSON");

        assert_eq!(parsed["source"].as_str(), Some("roadlog.toml"));
        assert!(parsed.get("section").is_none());
    }
}
