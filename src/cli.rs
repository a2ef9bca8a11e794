use crate::input::file_url_to_path;
use clap::{CommandFactory, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "traceability-matrix")]
#[command(about = "Render Martini scenario results as a spreadsheet traceability matrix")]
#[command(version)]
pub struct CliArgs {
    /// JSON input resources: paths, file:// or http(s):// URLs, or glob patterns
    /// Examples: results.json, "file:///var/run/martini/*.json"
    /// Can specify multiple: --input a.json b.json
    #[arg(long, short = 'i', value_name = "RESOURCE", num_args = 1.., required = true)]
    pub input: Vec<String>,

    /// Output spreadsheet (path or file:// URL), e.g. file:///tmp/report.xlsx
    #[arg(long, short = 'o', value_name = "RESOURCE")]
    pub output: String,

    /// Refuse to overwrite an existing output file
    #[arg(long)]
    pub no_clobber: bool,

    /// TOML report configuration (column order, sheet names, formats)
    /// Default: <config dir>/traceability-matrix/config.toml when present
    #[arg(long, short = 'c', value_name = "RESOURCE")]
    pub config: Option<String>,

    /// Read input with the legacy line-oriented assembler instead of the
    /// streaming JSON reader (for logs with JSON objects interleaved)
    #[arg(long)]
    pub line_mode: bool,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        CliArgs::parse()
    }

    /// One-line usage synopsis, as clap prints it for parse errors
    pub fn usage() -> String {
        CliArgs::command().render_usage().to_string()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.input.iter().any(|s| s.trim().is_empty()) {
            return Err("Input resources must not be empty".to_string());
        }

        let Some(output) = file_url_to_path(&self.output) else {
            return Err(format!("Output must be a file path or file:// URL, got {}", self.output));
        };
        if output.as_os_str().is_empty() {
            return Err("Output resource must not be empty".to_string());
        }

        // Writing over an input would truncate it before it is read
        if self.input.iter().filter_map(|s| file_url_to_path(s)).any(|input| input == output) {
            return Err(format!("Output {} is also listed as an input", output.display()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: &[&str], output: &str) -> CliArgs {
        CliArgs {
            input: input.iter().map(|s| s.to_string()).collect(),
            output: output.to_string(),
            no_clobber: false,
            config: None,
            line_mode: false,
        }
    }

    #[test]
    fn test_validate_valid_args_succeeds() {
        assert!(args(&["results/*.json"], "report.xlsx").validate().is_ok());
        assert!(args(&["https://ci.example.com/run.json"], "file:///tmp/report.xlsx").validate().is_ok());
    }

    #[test]
    fn test_validate_http_output_fails() {
        let err = args(&["a.json"], "https://example.com/report.xlsx").validate().unwrap_err();
        assert!(err.contains("file path or file:// URL"));
    }

    #[test]
    fn test_validate_output_same_as_input_fails() {
        assert!(args(&["file:///tmp/run.json"], "/tmp/run.json").validate().is_err());
    }

    #[test]
    fn test_parse_from_command_line() {
        let parsed = CliArgs::try_parse_from([
            "traceability-matrix",
            "-i",
            "a.json",
            "b.json",
            "-o",
            "out.xlsx",
            "--no-clobber",
            "--line-mode",
        ])
        .unwrap();
        assert_eq!(parsed.input, vec!["a.json", "b.json"]);
        assert_eq!(parsed.output, "out.xlsx");
        assert!(parsed.no_clobber);
        assert!(parsed.line_mode);
        assert!(parsed.config.is_none());
    }

    #[test]
    fn test_usage_names_required_flags() {
        let usage = CliArgs::usage();
        assert!(usage.starts_with("Usage: traceability-matrix"), "got {:?}", usage);
        assert!(usage.contains("--input"));
        assert!(usage.contains("--output"));
    }

    #[test]
    fn test_missing_required_args_rejected() {
        assert!(CliArgs::try_parse_from(["traceability-matrix", "-o", "out.xlsx"]).is_err());
        assert!(CliArgs::try_parse_from(["traceability-matrix", "-i", "a.json"]).is_err());
    }
}
