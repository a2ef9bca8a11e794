/// Configuration resolution module
///
/// This module handles:
/// - Loading the TOML report configuration (column order, sheet names,
///   description width, date format)
/// - Falling back to the per-user config file, then to built-in defaults
/// - Validating the configuration before any input is read
use crate::cli::CliArgs;
use crate::columns::{self, Column, ColumnKind};
use crate::input::file_url_to_path;
use crate::state::DEFAULT_DATE_FORMAT;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Report layout, as read from the configuration resource
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Column keys in display order
    pub columns: Vec<String>,
    pub results_sheet: String,
    pub suites_sheet: String,
    /// Wrap width of the description column; 0 disables wrapping
    pub description_width: usize,
    /// Spreadsheet number format for the suites Date column
    pub date_format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            columns: ColumnKind::ALL.iter().map(|k| k.key().to_string()).collect(),
            results_sheet: "Results".to_string(),
            suites_sheet: "Suites".to_string(),
            description_width: 60,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl ReportConfig {
    /// Parse a configuration from TOML text and validate it
    pub fn from_toml(text: &str) -> Result<Self, String> {
        let config: ReportConfig = toml::from_str(text).map_err(|e| format!("Failed to parse configuration: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        // Builds and discards the extractors; reports unknown/empty columns
        self.build_columns()?;

        for name in [&self.results_sheet, &self.suites_sheet] {
            validate_sheet_name(name)?;
        }
        if self.results_sheet.eq_ignore_ascii_case(&self.suites_sheet) {
            return Err(format!("Sheet names must differ (both are '{}')", self.results_sheet));
        }
        if self.date_format.trim().is_empty() {
            return Err("date_format must not be empty".to_string());
        }
        Ok(())
    }

    /// Column extractors in configured order
    pub fn build_columns(&self) -> Result<Vec<Box<dyn Column>>, String> {
        columns::build_columns(&self.columns, self.description_width)
    }
}

/// Spreadsheet applications reject empty names, names over 31 characters,
/// and a handful of reserved characters.
fn validate_sheet_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Sheet names must not be empty".to_string());
    }
    if name.chars().count() > 31 {
        return Err(format!("Sheet name '{}' is longer than 31 characters", name));
    }
    if let Some(c) = name.chars().find(|c| matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\')) {
        return Err(format!("Sheet name '{}' contains invalid character '{}'", name, c));
    }
    Ok(())
}

/// Per-user configuration file, e.g. ~/.config/traceability-matrix/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("traceability-matrix").join("config.toml"))
}

/// Load a configuration file
pub fn load_config(path: &Path) -> Result<ReportConfig, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("Failed to read configuration {}: {}", path.display(), e))?;
    ReportConfig::from_toml(&text).map_err(|e| format!("{} ({})", e, path.display()))
}

/// Resolve the configuration for this run.
///
/// An explicit `--config` must exist. Otherwise the per-user file is used if
/// present, and the built-in defaults if not.
pub fn resolve_config(args: &CliArgs) -> Result<ReportConfig, String> {
    if let Some(ref spec) = args.config {
        let path = file_url_to_path(spec).ok_or_else(|| format!("Unsupported configuration resource: {}", spec))?;
        debug!("Using configuration from --config: {}", path.display());
        return load_config(&path);
    }

    match default_config_path() {
        Some(path) if path.is_file() => {
            debug!("Using per-user configuration {}", path.display());
            load_config(&path)
        }
        _ => {
            debug!("No configuration file, using built-in defaults");
            Ok(ReportConfig::default())
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
