//! Column extractors for the results sheet.
//!
//! Each column reads one value out of a result record (and, where needed, the
//! correlation state's suite/feature tables), writes it into the row's cell,
//! and may register an annotation for the deferred formatting passes.
//!
//! # Module Organization
//!
//! - `scenario` - scenario name, description, status, exception
//! - `feature` - feature name, location, suite name (correlated lookups)
//! - `timing` - start timestamp, execution time
//! - `tags` - themes (categories) and tags

mod feature;
mod scenario;
mod tags;
mod timing;

pub use feature::{FeatureNameColumn, LocationColumn, SuiteNameColumn};
pub use scenario::{DescriptionColumn, ExceptionColumn, ScenarioNameColumn, StatusColumn};
pub use tags::{TagColumn, ThemeColumn};
pub use timing::{ExecutionTimeColumn, TimestampColumn};

use crate::sheet::{Cell, CellRef};
use crate::state::CorrelationState;
use crate::types::JsonObject;

/// One pluggable column of the results sheet
pub trait Column {
    /// Header label
    fn label(&self) -> &str;

    /// Fill `cell` (located at `at`) from `result`, recording annotations in `state`
    fn add_result(
        &self,
        state: &mut CorrelationState,
        cell: &mut Cell,
        at: CellRef,
        result: &JsonObject,
    ) -> Result<(), String>;
}

/// Built-in columns, addressable by configuration key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Scenario,
    Description,
    Feature,
    Location,
    Suite,
    Status,
    Themes,
    Tags,
    Timestamp,
    Execution,
    Exception,
}

impl ColumnKind {
    pub const ALL: [ColumnKind; 11] = [
        ColumnKind::Scenario,
        ColumnKind::Description,
        ColumnKind::Feature,
        ColumnKind::Location,
        ColumnKind::Suite,
        ColumnKind::Status,
        ColumnKind::Themes,
        ColumnKind::Tags,
        ColumnKind::Timestamp,
        ColumnKind::Execution,
        ColumnKind::Exception,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ColumnKind::Scenario => "scenario",
            ColumnKind::Description => "description",
            ColumnKind::Feature => "feature",
            ColumnKind::Location => "location",
            ColumnKind::Suite => "suite",
            ColumnKind::Status => "status",
            ColumnKind::Themes => "themes",
            ColumnKind::Tags => "tags",
            ColumnKind::Timestamp => "timestamp",
            ColumnKind::Execution => "execution",
            ColumnKind::Exception => "exception",
        }
    }

    pub fn from_key(key: &str) -> Option<ColumnKind> {
        let key = key.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// Instantiate the extractor; `description_width` only affects `Description`
    pub fn build(&self, description_width: usize) -> Box<dyn Column> {
        match self {
            ColumnKind::Scenario => Box::new(ScenarioNameColumn),
            ColumnKind::Description => Box::new(DescriptionColumn::new(description_width)),
            ColumnKind::Feature => Box::new(FeatureNameColumn),
            ColumnKind::Location => Box::new(LocationColumn),
            ColumnKind::Suite => Box::new(SuiteNameColumn),
            ColumnKind::Status => Box::new(StatusColumn),
            ColumnKind::Themes => Box::new(ThemeColumn),
            ColumnKind::Tags => Box::new(TagColumn),
            ColumnKind::Timestamp => Box::new(TimestampColumn),
            ColumnKind::Execution => Box::new(ExecutionTimeColumn),
            ColumnKind::Exception => Box::new(ExceptionColumn),
        }
    }
}

/// Resolve configured column keys to extractors, preserving order
pub fn build_columns(keys: &[String], description_width: usize) -> Result<Vec<Box<dyn Column>>, String> {
    if keys.is_empty() {
        return Err("At least one column must be configured".to_string());
    }

    keys.iter()
        .map(|key| {
            ColumnKind::from_key(key).map(|kind| kind.build(description_width)).ok_or_else(|| {
                let known: Vec<&str> = ColumnKind::ALL.iter().map(|k| k.key()).collect();
                format!("Unknown column '{}' (expected one of: {})", key, known.join(", "))
            })
        })
        .collect()
}
