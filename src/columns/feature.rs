//! Columns resolved through the correlation state's lookup tables.
//!
//! A result may reference a feature or suite that has not been seen yet;
//! those cells render empty.

use super::Column;
use crate::json_helpers::get_string;
use crate::sheet::{Cell, CellRef};
use crate::state::CorrelationState;
use crate::types::JsonObject;

/// Name of the referenced feature
pub struct FeatureNameColumn;

impl Column for FeatureNameColumn {
    fn label(&self) -> &str {
        "Feature"
    }

    fn add_result(
        &self,
        state: &mut CorrelationState,
        cell: &mut Cell,
        _: CellRef,
        result: &JsonObject,
    ) -> Result<(), String> {
        let name = state.lookup_feature(result).and_then(|f| f.name.clone());
        cell.set_text(name.unwrap_or_default());
        Ok(())
    }
}

/// Feature source location plus the scenario's line, e.g. `login.feature line 12`
pub struct LocationColumn;

impl LocationColumn {
    fn format(resource: Option<&str>, line: Option<&str>) -> String {
        let mut value = resource.unwrap_or_default().to_string();
        if let Some(line) = line {
            value.push_str(if value.is_empty() { "line " } else { " line " });
            value.push_str(line);
        }
        value
    }
}

impl Column for LocationColumn {
    fn label(&self) -> &str {
        "Location"
    }

    fn add_result(
        &self,
        state: &mut CorrelationState,
        cell: &mut Cell,
        _: CellRef,
        result: &JsonObject,
    ) -> Result<(), String> {
        let resource = state.lookup_feature(result).and_then(|f| f.location.clone());
        let line = get_string(result, "line");
        cell.set_text(Self::format(resource.as_deref(), line.as_deref()));
        Ok(())
    }
}

/// Name of the suite the scenario ran in
pub struct SuiteNameColumn;

impl Column for SuiteNameColumn {
    fn label(&self) -> &str {
        "Suite"
    }

    fn add_result(
        &self,
        state: &mut CorrelationState,
        cell: &mut Cell,
        _: CellRef,
        result: &JsonObject,
    ) -> Result<(), String> {
        let name = state.lookup_suite(result).and_then(|s| s.name.clone());
        cell.set_text(name.unwrap_or_default());
        Ok(())
    }
}
