//! Timestamp and execution-time columns.

use super::Column;
use crate::json_helpers::{get_i64, get_string};
use crate::sheet::{Cell, CellRef};
use crate::state::CorrelationState;
use crate::types::JsonObject;
use chrono::{DateTime, Local};
use log::warn;

const KEY_START: &str = "startTimestamp";
const KEY_END: &str = "endTimestamp";

/// Start time as raw epoch milliseconds with a readable local time underneath
pub struct TimestampColumn;

impl TimestampColumn {
    fn format(raw: &str) -> String {
        let parsed = raw.trim().parse::<i64>().ok().and_then(DateTime::from_timestamp_millis);
        match parsed {
            Some(utc) => {
                let local = utc.with_timezone(&Local);
                format!("{}\n({})", raw, local.format("%a %b %d %H:%M:%S %Y"))
            }
            None => {
                warn!("unable to parse '{}' as an epoch timestamp", raw);
                raw.to_string()
            }
        }
    }
}

impl Column for TimestampColumn {
    fn label(&self) -> &str {
        "Timestamp"
    }

    fn add_result(
        &self,
        _: &mut CorrelationState,
        cell: &mut Cell,
        _: CellRef,
        result: &JsonObject,
    ) -> Result<(), String> {
        if let Some(raw) = get_string(result, KEY_START) {
            cell.set_text(Self::format(&raw));
            cell.style.wrap = true;
        }
        Ok(())
    }
}

/// Execution time (end - start) in milliseconds; feeds longest-duration tracking
pub struct ExecutionTimeColumn;

impl ExecutionTimeColumn {
    pub fn execution_time(result: &JsonObject) -> Option<i64> {
        let start = get_i64(result, KEY_START)?;
        let end = get_i64(result, KEY_END)?;
        let duration = end.checked_sub(start);
        if duration.is_none() {
            warn!("execution time {} - {} is out of range, leaving it empty", end, start);
        }
        duration
    }
}

impl Column for ExecutionTimeColumn {
    fn label(&self) -> &str {
        "Execution (ms)"
    }

    fn add_result(
        &self,
        state: &mut CorrelationState,
        cell: &mut Cell,
        at: CellRef,
        result: &JsonObject,
    ) -> Result<(), String> {
        if let Some(duration) = Self::execution_time(result) {
            cell.set_number(duration as f64);
            state.annotate_duration(at, duration)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::CellValue;
    use serde_json::{Value, json};

    fn run(column: &dyn Column, state: &mut CorrelationState, row: usize, result: Value) -> Cell {
        let mut cell = Cell::default();
        column.add_result(state, &mut cell, CellRef::new(row, 3), result.as_object().unwrap()).unwrap();
        cell
    }

    #[test]
    fn test_timestamp_includes_readable_date() {
        let mut state = CorrelationState::new();
        let cell = run(&TimestampColumn, &mut state, 1, json!({"startTimestamp": 1500000000000i64}));
        let text = cell.value.as_text().unwrap();
        assert!(text.starts_with("1500000000000\n("), "got {:?}", text);
        assert!(text.ends_with(')'));
    }

    #[test]
    fn test_unparseable_timestamp_kept_verbatim() {
        let mut state = CorrelationState::new();
        let cell = run(&TimestampColumn, &mut state, 1, json!({"startTimestamp": "yesterday"}));
        assert_eq!(cell.value.as_text(), Some("yesterday"));

        let cell = run(&TimestampColumn, &mut state, 1, json!({}));
        assert_eq!(cell.value, CellValue::Empty);
    }

    #[test]
    fn test_execution_time_annotates_duration() {
        let mut state = CorrelationState::new();
        let cell = run(&ExecutionTimeColumn, &mut state, 1, json!({"startTimestamp": 1000, "endTimestamp": 1500}));
        assert_eq!(cell.value, CellValue::Number(500.0));

        run(&ExecutionTimeColumn, &mut state, 2, json!({"startTimestamp": "1000", "endTimestamp": "2500"}));
        assert_eq!(state.longest_duration(), Some(1500));
        assert_eq!(state.longest_duration_cells(), &[CellRef::new(2, 3)]);
    }

    #[test]
    fn test_execution_time_requires_both_ends() {
        let mut state = CorrelationState::new();
        let cell = run(&ExecutionTimeColumn, &mut state, 1, json!({"startTimestamp": 1000}));
        assert_eq!(cell.value, CellValue::Empty);

        run(&ExecutionTimeColumn, &mut state, 1, json!({"endTimestamp": 1000}));
        assert_eq!(state.longest_duration(), None);
    }

    #[test]
    fn test_execution_time_out_of_range_is_empty() {
        let mut state = CorrelationState::new();
        let result = json!({"startTimestamp": -9000000000000000000i64, "endTimestamp": 9000000000000000000i64});
        let cell = run(&ExecutionTimeColumn, &mut state, 1, result);
        assert_eq!(cell.value, CellValue::Empty);
        assert_eq!(state.longest_duration(), None);
    }
}
