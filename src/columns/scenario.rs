//! Columns read straight off the result record.

use super::Column;
use crate::json_helpers::{get_array, get_string};
use crate::sheet::{Cell, CellRef};
use crate::state::CorrelationState;
use crate::types::JsonObject;
use unicode_width::UnicodeWidthStr;

/// Scenario name
pub struct ScenarioNameColumn;

impl Column for ScenarioNameColumn {
    fn label(&self) -> &str {
        "Scenario"
    }

    fn add_result(
        &self,
        _: &mut CorrelationState,
        cell: &mut Cell,
        _: CellRef,
        result: &JsonObject,
    ) -> Result<(), String> {
        cell.set_text(get_string(result, "name").unwrap_or_default());
        Ok(())
    }
}

/// Scenario description with whitespace collapsed, word-wrapped
pub struct DescriptionColumn {
    width: usize,
}

impl DescriptionColumn {
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

impl Column for DescriptionColumn {
    fn label(&self) -> &str {
        "Description"
    }

    fn add_result(
        &self,
        _: &mut CorrelationState,
        cell: &mut Cell,
        _: CellRef,
        result: &JsonObject,
    ) -> Result<(), String> {
        if let Some(description) = get_string(result, "description") {
            cell.set_text(wrap_words(&description, self.width));
            cell.style.wrap = true;
        }
        Ok(())
    }
}

/// Greedy word wrap on display width. Words wider than `width` get a line of
/// their own rather than being split. A width of 0 disables wrapping.
pub fn wrap_words(text: &str, width: usize) -> String {
    if width == 0 {
        return text.split_whitespace().collect::<Vec<_>>().join(" ");
    }

    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0;

    for word in text.split_whitespace() {
        let word_width = UnicodeWidthStr::width(word);
        if line.is_empty() {
            line.push_str(word);
            line_width = word_width;
        } else if line_width + 1 + word_width <= width {
            line.push(' ');
            line.push_str(word);
            line_width += 1 + word_width;
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
            line_width = word_width;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

/// Result status; the cell becomes the row's status anchor
pub struct StatusColumn;

impl Column for StatusColumn {
    fn label(&self) -> &str {
        "Status"
    }

    fn add_result(
        &self,
        state: &mut CorrelationState,
        cell: &mut Cell,
        at: CellRef,
        result: &JsonObject,
    ) -> Result<(), String> {
        let Some(status) = get_string(result, "status").map(|s| s.trim().to_string()) else {
            return Ok(());
        };
        cell.set_text(status.as_str());
        if !status.is_empty() {
            state.annotate_status(at, &status)?;
        }
        Ok(())
    }
}

/// First non-empty stack trace among the scenario's steps
pub struct ExceptionColumn;

impl Column for ExceptionColumn {
    fn label(&self) -> &str {
        "Exception"
    }

    fn add_result(
        &self,
        _: &mut CorrelationState,
        cell: &mut Cell,
        _: CellRef,
        result: &JsonObject,
    ) -> Result<(), String> {
        let exception = get_array(result, "steps").and_then(|steps| {
            steps
                .iter()
                .filter_map(|step| step.as_object())
                .filter_map(|step| get_string(step, "exception"))
                .map(|trace| trace.trim().to_string())
                .find(|trace| !trace.is_empty())
        });

        if let Some(trace) = exception {
            cell.set_text(trace);
            cell.style.wrap = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::CellValue;
    use serde_json::{Value, json};

    fn run(column: &dyn Column, state: &mut CorrelationState, result: Value) -> Cell {
        let mut cell = Cell::default();
        column.add_result(state, &mut cell, CellRef::new(1, 0), result.as_object().unwrap()).unwrap();
        cell
    }

    #[test]
    fn test_scenario_name() {
        let mut state = CorrelationState::new();
        let cell = run(&ScenarioNameColumn, &mut state, json!({"name": "Sign in"}));
        assert_eq!(cell.value.as_text(), Some("Sign in"));

        let cell = run(&ScenarioNameColumn, &mut state, json!({}));
        assert_eq!(cell.value.as_text(), Some(""));
    }

    #[test]
    fn test_wrap_words() {
        assert_eq!(wrap_words("  a   b\n c ", 60), "a b c");
        assert_eq!(wrap_words("one two three four", 9), "one two\nthree\nfour");
        assert_eq!(wrap_words("supercalifragilistic is long", 5), "supercalifragilistic\nis\nlong");
        assert_eq!(wrap_words("a b", 0), "a b");
        assert_eq!(wrap_words("", 10), "");
    }

    #[test]
    fn test_description_collapses_whitespace() {
        let mut state = CorrelationState::new();
        let column = DescriptionColumn::new(60);
        let cell = run(&column, &mut state, json!({"description": "  Given a\n\tregistered   user  "}));
        assert_eq!(cell.value.as_text(), Some("Given a registered user"));
        assert!(cell.style.wrap);

        let cell = run(&column, &mut state, json!({"description": {"nested": true}}));
        assert_eq!(cell.value, CellValue::Empty);
    }

    #[test]
    fn test_status_annotates_row() {
        let mut state = CorrelationState::new();
        let cell = run(&StatusColumn, &mut state, json!({"status": "FAILED"}));
        assert_eq!(cell.value.as_text(), Some("FAILED"));
        assert_eq!(state.failed_rows().into_iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_missing_status_records_nothing() {
        let mut state = CorrelationState::new();
        let cell = run(&StatusColumn, &mut state, json!({"name": "x"}));
        assert_eq!(cell.value, CellValue::Empty);
        assert!(state.status_rows().is_empty());
    }

    #[test]
    fn test_exception_takes_first_non_empty_trace() {
        let mut state = CorrelationState::new();
        let result = json!({"steps": [
            {"name": "given"},
            {"name": "when", "exception": "   "},
            {"name": "then", "exception": "\njava.lang.AssertionError: expected\n"},
            {"name": "and", "exception": "second"}
        ]});
        let cell = run(&ExceptionColumn, &mut state, result);
        assert_eq!(cell.value.as_text(), Some("java.lang.AssertionError: expected"));

        let cell = run(&ExceptionColumn, &mut state, json!({"name": "no steps"}));
        assert_eq!(cell.value, CellValue::Empty);
    }
}
