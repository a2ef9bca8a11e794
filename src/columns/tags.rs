//! Theme (category) and tag columns.

use super::Column;
use crate::json_helpers::{get_array, get_string, scalar_string};
use crate::sheet::{Cell, CellRef};
use crate::state::CorrelationState;
use crate::types::JsonObject;
use serde_json::Value;

/// Themes from the result's `categories`, de-duplicated in first-seen order
pub struct ThemeColumn;

impl ThemeColumn {
    pub fn themes(result: &JsonObject) -> Option<Vec<String>> {
        let categories = get_array(result, "categories")?;
        let mut ordered: Vec<String> = Vec::with_capacity(categories.len());
        for theme in categories.iter().filter_map(scalar_string) {
            let theme = theme.trim().to_string();
            if !theme.is_empty() && !ordered.contains(&theme) {
                ordered.push(theme);
            }
        }
        Some(ordered)
    }
}

impl Column for ThemeColumn {
    fn label(&self) -> &str {
        "Themes"
    }

    fn add_result(
        &self,
        state: &mut CorrelationState,
        cell: &mut Cell,
        at: CellRef,
        result: &JsonObject,
    ) -> Result<(), String> {
        if let Some(themes) = Self::themes(result) {
            cell.set_text(themes.join("\n"));
            cell.style.wrap = true;
            state.annotate_themes(at, themes)?;
        }
        Ok(())
    }
}

/// Gherkin tags rendered as `@name()` or `@name("argument")`, one per line
pub struct TagColumn;

impl TagColumn {
    fn tag(entry: &Value) -> Option<String> {
        let entry = entry.as_object()?;
        let name = get_string(entry, "name")?;
        let argument = get_string(entry, "argument").map(|a| format!("\"{}\"", a)).unwrap_or_default();
        Some(format!("@{}({})", name, argument))
    }
}

impl Column for TagColumn {
    fn label(&self) -> &str {
        "Tags"
    }

    fn add_result(
        &self,
        _: &mut CorrelationState,
        cell: &mut Cell,
        _: CellRef,
        result: &JsonObject,
    ) -> Result<(), String> {
        if let Some(entries) = get_array(result, "tags") {
            let tags: Vec<String> = entries.iter().filter_map(Self::tag).collect();
            cell.set_text(tags.join("\n"));
            cell.style.wrap = true;
        }
        Ok(())
    }
}
