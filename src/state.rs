//! Correlation state for one report run.
//!
//! The state owns everything that needs knowledge of the whole record
//! stream:
//!
//! - the suite and feature tables, keyed by identifier (last write wins)
//! - per-cell annotations recorded by column extractors: status, themes and
//!   execution duration
//! - the running "longest duration" high-water mark and the cells tied at it
//!
//! Annotations are addressed by [`CellRef`] (row and column), never by cell
//! identity, so the deferred formatting passes run over plain indices:
//!
//! ```text
//!   OPEN ── record_* / annotate_* ──► OPEN
//!     │
//!     └── finalize(document) ──► FINALIZED (terminal; every later call errors)
//!           1. highlight longest durations
//!           2. color rows by status
//!           3. mark compromised themes
//!           4. render the suites sheet
//! ```

use crate::json_helpers::get_string;
use crate::sheet::{BorderWeight, Cell, CellRef, CellStyle, CellValue, Document, Fill, FontColor, Sheet};
use crate::types::{Feature, JsonObject, Suite};
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const STATUS_PASSED: &str = "PASSED";
pub const STATUS_FAILED: &str = "FAILED";
pub const STATUS_SKIPPED: &str = "SKIPPED";

/// Field of a result record that names its feature
pub const FEATURE_REF_KEY: &str = "featureId";
/// Field of a result record that names its suite
pub const SUITE_REF_KEY: &str = "suiteId";

pub const DEFAULT_DATE_FORMAT: &str = "m/d/yy h:mm";

pub const SUITE_HEADERS: [&str; 8] =
    ["ID", "Date", "Name", "Hostname", "IP", "Username", "Profiles", "Environment Variables"];

/// Emphasised font size for the longest-duration cell, in percent
const LONGEST_FONT_SCALE: u16 = 150;

/// Row fill for a status label; unrecognized labels get none
pub fn status_fill(label: &str) -> Option<Fill> {
    match label {
        STATUS_SKIPPED => Some(Fill::Tan),
        STATUS_PASSED => Some(Fill::Lime),
        STATUS_FAILED => Some(Fill::Rose),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Finalized,
}

#[derive(Debug)]
pub struct CorrelationState {
    phase: Phase,
    date_format: String,

    suites: Vec<Suite>,
    suite_index: HashMap<String, usize>,
    features: HashMap<String, Feature>,

    statuses: Vec<(CellRef, String)>,
    theme_order: Vec<String>,
    themes: HashMap<String, Vec<CellRef>>,

    longest_duration: Option<i64>,
    longest_cells: Vec<CellRef>,
}

impl Default for CorrelationState {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrelationState {
    pub fn new() -> Self {
        Self::with_date_format(DEFAULT_DATE_FORMAT)
    }

    /// Create a state whose suites sheet renders dates with `date_format`
    pub fn with_date_format(date_format: &str) -> Self {
        Self {
            phase: Phase::Open,
            date_format: date_format.to_string(),
            suites: Vec::new(),
            suite_index: HashMap::new(),
            features: HashMap::new(),
            statuses: Vec::new(),
            theme_order: Vec::new(),
            themes: HashMap::new(),
            longest_duration: None,
            longest_cells: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn ensure_open(&self) -> Result<(), String> {
        match self.phase {
            Phase::Open => Ok(()),
            Phase::Finalized => Err("report already finalized".to_string()),
        }
    }

    // ---------------------------------------------------------------
    // Suite / feature tables
    // ---------------------------------------------------------------

    /// Store a suite; a later suite with the same id replaces the earlier one
    /// but keeps its position in the suites sheet.
    pub fn record_suite(&mut self, suite: Suite) -> Result<(), String> {
        self.ensure_open()?;
        match self.suite_index.get(&suite.id) {
            Some(&index) => {
                debug!("Suite '{}' replaced by a later record", suite.id);
                self.suites[index] = suite;
            }
            None => {
                self.suite_index.insert(suite.id.clone(), self.suites.len());
                self.suites.push(suite);
            }
        }
        Ok(())
    }

    pub fn record_feature(&mut self, feature: Feature) -> Result<(), String> {
        self.ensure_open()?;
        if let Some(previous) = self.features.insert(feature.id.clone(), feature) {
            debug!("Feature '{}' replaced by a later record", previous.id);
        }
        Ok(())
    }

    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Feature referenced by a result, if it has been seen yet
    pub fn lookup_feature(&self, result: &JsonObject) -> Option<&Feature> {
        get_string(result, FEATURE_REF_KEY).and_then(|id| self.features.get(&id))
    }

    /// Suite referenced by a result, if it has been seen yet
    pub fn lookup_suite(&self, result: &JsonObject) -> Option<&Suite> {
        get_string(result, SUITE_REF_KEY).and_then(|id| self.suite_index.get(&id)).map(|&i| &self.suites[i])
    }

    // ---------------------------------------------------------------
    // Annotations
    // ---------------------------------------------------------------

    /// Make `cell` the status anchor of its row
    pub fn annotate_status(&mut self, cell: CellRef, label: &str) -> Result<(), String> {
        self.ensure_open()?;
        self.statuses.push((cell, label.to_string()));
        Ok(())
    }

    /// Record that `cell` displays each of `themes`
    pub fn annotate_themes<I, S>(&mut self, cell: CellRef, themes: I) -> Result<(), String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_open()?;
        for theme in themes {
            let theme = theme.into();
            if !self.themes.contains_key(&theme) {
                self.theme_order.push(theme.clone());
            }
            let cells = self.themes.entry(theme).or_default();
            if cells.last() != Some(&cell) {
                cells.push(cell);
            }
        }
        Ok(())
    }

    /// Record the execution time shown in `cell`, tracking the run-wide maximum.
    ///
    /// Ties with the current maximum are all retained; a strictly greater
    /// value resets the tied set.
    pub fn annotate_duration(&mut self, cell: CellRef, duration_ms: i64) -> Result<(), String> {
        self.ensure_open()?;
        match self.longest_duration {
            Some(max) if duration_ms < max => {}
            Some(max) if duration_ms == max => self.longest_cells.push(cell),
            _ => {
                self.longest_duration = Some(duration_ms);
                self.longest_cells.clear();
                self.longest_cells.push(cell);
            }
        }
        Ok(())
    }

    pub fn longest_duration(&self) -> Option<i64> {
        self.longest_duration
    }

    pub fn longest_duration_cells(&self) -> &[CellRef] {
        &self.longest_cells
    }

    /// Rows grouped by status label, in row order within each label
    pub fn status_rows(&self) -> BTreeMap<&str, Vec<usize>> {
        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (cell, label) in &self.statuses {
            groups.entry(label.as_str()).or_default().push(cell.row);
        }
        groups
    }

    /// Rows holding at least one FAILED status cell
    pub fn failed_rows(&self) -> BTreeSet<usize> {
        self.statuses.iter().filter(|(_, label)| label == STATUS_FAILED).map(|(cell, _)| cell.row).collect()
    }

    /// Themes with at least one occurrence in a failed row, in first-seen order
    pub fn compromised_themes(&self) -> Vec<&str> {
        let failed = self.failed_rows();
        if failed.is_empty() {
            return Vec::new();
        }
        self.theme_order
            .iter()
            .filter(|theme| self.themes[theme.as_str()].iter().any(|cell| failed.contains(&cell.row)))
            .map(|theme| theme.as_str())
            .collect()
    }

    /// Every cell, anywhere in the sheet, carrying a compromised theme
    pub fn compromised_cells(&self) -> BTreeSet<CellRef> {
        self.compromised_themes().into_iter().flat_map(|theme| self.themes[theme].iter().copied()).collect()
    }

    // ---------------------------------------------------------------
    // Finalization
    // ---------------------------------------------------------------

    /// Apply the deferred formatting to the results sheet and render the
    /// suites sheet. Must run after the last record has been consumed.
    pub fn finalize(&mut self, document: &mut Document) -> Result<(), String> {
        self.ensure_open()?;

        debug!(
            "Finalizing: {} status cells, {} themes, longest duration {:?} ({} cells)",
            self.statuses.len(),
            self.theme_order.len(),
            self.longest_duration(),
            self.longest_duration_cells().len()
        );

        self.highlight_longest_durations(&mut document.results);
        self.color_rows_by_status(&mut document.results);
        self.mark_compromised_themes(&mut document.results);
        self.render_suites(&mut document.suites);

        self.phase = Phase::Finalized;
        Ok(())
    }

    fn highlight_longest_durations(&self, sheet: &mut Sheet) {
        for &at in self.longest_duration_cells() {
            let Some(row) = sheet.row_mut(at.row) else {
                continue;
            };
            let last = row.len().saturating_sub(1);

            for (col, cell) in row.iter_mut().enumerate() {
                let style = &mut cell.style;
                style.borders.top = BorderWeight::Medium;
                style.borders.bottom = BorderWeight::Medium;

                if col == at.col {
                    style.borders.left = BorderWeight::Medium;
                    style.borders.right = BorderWeight::Medium;
                    style.bold = true;
                    style.font_color = Some(FontColor::DarkRed);
                    style.font_scale = LONGEST_FONT_SCALE;
                } else if col == 0 {
                    style.borders.left = BorderWeight::Medium;
                } else if col == last {
                    style.borders.right = BorderWeight::Medium;
                }
            }
        }
    }

    fn color_rows_by_status(&self, sheet: &mut Sheet) {
        for (label, rows) in self.status_rows() {
            let Some(fill) = status_fill(label) else {
                debug!("No fill for status '{}' ({} rows)", label, rows.len());
                continue;
            };
            for row in rows {
                if let Some(cells) = sheet.row_mut(row) {
                    cells.iter_mut().for_each(|cell| fill_cell(cell, fill));
                }
            }
        }
    }

    fn mark_compromised_themes(&self, sheet: &mut Sheet) {
        let cells = self.compromised_cells();
        debug!("Marking {} compromised theme cells", cells.len());
        for at in cells {
            if let Some(cell) = sheet.cell_mut(at) {
                cell.style.bold = true;
                cell.style.font_color = Some(FontColor::DarkRed);
            }
        }
    }

    fn render_suites(&self, sheet: &mut Sheet) {
        sheet.push_text_row(&SUITE_HEADERS, &CellStyle::header());

        for suite in &self.suites {
            let text = |s: Option<&String>| Cell {
                value: CellValue::Text(s.cloned().unwrap_or_default()),
                style: CellStyle::default(),
            };
            let wrapped = |s: Option<String>| match s {
                Some(s) => Cell {
                    value: CellValue::Text(s),
                    style: CellStyle { wrap: true, ..CellStyle::default() },
                },
                None => Cell::default(),
            };

            let date = match suite.start_timestamp {
                Some(ts) => Cell {
                    value: CellValue::DateTime(ts),
                    style: CellStyle { num_format: Some(self.date_format.clone()), ..CellStyle::default() },
                },
                None => Cell::default(),
            };

            let profiles = suite.profiles.as_ref().map(|p| p.join("\n"));
            let environment = suite
                .environment
                .as_ref()
                .map(|env| env.iter().map(|(k, v)| format!("{}={}", k, v)).collect::<Vec<_>>().join("\n"));

            sheet.push_cells(vec![
                text(Some(&suite.id)),
                date,
                text(suite.name.as_ref()),
                text(suite.host.name.as_ref()),
                text(suite.host.ip.as_ref()),
                text(suite.host.username.as_ref()),
                wrapped(profiles),
                wrapped(environment),
            ]);
        }
    }
}

/// Give a cell a status fill, drawing thin black edges where none exist
fn fill_cell(cell: &mut Cell, fill: Fill) {
    let style = &mut cell.style;
    style.fill = Some(fill);
    let borders = &mut style.borders;
    for edge in [&mut borders.top, &mut borders.bottom, &mut borders.left, &mut borders.right] {
        if *edge == BorderWeight::None {
            *edge = BorderWeight::Thin;
        }
    }
    style.border_color.get_or_insert(FontColor::Black);
}

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;
