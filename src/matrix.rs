/// Report orchestration
///
/// This module handles:
/// - Classifying each incoming record and dispatching it
/// - Building one results row per result record through the configured columns
/// - Finalizing the correlation state once the stream is exhausted
use crate::columns::Column;
use crate::config::ReportConfig;
use crate::json_helpers::describe_keys;
use crate::record::RecordKind;
use crate::sheet::{CellRef, CellStyle, Document};
use crate::state::CorrelationState;
use crate::types::{Feature, JsonObject, Suite};
use log::{debug, warn};

/// Counts reported after a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub results: usize,
    pub features: usize,
    pub suites: usize,
    /// Results whose status was FAILED
    pub failed: usize,
    /// Records of unrecognized shape
    pub skipped: usize,
}

pub struct TraceabilityMatrix {
    columns: Vec<Box<dyn Column>>,
    results_sheet: String,
    suites_sheet: String,
    date_format: String,
}

impl TraceabilityMatrix {
    pub fn from_config(config: &ReportConfig) -> Result<Self, String> {
        Ok(Self {
            columns: config.build_columns()?,
            results_sheet: config.results_sheet.clone(),
            suites_sheet: config.suites_sheet.clone(),
            date_format: config.date_format.clone(),
        })
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label()).collect()
    }

    /// Consume every record, then finalize and return the finished document.
    ///
    /// The first error from the record source aborts the run; no partial
    /// document is returned.
    pub fn create_report<I>(&self, records: I) -> Result<(Document, ReportSummary), String>
    where
        I: IntoIterator<Item = Result<JsonObject, String>>,
    {
        let mut document = Document::new(&self.results_sheet, &self.suites_sheet);
        let mut state = CorrelationState::with_date_format(&self.date_format);
        let mut summary = ReportSummary::default();

        document.results.push_text_row(&self.labels(), &CellStyle::header());

        for (index, record) in records.into_iter().enumerate() {
            let record = record?;
            let kind = RecordKind::classify(&record);
            debug!("Record {}: {}", index, kind);

            match kind {
                RecordKind::Suite => {
                    if let Some(payload) = kind.unwrap(&record) {
                        state.record_suite(Suite::from_json(payload))?;
                    }
                }
                RecordKind::Feature => {
                    if let Some(payload) = kind.unwrap(&record) {
                        state.record_feature(Feature::from_json(payload))?;
                    }
                }
                RecordKind::Result => {
                    if let Some(payload) = kind.unwrap(&record) {
                        self.add_result(&mut state, &mut document, payload)?;
                        summary.results += 1;
                    }
                }
                RecordKind::Unknown => {
                    warn!("Skipping record {} of unrecognized shape: {}", index, describe_keys(&record));
                    summary.skipped += 1;
                }
            }
        }

        state.finalize(&mut document)?;
        debug!(
            "Finished sheets: '{}' {} rows, '{}' {} rows",
            document.results.name(),
            document.results.row_count(),
            document.suites.name(),
            document.suites.row_count()
        );

        summary.features = state.feature_count();
        summary.suites = state.suites().len();
        summary.failed = state.failed_rows().len();
        Ok((document, summary))
    }

    fn add_result(
        &self,
        state: &mut CorrelationState,
        document: &mut Document,
        result: &JsonObject,
    ) -> Result<(), String> {
        let row = document.results.push_row(self.columns.len());
        for (col, column) in self.columns.iter().enumerate() {
            let at = CellRef::new(row, col);
            let Some(cell) = document.results.cell_mut(at) else {
                continue;
            };
            column
                .add_result(state, cell, at, result)
                .map_err(|e| format!("Failed to fill column '{}' of row {}: {}", column.label(), row, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "matrix_test.rs"]
mod matrix_test;
