use std::collections::HashSet;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use crate::domain::entities::filter::DateRange;
use crate::domain::entities::records::ListRow;
use crate::domain::entities::selection::SelectionStore;
use crate::infra::export::csv::rows_to_csv;
use crate::infra::export::xlsx::rows_to_xlsx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Xlsx => "Excel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// `leads-2026-10-16.csv`, or with an active range
/// `leads-2026-10-16_2026-07-01_to_2026-09-30.csv`.
pub fn export_filename(
    prefix: &str,
    today: NaiveDate,
    range: Option<DateRange>,
    format: ExportFormat,
) -> String {
    let mut name = format!("{prefix}-{}", today.format("%Y-%m-%d"));
    if let Some(range) = range {
        name.push_str(&format!(
            "_{}_to_{}",
            range.from.format("%Y-%m-%d"),
            range.to.format("%Y-%m-%d")
        ));
    }
    format!("{name}.{}", format.extension())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRows<R> {
    pub rows: Vec<R>,
    /// Selected ids with no loaded row behind them.
    pub missing: usize,
}

/// With an empty selection, every row currently shown. Otherwise every
/// selected row found in `loaded`, whichever page it came from, in the
/// order first seen.
pub fn rows_for_export<'a, R: ListRow>(
    shown: &[R],
    loaded: impl IntoIterator<Item = &'a R>,
    selection: &SelectionStore<String>,
) -> ExportRows<R> {
    if selection.is_empty() {
        return ExportRows {
            rows: shown.to_vec(),
            missing: 0,
        };
    }

    let mut seen = HashSet::new();
    let rows: Vec<R> = loaded
        .into_iter()
        .filter(|row| {
            let id = row.row_id();
            selection.is_selected(&id) && seen.insert(id)
        })
        .cloned()
        .collect();
    let missing = selection.selected_count().saturating_sub(rows.len());
    ExportRows { rows, missing }
}

pub struct ExportService {
    prefix: String,
    sheet_name: String,
}

impl ExportService {
    pub fn new(prefix: impl Into<String>, sheet_name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            sheet_name: sheet_name.into(),
        }
    }

    pub fn export<R: ListRow>(
        &self,
        rows: &[R],
        format: ExportFormat,
        today: NaiveDate,
        range: Option<DateRange>,
    ) -> Result<ExportFile> {
        let bytes = match format {
            ExportFormat::Csv => rows_to_csv(rows)?,
            ExportFormat::Xlsx => rows_to_xlsx(rows, &self.sheet_name, today, range)?,
        };
        let filename = export_filename(&self.prefix, today, range, format);
        info!(%filename, rows = rows.len(), "export prepared");
        Ok(ExportFile { filename, bytes })
    }
}
