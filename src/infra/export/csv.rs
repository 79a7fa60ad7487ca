use anyhow::{Context, Result};

use crate::domain::entities::records::{CellValue, ListRow};

fn plain_value(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(text) => text.clone(),
        CellValue::Integer(value) => value.to_string(),
        CellValue::Currency(value) => format!("{value:.2}"),
        CellValue::Percent(value) => format!("{value:.1}"),
        CellValue::Empty => String::new(),
    }
}

/// Header row of column labels, then one record per row. Numbers stay
/// unformatted so spreadsheets can sum them.
pub fn rows_to_csv<R: ListRow>(rows: &[R]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(R::columns().iter().map(|col| col.label))
        .context("failed to write csv header")?;

    for row in rows {
        let record: Vec<String> = row.cells().iter().map(plain_value).collect();
        writer
            .write_record(&record)
            .context("failed to write csv record")?;
    }

    writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush csv buffer: {err}"))
}
