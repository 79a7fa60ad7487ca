use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};

use crate::domain::entities::filter::DateRange;
use crate::domain::entities::records::{CellValue, ListRow};

pub const INFO_SHEET: &str = "Info";

/// Writes `rows` to a sheet named `sheet_name`, plus an info sheet with the
/// export date and the active date range.
pub fn rows_to_xlsx<R: ListRow>(
    rows: &[R],
    sheet_name: &str,
    exported_on: NaiveDate,
    range: Option<DateRange>,
) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let currency_format = Format::new().set_num_format("#,##0.00");
    let percent_format = Format::new().set_num_format("0.0\"%\"");

    let sheet = workbook.add_worksheet();
    sheet
        .set_name(sheet_name)
        .with_context(|| format!("invalid sheet name: {sheet_name}"))?;

    for (col_idx, column) in R::columns().iter().enumerate() {
        sheet
            .write_string_with_format(0, col_idx as u16, column.label, &header_format)
            .context("failed to write xlsx header")?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let xlsx_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.cells().iter().enumerate() {
            let col = col_idx as u16;
            let written = match cell {
                CellValue::Text(text) => sheet.write_string(xlsx_row, col, text.as_str()),
                CellValue::Integer(value) => sheet.write_number(xlsx_row, col, *value as f64),
                CellValue::Currency(value) => {
                    sheet.write_number_with_format(xlsx_row, col, *value, &currency_format)
                }
                CellValue::Percent(value) => {
                    sheet.write_number_with_format(xlsx_row, col, *value, &percent_format)
                }
                CellValue::Empty => continue,
            };
            written.context("failed to write xlsx cell")?;
        }
    }

    let exported_text = exported_on.to_string();
    let info = workbook.add_worksheet();
    info.set_name(INFO_SHEET)
        .context("invalid info sheet name")?;
    info.write_string_with_format(0, 0, "Exported", &header_format)
        .and_then(|sheet| sheet.write_string(0, 1, exported_text.as_str()))
        .and_then(|sheet| sheet.write_string_with_format(1, 0, "Rows", &header_format))
        .and_then(|sheet| sheet.write_number(1, 1, rows.len() as f64))
        .context("failed to write xlsx info sheet")?;
    if let Some(range) = range {
        let from_text = range.from.to_string();
        let to_text = range.to.to_string();
        info.write_string_with_format(2, 0, "From", &header_format)
            .and_then(|sheet| sheet.write_string(2, 1, from_text.as_str()))
            .and_then(|sheet| sheet.write_string_with_format(3, 0, "To", &header_format))
            .and_then(|sheet| sheet.write_string(3, 1, to_text.as_str()))
            .context("failed to write xlsx date range")?;
    }

    workbook
        .save_to_buffer()
        .context("failed to encode xlsx workbook")
}
