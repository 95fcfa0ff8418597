use crate::export::cell::Cell;
use crate::export::ExportError;
use polars::prelude::DataFrame;
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook};

pub const SHEET_NAME: &str = "Events";

const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

/// Writes `frame` to an in-memory XLSX workbook with a single [`SHEET_NAME`] sheet.
pub fn to_xlsx(frame: &DataFrame) -> Result<Vec<u8>, ExportError> {
    let (rows, columns) = frame.shape();
    if rows + 1 > MAX_ROWS || columns > MAX_COLUMNS {
        return Err(ExportError::SheetTooLarge { rows, columns });
    }

    let header = Format::new().set_bold();
    let datetime = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let date = Format::new().set_num_format("yyyy-mm-dd");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (index, column) in frame.get_columns().iter().enumerate() {
        // Bounds were checked above.
        let col = index as ColNum;
        worksheet.write_string_with_format(0, col, column.name().as_str(), &header)?;

        let series = column.as_materialized_series();
        for row in 0..rows {
            let excel_row = (row + 1) as RowNum;
            match Cell::from(series.get(row)?) {
                Cell::Null => {}
                Cell::Bool(b) => {
                    worksheet.write_boolean(excel_row, col, b)?;
                }
                Cell::Int(v) => {
                    worksheet.write_number(excel_row, col, v as f64)?;
                }
                Cell::Float(v) if v.is_finite() => {
                    worksheet.write_number(excel_row, col, v)?;
                }
                Cell::Float(_) => {}
                Cell::Text(s) => {
                    worksheet.write_string(excel_row, col, s)?;
                }
                Cell::DateTime(dt) => {
                    worksheet.write_datetime_with_format(excel_row, col, &dt, &datetime)?;
                }
                Cell::Date(d) => {
                    worksheet.write_datetime_with_format(excel_row, col, &d, &date)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
