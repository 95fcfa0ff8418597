use crate::export::ExportError;
use polars::prelude::{Column, CsvWriter, DataFrame, DataType, PolarsResult, SerWriter};

pub const CSV_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes `frame` as UTF-8 CSV with a header row.
pub fn to_csv(frame: &DataFrame) -> Result<Vec<u8>, ExportError> {
    let mut frame = without_null_columns(frame).map_err(ExportError::Csv)?;
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_datetime_format(Some(CSV_DATETIME_FORMAT.to_string()))
        .finish(&mut frame)
        .map_err(ExportError::Csv)?;
    Ok(buffer)
}

/// Null-typed columns (no value in any row) are written as empty text fields.
fn without_null_columns(frame: &DataFrame) -> PolarsResult<DataFrame> {
    let columns = frame
        .get_columns()
        .iter()
        .map(|column| match column.dtype() {
            DataType::Null => column.cast(&DataType::String),
            _ => Ok(column.clone()),
        })
        .collect::<PolarsResult<Vec<Column>>>()?;
    DataFrame::new(columns)
}
