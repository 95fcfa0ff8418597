//! Writers turning the combined event frame into CSV, XLSX and JSON artifacts.

mod cell;
mod csv;
mod json;
mod xlsx;

pub use self::csv::{to_csv, CSV_DATETIME_FORMAT};
pub use self::json::{to_json, to_json_records, JSON_DATETIME_FORMAT};
pub use self::xlsx::{to_xlsx, SHEET_NAME};

use polars::prelude::PolarsError;
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write CSV")]
    Csv(#[source] PolarsError),

    #[error("Failed to read event frame")]
    Frame(#[from] PolarsError),

    #[error("Failed to write XLSX workbook")]
    Xlsx(#[from] XlsxError),

    #[error("Failed to serialize events as JSON")]
    Json(#[from] serde_json::Error),

    #[error("{rows} rows by {columns} columns do not fit in one worksheet")]
    SheetTooLarge { rows: usize, columns: usize },
}
