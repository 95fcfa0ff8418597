use crate::events::error::FetchError;
use crate::export::ExportError;
use crate::types::event_query::ValidationError;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DonkiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Failed to process event table")]
    Frame(#[from] PolarsError),
}
