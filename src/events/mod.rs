pub mod cache;
pub mod error;
pub mod fetcher;
pub mod source;
