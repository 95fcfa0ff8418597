pub mod aggregate;
pub mod filtering;
pub mod merge;
pub mod normalize;
