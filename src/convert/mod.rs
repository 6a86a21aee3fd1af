pub mod converter;
pub mod merge;
