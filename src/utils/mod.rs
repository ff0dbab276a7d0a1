pub mod format;
pub mod precision;
