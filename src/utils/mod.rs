pub mod format;
pub mod receipt;
