//! CLI command handlers

pub mod commands;

pub use commands::{column, dump, sheets, ColumnArg, DumpFormat};
