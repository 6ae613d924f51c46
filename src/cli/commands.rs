use crate::address::{index_to_letters, letters_to_index};
use crate::config::TabulaConfig;
use crate::error::{TabulaError, TabulaResult};
use crate::excel::{ExcelImporter, ImportOptions};
use crate::model::DynamicRow;
use colored::Colorize;
use std::path::PathBuf;
use std::str::FromStr;

/// Output format for `dump`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DumpFormat {
    #[default]
    Json,
    Yaml,
}

/// A column given either as a 0-based index or as letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnArg(pub usize);

impl FromStr for ColumnArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            return s
                .parse::<usize>()
                .map(ColumnArg)
                .map_err(|e| format!("invalid column index '{}': {}", s, e));
        }
        letters_to_index(s)
            .map(ColumnArg)
            .ok_or_else(|| format!("'{}' is neither a column index nor column letters", s))
    }
}

/// Execute the sheets command
pub fn sheets(file: PathBuf) -> TabulaResult<()> {
    println!("{}", "📒 Tabula - Sheets".bold().green());
    println!("   File: {}\n", file.display());

    let names = ExcelImporter::sheet_names_in_file(&file)?;
    if names.is_empty() {
        println!("   {}", "(no sheets)".yellow());
    }
    for (idx, name) in names.iter().enumerate() {
        println!("   {:>3}  {}", idx + 1, name.bright_blue());
    }
    Ok(())
}

/// Execute the dump command: import the sheet as dynamic rows and print them.
pub fn dump(
    file: PathBuf,
    sheet: Option<String>,
    skip: Option<usize>,
    config: Option<PathBuf>,
    format: DumpFormat,
) -> TabulaResult<()> {
    let options = import_options(sheet, skip, config)?;
    let rows = ExcelImporter::new(options).import_dynamic_file(&file)?;
    eprintln!(
        "{} {} rows from {}",
        "📤".green(),
        rows.len().to_string().bold(),
        file.display()
    );
    println!("{}", render_rows(&rows, format)?);
    Ok(())
}

/// Execute the column command: letters ↔ index.
pub fn column(arg: String) -> TabulaResult<()> {
    let text = describe_column(&arg).map_err(TabulaError::InvalidExpression)?;
    println!("{}", text);
    Ok(())
}

/// `"115"` → `"115 → DL"`, `"dl"` → `"DL → 115"`.
pub(crate) fn describe_column(arg: &str) -> Result<String, String> {
    let trimmed = arg.trim();
    let ColumnArg(index) = ColumnArg::from_str(trimmed)?;
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        Ok(format!("{} → {}", index, index_to_letters(index)))
    } else {
        Ok(format!("{} → {}", trimmed.to_uppercase(), index))
    }
}

fn import_options(
    sheet: Option<String>,
    skip: Option<usize>,
    config: Option<PathBuf>,
) -> TabulaResult<ImportOptions> {
    let mut options = match config {
        Some(path) => TabulaConfig::from_path(&path)?.import_options(),
        None => ImportOptions::new(),
    };
    if let Some(name) = sheet {
        options.sheet_name = Some(name);
    }
    if let Some(rows) = skip {
        options.skip_rows = rows;
    }
    Ok(options)
}

pub(crate) fn render_rows(rows: &[DynamicRow], format: DumpFormat) -> TabulaResult<String> {
    Ok(match format {
        DumpFormat::Json => serde_json::to_string_pretty(rows)?,
        DumpFormat::Yaml => serde_yaml::to_string(rows)?,
    })
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
