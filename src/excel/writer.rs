//! SheetModel → xlsx through rust_xlsxwriter

use super::options::{ColumnWidth, ExportOptions, SpreadsheetFormat};
use crate::error::{TabulaError, TabulaResult};
use crate::model::{ColumnStyle, HorizontalAlign, SheetCell, SheetModel};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatUnderline, Workbook, Worksheet};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Padding added to measured text before clamping.
const AUTO_WIDTH_PADDING: f64 = 2.0;

fn export_err(what: &str) -> impl Fn(rust_xlsxwriter::XlsxError) -> TabulaError + '_ {
    move |e| TabulaError::Export(format!("Failed to {}: {}", what, e))
}

/// Lay out every sheet into a new workbook.
pub(crate) fn build_workbook(sheets: &[SheetModel], options: &ExportOptions) -> TabulaResult<Workbook> {
    if options.format == SpreadsheetFormat::Xls {
        return Err(TabulaError::UnsupportedFormat(
            "writing legacy .xls workbooks is not supported, use xlsx".to_string(),
        ));
    }

    // Excel compares sheet names case-insensitively
    let mut titles = HashSet::new();
    for sheet in sheets {
        if !titles.insert(sheet.title.to_lowercase()) {
            return Err(TabulaError::Export(format!(
                "Duplicate sheet title '{}'",
                sheet.title
            )));
        }
    }

    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet.title)
            .map_err(export_err("set worksheet name"))?;
        write_sheet(worksheet, sheet, options.width)?;
    }
    Ok(workbook)
}

pub(crate) fn to_bytes(sheets: &[SheetModel], options: &ExportOptions) -> TabulaResult<Vec<u8>> {
    let mut workbook = build_workbook(sheets, options)?;
    workbook
        .save_to_buffer()
        .map_err(export_err("serialise workbook"))
}

pub(crate) fn to_file(sheets: &[SheetModel], options: &ExportOptions, path: &Path) -> TabulaResult<()> {
    let mut workbook = build_workbook(sheets, options)?;
    workbook.save(path).map_err(export_err("save Excel file"))
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &SheetModel,
    width: Option<ColumnWidth>,
) -> TabulaResult<()> {
    debug!(sheet = %sheet.title, rows = sheet.rows.len(), "writing worksheet");

    for (col_idx, column) in sheet.columns.iter().enumerate() {
        let col = col_idx as u16;
        match &column.header_style {
            Some(style) => worksheet
                .write_string_with_format(0, col, &column.header, &to_format(style))
                .map_err(export_err("write header"))?,
            None => worksheet
                .write_string(0, col, &column.header)
                .map_err(export_err("write header"))?,
        };
    }

    for (col_idx, column) in sheet.columns.iter().enumerate() {
        let col = col_idx as u16;
        let format = column.cell_style.as_ref().map(to_format);

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let excel_row = (row_idx + 1) as u32;
            let Some(cell) = row.get(&column.title) else {
                continue;
            };
            match (cell, &format) {
                (SheetCell::Formula(text), Some(fmt)) => worksheet
                    .write_formula_with_format(excel_row, col, text.as_str(), fmt)
                    .map_err(export_err("write formula"))?,
                (SheetCell::Formula(text), None) => worksheet
                    .write_formula(excel_row, col, text.as_str())
                    .map_err(export_err("write formula"))?,
                (SheetCell::Value(text), Some(fmt)) if text.is_empty() => worksheet
                    .write_blank(excel_row, col, fmt)
                    .map_err(export_err("write cell"))?,
                (SheetCell::Value(text), _) if text.is_empty() => continue,
                (SheetCell::Value(text), Some(fmt)) => worksheet
                    .write_string_with_format(excel_row, col, text, fmt)
                    .map_err(export_err("write cell"))?,
                (SheetCell::Value(text), None) => worksheet
                    .write_string(excel_row, col, text)
                    .map_err(export_err("write cell"))?,
            };
        }

        if let Some(policy) = width {
            worksheet
                .set_column_width(col, column_width(sheet, col_idx, policy))
                .map_err(export_err("set column width"))?;
        }
    }

    Ok(())
}

/// Width of column `col_idx` under `policy`. Formula cells are not measured.
pub(crate) fn column_width(sheet: &SheetModel, col_idx: usize, policy: ColumnWidth) -> f64 {
    match policy {
        ColumnWidth::Fixed(width) => width,
        ColumnWidth::Auto { min, max } => {
            let Some(column) = sheet.columns.get(col_idx) else {
                return min;
            };
            let widest = sheet
                .rows
                .iter()
                .filter_map(|row| match row.get(&column.title) {
                    Some(SheetCell::Value(text)) => Some(display_width(text)),
                    _ => None,
                })
                .fold(display_width(&column.header), f64::max);
            (widest + AUTO_WIDTH_PADDING).min(max).max(min)
        }
    }
}

/// Character width of `text`, counting East Asian wide characters as two.
pub fn display_width(text: &str) -> f64 {
    text.chars()
        .map(|c| if is_wide(c) { 2.0 } else { 1.0 })
        .sum()
}

fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x20000..=0x2FFFD
    )
}

fn to_format(style: &ColumnStyle) -> Format {
    let mut format = Format::new();

    if style.bold {
        format = format.set_bold();
    }
    if style.italic {
        format = format.set_italic();
    }
    if style.underline {
        format = format.set_underline(FormatUnderline::Single);
    }
    if style.strikeout {
        format = format.set_font_strikethrough();
    }
    if let Some(name) = &style.font_name {
        format = format.set_font_name(name);
    }
    if let Some(size) = style.font_size {
        format = format.set_font_size(size);
    }
    if let Some(rgb) = style.font_color {
        format = format.set_font_color(Color::RGB(rgb));
    }

    match style.align {
        HorizontalAlign::General => format,
        HorizontalAlign::Left => format.set_align(FormatAlign::Left),
        HorizontalAlign::Center => format.set_align(FormatAlign::Center),
        HorizontalAlign::Right => format.set_align(FormatAlign::Right),
        HorizontalAlign::Justify => format.set_align(FormatAlign::Justify),
        HorizontalAlign::Fill => format.set_align(FormatAlign::Fill),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExcelColumn, SheetRow};
    use crate::types::FieldKind;

    fn sheet(title: &str, header: &str, values: &[&str]) -> SheetModel {
        SheetModel {
            title: title.to_string(),
            columns: vec![ExcelColumn::field(
                1,
                "T".to_string(),
                header.to_string(),
                "t".to_string(),
                FieldKind::Text,
            )],
            rows: values
                .iter()
                .map(|v| {
                    let mut row = SheetRow::new();
                    row.insert("T".to_string(), SheetCell::Value(v.to_string()));
                    row
                })
                .collect(),
        }
    }

    #[test]
    fn test_display_width_counts_cjk_double() {
        assert_eq!(display_width("abc"), 3.0);
        assert_eq!(display_width("北京"), 4.0);
        assert_eq!(display_width("a北"), 3.0);
    }

    #[test]
    fn test_auto_width_is_clamped() {
        let s = sheet("S", "Name", &["a much longer value than the header"]);
        assert_eq!(column_width(&s, 0, ColumnWidth::Auto { min: 5.0, max: 20.0 }), 20.0);

        let s = sheet("S", "N", &["ab"]);
        assert_eq!(column_width(&s, 0, ColumnWidth::Auto { min: 8.0, max: 20.0 }), 8.0);

        let s = sheet("S", "Header", &["城市名称"]);
        assert_eq!(column_width(&s, 0, ColumnWidth::Auto { min: 1.0, max: 50.0 }), 10.0);
        assert_eq!(column_width(&s, 0, ColumnWidth::Fixed(13.0)), 13.0);
    }

    #[test]
    fn test_xls_output_rejected() {
        let options = ExportOptions::new().format(SpreadsheetFormat::Xls);
        let err = to_bytes(&[sheet("S", "T", &[])], &options).unwrap_err();
        assert!(matches!(err, TabulaError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_duplicate_sheet_titles_rejected() {
        let sheets = [sheet("Data", "T", &[]), sheet("data", "T", &[])];
        let err = to_bytes(&sheets, &ExportOptions::new()).unwrap_err();
        assert!(matches!(err, TabulaError::Export(msg) if msg.contains("data")));
    }

    #[test]
    fn test_bytes_are_a_zip_container() {
        let bytes = to_bytes(&[sheet("S", "T", &["x"])], &ExportOptions::new()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
