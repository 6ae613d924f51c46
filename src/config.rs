//! YAML option files
//!
//! ```yaml
//! export:
//!   sheet_title: People
//!   width:
//!     auto: { min: 8, max: 40 }
//! import:
//!   sheet_name: People
//!   skip_rows: 1
//! headers:
//!   Name: 姓名
//!   City: 城市
//! ```
//!
//! `headers` renames declared column titles to the header text used in the
//! workbook, in both directions.

use crate::error::TabulaResult;
use crate::excel::{ColumnWidth, ExportOptions, ImportOptions, SpreadsheetFormat};
use crate::model::ColumnRemap;
use crate::types::FieldKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSection {
    pub format: SpreadsheetFormat,
    pub sheet_title: Option<String>,
    pub default_sheet_title: Option<String>,
    pub width: Option<ColumnWidth>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportSection {
    pub sheet_name: Option<String>,
    pub skip_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TabulaConfig {
    pub export: ExportSection,
    pub import: ImportSection,
    /// Declared title → header text
    pub headers: IndexMap<String, String>,
}

impl TabulaConfig {
    pub fn from_path(path: &Path) -> TabulaResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        debug!(path = %path.display(), renames = config.headers.len(), "loaded config");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> TabulaResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Header renames as a remapping function; `None` when there are none.
    pub fn remap(&self) -> Option<ColumnRemap> {
        if self.headers.is_empty() {
            return None;
        }
        let renames = self.headers.clone();
        Some(Arc::new(move |title: &str, _: &FieldKind| {
            renames
                .get(title)
                .cloned()
                .unwrap_or_else(|| title.to_string())
        }))
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            format: self.export.format,
            sheet_title: self.export.sheet_title.clone(),
            default_sheet_title: self.export.default_sheet_title.clone(),
            remap: self.remap(),
            width: self.export.width,
            ..Default::default()
        }
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            sheet_name: self.import.sheet_name.clone(),
            skip_rows: self.import.skip_rows,
            remap: self.remap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TabulaError;

    const SAMPLE: &str = r#"
export:
  sheet_title: People
  width:
    fixed: 14
import:
  sheet_name: People
  skip_rows: 2
headers:
  Name: 姓名
"#;

    #[test]
    fn test_parse_sample() {
        let config = TabulaConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.export.sheet_title.as_deref(), Some("People"));
        assert_eq!(config.export.width, Some(ColumnWidth::Fixed(14.0)));
        assert_eq!(config.import.skip_rows, 2);

        let import = config.import_options();
        assert_eq!(import.sheet_name.as_deref(), Some("People"));
        let remap = import.remap.unwrap();
        assert_eq!(remap("Name", &FieldKind::Text), "姓名");
        assert_eq!(remap("Age", &FieldKind::Integer), "Age");
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = TabulaConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, TabulaConfig::default());
        assert!(config.export_options().remap.is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = TabulaConfig::from_yaml_str("exprot: {}").unwrap_err();
        assert!(matches!(err, TabulaError::Yaml(_)));
    }
}
