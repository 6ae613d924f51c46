//! Static schema descriptors for exportable record types
//!
//! A `SheetSchema` is declared once per record type (usually inside a
//! `OnceLock`) and lists the fields, their semantic types and the title
//! metadata that decides which fields become columns. Schemas can extend a
//! base schema; a field redeclared by name in the derived schema shadows the
//! inherited one.

mod record;

pub use record::{FromCellValue, SheetRecord};

use crate::types::FieldType;

/// Orders at or above this value were assigned implicitly.
pub const IMPLICIT_ORDER_BASE: i32 = 10_000;

/// Sheet name used when neither the schema chain nor the caller supplies one.
pub const DEFAULT_SHEET_TITLE: &str = "Sheet1";

/// Column title metadata on a field. An order of `0` means "unset".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTitle {
    pub title: String,
    pub order: i32,
}

impl ColumnTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            order: 0,
        }
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

/// Generic display metadata, consulted only when a field has no `ColumnTitle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName {
    pub name: String,
    pub order: Option<i32>,
}

impl DisplayName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: None,
        }
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }
}

/// One declared field of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub title: Option<ColumnTitle>,
    pub display: Option<DisplayName>,
}

impl FieldDescriptor {
    /// Title and explicit order (0 if unset), or `None` when the field is not exported.
    fn declared_title(&self) -> Option<(String, i32)> {
        if let Some(title) = &self.title {
            return Some((title.title.clone(), title.order));
        }
        self.display
            .as_ref()
            .map(|d| (d.name.clone(), d.order.unwrap_or(0)))
    }
}

/// A field paired with the title and order it is exported under.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberMapping {
    pub field: FieldDescriptor,
    pub title: String,
    pub order: i32,
}

/// Schema of one record type.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSchema {
    pub type_name: String,
    sheet_title: Option<String>,
    parent: Option<Box<SheetSchema>>,
    fields: Vec<FieldDescriptor>,
}

impl SheetSchema {
    pub fn builder(type_name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            schema: SheetSchema {
                type_name: type_name.into(),
                sheet_title: None,
                parent: None,
                fields: Vec::new(),
            },
        }
    }

    /// Fields declared directly on this type (not inherited).
    pub fn declared_fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn parent(&self) -> Option<&SheetSchema> {
        self.parent.as_deref()
    }

    /// Sheet title declared on this type itself.
    pub fn own_sheet_title(&self) -> Option<&str> {
        self.sheet_title.as_deref()
    }

    /// All visible fields, most-derived declaration winning on name clashes.
    ///
    /// Inherited fields come first (root ancestor first); a shadowing field
    /// takes the slot of the field it shadows.
    pub fn resolved_fields(&self) -> Vec<FieldDescriptor> {
        let mut chain: Vec<&SheetSchema> = Vec::new();
        let mut current = Some(self);
        while let Some(schema) = current {
            chain.push(schema);
            current = schema.parent();
        }

        let mut resolved: Vec<FieldDescriptor> = Vec::new();
        for schema in chain.into_iter().rev() {
            for field in &schema.fields {
                match resolved.iter().position(|f| f.name == field.name) {
                    Some(idx) => resolved[idx] = field.clone(),
                    None => resolved.push(field.clone()),
                }
            }
        }
        resolved
    }

    /// Exportable fields in output order.
    ///
    /// Fields without title metadata are skipped. Fields without an explicit
    /// order get `IMPLICIT_ORDER_BASE + n` in declaration order, so explicit
    /// orders always sort first.
    pub fn discover_columns(&self) -> Vec<MemberMapping> {
        let mut implicit = IMPLICIT_ORDER_BASE;
        let mut columns: Vec<MemberMapping> = Vec::new();

        for field in self.resolved_fields() {
            let Some((title, order)) = field.declared_title() else {
                continue;
            };
            let order = if order == 0 {
                let assigned = implicit;
                implicit += 1;
                assigned
            } else {
                order
            };
            columns.push(MemberMapping {
                field,
                title,
                order,
            });
        }

        columns.sort_by_key(|c| c.order);
        columns
    }

    /// Sheet name: own title, nearest ancestor's, the caller default, then `Sheet1`.
    pub fn resolve_sheet_title(&self, default: Option<&str>) -> String {
        let mut current = Some(self);
        while let Some(schema) = current {
            if let Some(title) = schema.own_sheet_title() {
                return title.to_string();
            }
            current = schema.parent();
        }
        default
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_SHEET_TITLE)
            .to_string()
    }
}

/// Builder for `SheetSchema`.
pub struct SchemaBuilder {
    schema: SheetSchema,
}

impl SchemaBuilder {
    /// Inherit every field (and the sheet title fallback) of `base`.
    pub fn extends(mut self, base: &SheetSchema) -> Self {
        self.schema.parent = Some(Box::new(base.clone()));
        self
    }

    pub fn sheet_title(mut self, title: impl Into<String>) -> Self {
        self.schema.sheet_title = Some(title.into());
        self
    }

    /// Declare an exported field.
    pub fn column(self, name: impl Into<String>, field_type: FieldType, title: ColumnTitle) -> Self {
        self.push(name.into(), field_type, Some(title), None)
    }

    /// Declare a field exported through generic display metadata.
    pub fn display(
        self,
        name: impl Into<String>,
        field_type: FieldType,
        display: DisplayName,
    ) -> Self {
        self.push(name.into(), field_type, None, Some(display))
    }

    /// Declare a field without title metadata (never exported).
    pub fn field(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.push(name.into(), field_type, None, None)
    }

    fn push(
        mut self,
        name: String,
        field_type: FieldType,
        title: Option<ColumnTitle>,
        display: Option<DisplayName>,
    ) -> Self {
        let descriptor = FieldDescriptor {
            name,
            field_type,
            title,
            display,
        };
        match self.schema.fields.iter().position(|f| f.name == descriptor.name) {
            Some(idx) => self.schema.fields[idx] = descriptor,
            None => self.schema.fields.push(descriptor),
        }
        self
    }

    pub fn build(self) -> SheetSchema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldKind;
    use pretty_assertions::assert_eq;

    fn text() -> FieldType {
        FieldType::required(FieldKind::Text)
    }

    fn base() -> SheetSchema {
        SheetSchema::builder("Person")
            .sheet_title("People")
            .column("name", text(), ColumnTitle::new("Name"))
            .column("email", text(), ColumnTitle::new("Email"))
            .build()
    }

    fn titles(schema: &SheetSchema) -> Vec<String> {
        schema.discover_columns().into_iter().map(|c| c.title).collect()
    }

    #[test]
    fn test_untitled_fields_are_excluded() {
        let schema = SheetSchema::builder("Row")
            .column("a", text(), ColumnTitle::new("A"))
            .field("secret", text())
            .build();
        assert_eq!(titles(&schema), vec!["A"]);
    }

    #[test]
    fn test_explicit_orders_sort_before_implicit() {
        let schema = SheetSchema::builder("Row")
            .column("first", text(), ColumnTitle::new("First"))
            .column("second", text(), ColumnTitle::new("Second"))
            .column("pinned", text(), ColumnTitle::new("Pinned").order(5))
            .column("early", text(), ColumnTitle::new("Early").order(1))
            .build();
        let columns = schema.discover_columns();
        let orders: Vec<i32> = columns.iter().map(|c| c.order).collect();
        assert_eq!(titles(&schema), vec!["Early", "Pinned", "First", "Second"]);
        assert_eq!(orders, vec![1, 5, IMPLICIT_ORDER_BASE, IMPLICIT_ORDER_BASE + 1]);
    }

    #[test]
    fn test_display_name_fallback() {
        let schema = SheetSchema::builder("Row")
            .display("nick", text(), DisplayName::new("Nickname").order(2))
            .column("id", text(), ColumnTitle::new("Id").order(1))
            .build();
        assert_eq!(titles(&schema), vec!["Id", "Nickname"]);
    }

    #[test]
    fn test_column_title_wins_over_display_name() {
        let field = FieldDescriptor {
            name: "x".to_string(),
            field_type: text(),
            title: Some(ColumnTitle::new("Title")),
            display: Some(DisplayName::new("Display")),
        };
        assert_eq!(field.declared_title(), Some(("Title".to_string(), 0)));
    }

    #[test]
    fn test_shadowed_field_uses_derived_title() {
        let derived = SheetSchema::builder("Employee")
            .extends(&base())
            .column("name", text(), ColumnTitle::new("Full name"))
            .column("team", text(), ColumnTitle::new("Team"))
            .build();
        assert_eq!(titles(&derived), vec!["Full name", "Email", "Team"]);
    }

    #[test]
    fn test_shadowing_without_title_hides_field() {
        let derived = SheetSchema::builder("Anonymous")
            .extends(&base())
            .field("name", text())
            .build();
        assert_eq!(titles(&derived), vec!["Email"]);
    }

    #[test]
    fn test_sheet_title_resolution() {
        let plain = SheetSchema::builder("Plain").build();
        let derived = SheetSchema::builder("Employee").extends(&base()).build();
        let retitled = SheetSchema::builder("Employee")
            .extends(&base())
            .sheet_title("Staff")
            .build();

        assert_eq!(derived.resolve_sheet_title(Some("Fallback")), "People");
        assert_eq!(retitled.resolve_sheet_title(None), "Staff");
        assert_eq!(plain.resolve_sheet_title(Some("Fallback")), "Fallback");
        assert_eq!(plain.resolve_sheet_title(None), DEFAULT_SHEET_TITLE);
        assert_eq!(plain.resolve_sheet_title(Some("")), DEFAULT_SHEET_TITLE);
    }

    #[test]
    fn test_empty_schema_has_no_columns() {
        let schema = SheetSchema::builder("Nothing").build();
        assert!(schema.discover_columns().is_empty());
    }
}
