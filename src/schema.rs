//! Database Schema Model
//!
//! In-memory description of the tables a question can be asked about, as read
//! from `information_schema`, plus the text rendering that is shown to the
//! user and injected into the model prompt.
//!
//! ## Rendered form
//!
//! ```text
//! Table: orders
//!   Columns: id (integer), customer_id (integer), total (numeric)
//!   Primary Key: id
//!   Foreign Key: customer_id references customers(id)
//!
//! Table: customers
//!   Columns: id (integer), name (text)
//!   Primary Key: id
//! ```
//!
//! Every table block ends with an empty line, so blocks are separated by a
//! blank line. Front ends split on `"\n\n"` to recover one block per table.

use serde::{Deserialize, Serialize};

/// A single column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    /// Column default expression as reported by the catalog
    #[serde(default)]
    pub default: Option<String>,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            default: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Foreign key reference from one column to a column of another table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

impl ForeignKey {
    pub fn new(
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
        }
    }

    /// `table(column)` form used in the rendered schema
    pub fn references(&self) -> String {
        format!("{}({})", self.referenced_table, self.referenced_column)
    }
}

/// One table: columns in ordinal order, primary key columns, foreign keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
    #[serde(default)]
    pub primary_keys: Vec<String>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnSchema) -> Self {
        self.columns.push(column);
        self
    }

    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_keys.push(column.into());
        self
    }

    pub fn foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Append this table's block (including the trailing empty line).
    fn render_into(&self, lines: &mut Vec<String>) {
        lines.push(format!("Table: {}", self.name));

        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} ({})", c.name, c.data_type))
            .collect();
        lines.push(format!("  Columns: {}", columns.join(", ")));

        if !self.primary_keys.is_empty() {
            lines.push(format!("  Primary Key: {}", self.primary_keys.join(", ")));
        }

        for fk in &self.foreign_keys {
            lines.push(format!(
                "  Foreign Key: {} references {}",
                fk.column,
                fk.references()
            ));
        }

        lines.push(String::new());
    }
}

/// Cross-table edge derived from a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
}

/// Complete schema of the `public` namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub tables: Vec<TableSchema>,
    pub relationships: Vec<Relationship>,
}

impl DatabaseSchema {
    /// Build a schema from tables, deriving relationships from their foreign keys.
    pub fn from_tables(tables: Vec<TableSchema>) -> Self {
        let relationships = tables
            .iter()
            .flat_map(|table| {
                table.foreign_keys.iter().map(move |fk| Relationship {
                    source_table: table.name.clone(),
                    source_column: fk.column.clone(),
                    target_table: fk.referenced_table.clone(),
                    target_column: fk.referenced_column.clone(),
                })
            })
            .collect();

        Self {
            tables,
            relationships,
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Render the schema as text.
    ///
    /// `None` renders every table. `Some(names)` renders only the tables whose
    /// name appears in `names`, in schema order; an empty slice renders nothing.
    /// Unknown names are ignored.
    pub fn format(&self, filtered_tables: Option<&[String]>) -> String {
        let mut lines = Vec::new();
        for table in &self.tables {
            let included = match filtered_tables {
                None => true,
                Some(names) => names.iter().any(|n| *n == table.name),
            };
            if included {
                table.render_into(&mut lines);
            }
        }
        lines.join("\n")
    }
}
