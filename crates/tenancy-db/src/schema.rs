//! Declarative schema definition.
//!
//! Tables are described as data ([`Table`], [`Column`], [`ForeignKey`],
//! [`Index`]) and rendered to PostgreSQL DDL by [`codegen`]. The
//! canonical tables live in [`tables`].
//!
//! ```ignore
//! let users = Table::new("users")
//!     .column(Column::new("id", ColumnType::Uuid).primary_key().default(ColumnDefault::RandomUuid))
//!     .column(Column::new("email", ColumnType::Text).not_null())
//!     .index(Index::unique("idx_users_email", ["email"]));
//! ```

pub mod codegen;
pub mod tables;

use std::fmt;

/// Fractional-second digits used by timestamp columns unless overridden.
pub const DEFAULT_TIMESTAMP_PRECISION: u8 = 3;

/// PostgreSQL column types used by the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Uuid,
    Text,
    Boolean,
    /// `timestamp (P) with time zone`. `None` means
    /// [`DEFAULT_TIMESTAMP_PRECISION`].
    Timestamp { precision: Option<u8> },
}

impl ColumnType {
    /// Timestamp with the default millisecond precision.
    pub const fn timestamp() -> Self {
        ColumnType::Timestamp { precision: None }
    }

    /// Fractional-second digits kept by a timestamp column.
    pub fn precision(&self) -> Option<u8> {
        match self {
            ColumnType::Timestamp { precision } => {
                Some(precision.unwrap_or(DEFAULT_TIMESTAMP_PRECISION))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Uuid => write!(f, "uuid"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Timestamp { precision } => write!(
                f,
                "timestamp ({}) with time zone",
                precision.unwrap_or(DEFAULT_TIMESTAMP_PRECISION)
            ),
        }
    }
}

/// Default value expression of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    RandomUuid,
    Now,
    Bool(bool),
}

impl fmt::Display for ColumnDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnDefault::RandomUuid => write!(f, "gen_random_uuid()"),
            ColumnDefault::Now => write!(f, "NOW()"),
            ColumnDefault::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// Action taken on referencing rows when the referenced row changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    pub fn to_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "no action",
            ReferentialAction::Restrict => "restrict",
            ReferentialAction::Cascade => "cascade",
            ReferentialAction::SetNull => "set null",
            ReferentialAction::SetDefault => "set default",
        }
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub not_null: bool,
    pub default: Option<ColumnDefault>,
    /// Values the application accepts for a text column. Not enforced by
    /// the database.
    pub enum_values: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            primary_key: false,
            not_null: false,
            default: None,
            enum_values: Vec::new(),
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub fn enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Whether NULL can be stored. Primary keys are implicitly NOT NULL.
    pub fn is_nullable(&self) -> bool {
        !self.primary_key && !self.not_null
    }

    /// Whether an insert must supply a value: the column can be neither
    /// NULL nor defaulted.
    pub fn is_required_on_insert(&self) -> bool {
        !self.is_nullable() && self.default.is_none()
    }
}

/// A single-column foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

impl ForeignKey {
    pub fn new(
        column: impl Into<String>,
        references_table: impl Into<String>,
        references_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            references_table: references_table.into(),
            references_column: references_column.into(),
            on_delete: ReferentialAction::NoAction,
            on_update: ReferentialAction::NoAction,
        }
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    /// `<table>_<column>_<ref_table>_<ref_column>_fk`.
    pub fn constraint_name(&self, table: &str) -> String {
        format!(
            "{}_{}_{}_{}_fk",
            table, self.column, self.references_table, self.references_column
        )
    }
}

/// A btree index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Index {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    pub fn unique<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unique: true,
            ..Self::new(name, columns)
        }
    }
}

/// A table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn get_index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    pub fn get_foreign_key(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }

    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }
}

/// A complete schema. Tables are kept in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Renders the whole schema as a migration script.
    pub fn to_sql(&self) -> String {
        codegen::schema_to_sql(self)
    }
}
