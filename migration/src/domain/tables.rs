use std::fmt::{Display, Formatter};

/// Represents table in a database, used for ddl generation
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKeyConstraint>,
    pub indexes: Vec<Index>,
}

/// Represents one column in the database table
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub not_null: bool,
    pub unique: bool,
    pub primary_key: bool,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigSerial,
    BigInt,
    Integer,
    Text,
    Varchar(u16),
    Boolean,
    TimestampTZ,
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::BigSerial => write!(f, "BIGSERIAL"),
            ColumnType::BigInt => write!(f, "BIGINT"),
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::Text => write!(f, "TEXT"),
            ColumnType::Varchar(len) => write!(f, "VARCHAR({})", len),
            ColumnType::Boolean => write!(f, "BOOLEAN"),
            ColumnType::TimestampTZ => write!(f, "TIMESTAMPTZ"),
        }
    }
}

/// Represents foreign key constraint in the database table
#[derive(Debug, Clone)]
pub struct ForeignKeyConstraint {
    pub table_name: String,
    pub column_name: String,
    pub referenced_table_name: String,
    pub referenced_column_name: String,
}

/// Represents an index in the database table
#[derive(Debug, Clone)]
pub struct Index {
    pub table_name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Table {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            columns: vec![Column::primary_key(
                bibrec_common::ID_FIELD_NAME,
                ColumnType::BigSerial,
            )],
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds a NOT NULL `BIGINT` column referencing `id` of another table, with an index on it.
    pub fn reference(mut self, column_name: &str, referenced_table_name: &str) -> Self {
        self.columns
            .push(Column::new(column_name, ColumnType::BigInt).not_null());
        self.foreign_keys.push(ForeignKeyConstraint::new(
            &self.name as &str,
            column_name,
            referenced_table_name,
            bibrec_common::ID_FIELD_NAME,
        ));
        self.indexes
            .push(Index::new(&self.name as &str, vec![column_name], false));
        self
    }

    pub fn unique_index(mut self, columns: Vec<&str>) -> Self {
        self.indexes
            .push(Index::new(&self.name as &str, columns, true));
        self
    }

    /// Appends `created_at` and `updated_at`, both defaulting to now
    pub fn timestamps(self) -> Self {
        self.column(
            Column::new(bibrec_common::CREATED_FIELD_NAME, ColumnType::TimestampTZ)
                .not_null()
                .default_value("now()"),
        )
        .column(
            Column::new(bibrec_common::UPDATED_FIELD_NAME, ColumnType::TimestampTZ)
                .not_null()
                .default_value("now()"),
        )
    }
}

impl Column {
    pub fn new<T: Into<String>>(name: T, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            not_null: false,
            unique: false,
            primary_key: false,
            default_value: None,
        }
    }

    pub fn primary_key<T: Into<String>>(name: T, column_type: ColumnType) -> Self {
        Self {
            primary_key: true,
            ..Self::new(name, column_type)
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default_value<T: Into<String>>(mut self, default_value: T) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}

impl ForeignKeyConstraint {
    pub fn new<T: Into<String>>(
        table_name: T,
        column_name: T,
        referenced_table_name: T,
        referenced_column_name: T,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
            referenced_table_name: referenced_table_name.into(),
            referenced_column_name: referenced_column_name.into(),
        }
    }
}

impl Index {
    pub fn new<T: Into<String>>(table_name: T, columns: Vec<T>, unique: bool) -> Self {
        Self {
            table_name: table_name.into(),
            columns: columns.into_iter().map(T::into).collect(),
            unique,
        }
    }
}
