/// A table in the configured database schema
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    pub schema: &'a str,
    pub name: &'static str,
    pub alias: &'static str,
}

impl<'a> Table<'a> {
    pub fn new(schema: &'a str, name: &'static str, alias: &'static str) -> Self {
        Self {
            schema,
            name,
            alias,
        }
    }

    /// Schema qualified table name without alias, for INSERT and UPDATE
    pub fn name(&self) -> String {
        format!("\"{}\".\"{}\"", self.schema, self.name)
    }

    /// Schema qualified table name with alias
    pub fn qualified(&self) -> String {
        format!("{} AS \"{}\"", self.name(), self.alias)
    }

    pub fn column(&self, name: &'static str) -> Column {
        Column {
            qualifier: self.alias,
            name,
        }
    }

    /// Every listed column of this table
    pub fn columns(&self, names: &[&'static str]) -> Vec<Column> {
        names.iter().map(|name| self.column(name)).collect()
    }
}

/// Represents one column in the database table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub qualifier: &'static str,
    pub name: &'static str,
}

impl Column {
    /// Get qualified column name
    pub fn qualified(&self) -> String {
        format!("\"{}\".\"{}\"", self.qualifier, self.name)
    }
}
