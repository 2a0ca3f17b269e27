use sqlx::{Postgres, postgres::PgArguments, query::Query};

use crate::infrastructure::persistence::schema::{Column, Table};

/// Builder for the SELECT statements of the repository
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    from_table: Table<'a>,
    select: Vec<Column>,
    where_conditions: Vec<Condition>,
    order_by: Vec<OrderBy>,
    limit: Option<i64>,
}

/// A where condition that will be AND'ed together
#[derive(Debug, Clone)]
pub enum Condition {
    /// field = value
    Equals { column: Column, value: SqlParameter },

    /// field = ANY(values)
    In { column: Column, values: Vec<i64> },

    /// field IS NULL
    IsNull { column: Column },
}

#[derive(Debug, Clone, Copy)]
pub struct OrderBy {
    pub column: Column,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl<'a> From<Table<'a>> for QueryBuilder<'a> {
    fn from(value: Table<'a>) -> Self {
        QueryBuilder {
            from_table: value,
            select: vec![],
            where_conditions: vec![],
            order_by: vec![],
            limit: None,
        }
    }
}

impl<'a> QueryBuilder<'a> {
    /// Select specified columns
    pub fn select(mut self, columns: Vec<Column>) -> Self {
        self.select = columns;
        self
    }

    /// Add where condition
    pub fn where_condition(mut self, condition: Condition) -> Self {
        self.where_conditions.push(condition);
        self
    }

    pub fn order_by(mut self, column: Column, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy { column, direction });
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Build the SQL query string
    pub fn build(self) -> (String, Vec<SqlParameter>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        let mut param_counter = 1;

        // SELECT clause
        sql.push_str("SELECT ");
        let columns = self
            .select
            .iter()
            .map(|c| c.qualified())
            .collect::<Vec<_>>();
        sql.push_str(&columns.join(", "));

        // FROM clause
        sql.push_str(&format!("\nFROM {}", self.from_table.qualified()));

        // WHERE clause
        if !self.where_conditions.is_empty() {
            let conditions = self
                .where_conditions
                .into_iter()
                .map(|condition| {
                    let (condition_sql, condition_params) = condition.into_sql(&mut param_counter);
                    params.extend(condition_params);
                    condition_sql
                })
                .collect::<Vec<_>>();
            sql.push_str("\nWHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        // ORDER BY clause
        if !self.order_by.is_empty() {
            let order_clauses = self
                .order_by
                .iter()
                .map(|ob| {
                    let direction = match ob.direction {
                        SortDirection::Ascending => "ASC",
                        SortDirection::Descending => "DESC",
                    };
                    format!("{} {}", ob.column.qualified(), direction)
                })
                .collect::<Vec<_>>();
            sql.push_str("\nORDER BY ");
            sql.push_str(&order_clauses.join(", "));
        }

        // LIMIT clause
        if let Some(limit) = self.limit {
            sql.push_str(&format!("\nLIMIT {}", limit));
        }

        (sql, params)
    }
}

impl Condition {
    pub fn equals(column: Column, value: impl Into<SqlParameter>) -> Self {
        Condition::Equals {
            column,
            value: value.into(),
        }
    }

    fn into_sql(self, param_counter: &mut usize) -> (String, Vec<SqlParameter>) {
        match self {
            Condition::Equals { column, value } => {
                let sql = format!("{} = ${}", column.qualified(), param_counter);
                *param_counter += 1;
                (sql, vec![value])
            }

            Condition::In { column, values } => {
                let sql = format!("{} = ANY(${})", column.qualified(), param_counter);
                *param_counter += 1;
                (sql, vec![SqlParameter::IntegerArray(values)])
            }

            Condition::IsNull { column } => (format!("{} IS NULL", column.qualified()), vec![]),
        }
    }
}

// SQL parameter that will be bound to query
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParameter {
    Integer(i64),
    IntegerArray(Vec<i64>),
}

impl From<i64> for SqlParameter {
    fn from(value: i64) -> Self {
        SqlParameter::Integer(value)
    }
}

impl SqlParameter {
    /// Bind to sqlx query
    pub fn bind_to_query<'q>(
        self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            SqlParameter::Integer(i) => query.bind(i),
            SqlParameter::IntegerArray(values) => query.bind(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_select() {
        let table = Table::new("bibrec", "publications", "p");
        let (sql, params) = QueryBuilder::from(table)
            .select(table.columns(&["id", "current_version_id"]))
            .where_condition(Condition::equals(table.column("id"), 7))
            .where_condition(Condition::IsNull {
                column: table.column("deleted_at"),
            })
            .build();

        assert!(sql.starts_with("SELECT \"p\".\"id\", \"p\".\"current_version_id\"\nFROM \"bibrec\".\"publications\" AS \"p\""));
        assert!(sql.contains("WHERE \"p\".\"id\" = $1 AND \"p\".\"deleted_at\" IS NULL"));
        assert_eq!(params, vec![SqlParameter::Integer(7)]);
    }

    #[test]
    fn test_any_and_order() {
        let table = Table::new("bibrec", "departments", "d");
        let (sql, params) = QueryBuilder::from(table)
            .select(vec![table.column("id")])
            .where_condition(Condition::In {
                column: table.column("id"),
                values: vec![3, 1],
            })
            .where_condition(Condition::equals(table.column("start_year"), 1990))
            .order_by(table.column("id"), SortDirection::Descending)
            .limit(10)
            .build();

        assert!(sql.contains("WHERE \"d\".\"id\" = ANY($1) AND \"d\".\"start_year\" = $2"));
        assert!(sql.ends_with("ORDER BY \"d\".\"id\" DESC\nLIMIT 10"));
        assert_eq!(params.len(), 2);
    }
}
