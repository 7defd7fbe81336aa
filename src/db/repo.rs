//! Repository layer for record persistence.
//!
//! `Repository` runs each registered record type's precomputed statements through a
//! [`StatementExecutor`]. Mutations report their affected-row count in a [`WriteOutcome`];
//! a count other than one is a persistence anomaly, logged and (under
//! [`AnomalyPolicy::Strict`]) returned as an error.

use crate::db::executor::StatementExecutor;
use crate::error::OrmError;
use crate::model::Model;
use crate::schema::{Registry, Schema, Value};
use std::sync::Arc;
use tracing::warn;

/// What to do when a mutation does not affect exactly one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnomalyPolicy {
    /// Log the anomaly and return the outcome normally.
    #[default]
    Report,
    /// Return `OrmError::AffectedRows`.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Result of a save, update, or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub operation: Operation,
    pub affected: u64,
}

impl WriteOutcome {
    pub const EXPECTED_ROWS: u64 = 1;

    /// Whether the write did not land on exactly one row.
    pub fn is_anomaly(&self) -> bool {
        self.affected != Self::EXPECTED_ROWS
    }
}

/// Row limit for `find_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(i64),
    Range { offset: i64, count: i64 },
}

impl Limit {
    /// Parse a limit given as one count or an `[offset, count]` pair.
    ///
    /// # Errors
    /// `InvalidLimit` for any other shape or a negative bound.
    pub fn from_values(values: &[Value]) -> Result<Self, OrmError> {
        match values {
            [Value::Int(count)] if *count >= 0 => Ok(Limit::Count(*count)),
            [Value::Int(offset), Value::Int(count)] if *offset >= 0 && *count >= 0 => {
                Ok(Limit::Range {
                    offset: *offset,
                    count: *count,
                })
            }
            other => Err(OrmError::InvalidLimit(format!("{:?}", other))),
        }
    }
}

/// Filter, ordering and limit for `find_all`.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    filter: Option<String>,
    args: Vec<Value>,
    order_by: Option<String>,
    limit: Option<Vec<Value>>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// WHERE clause (with `?` placeholders) and its arguments.
    pub fn filter(mut self, clause: &str, args: Vec<Value>) -> Self {
        self.filter = Some(clause.to_string());
        self.args = args;
        self
    }

    pub fn order_by(mut self, order_by: &str) -> Self {
        self.order_by = Some(order_by.to_string());
        self
    }

    pub fn limit(mut self, count: i64) -> Self {
        self.limit = Some(vec![Value::Int(count)]);
        self
    }

    pub fn limit_range(mut self, offset: i64, count: i64) -> Self {
        self.limit = Some(vec![Value::Int(offset), Value::Int(count)]);
        self
    }

    /// Limit in untyped form, as received from a request. Validated by `find_all`.
    pub fn limit_values(mut self, values: Vec<Value>) -> Self {
        self.limit = Some(values);
        self
    }

    /// Assemble the select statement and its arguments for `schema`.
    ///
    /// # Errors
    /// `InvalidLimit` if the limit has an unsupported shape.
    pub fn build(&self, schema: &Schema) -> Result<(String, Vec<Value>), OrmError> {
        let limit = self.limit.as_deref().map(Limit::from_values).transpose()?;

        let mut sql = schema.select_stmt().to_string();
        let mut args = Vec::new();

        if let Some(filter) = &self.filter {
            sql.push_str(" WHERE ");
            sql.push_str(filter);
            args.extend(self.args.iter().cloned());
        }

        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }

        match limit {
            Some(Limit::Count(count)) => {
                sql.push_str(" LIMIT ?");
                args.push(Value::Int(count));
            }
            Some(Limit::Range { offset, count }) => {
                sql.push_str(" LIMIT ?, ?");
                args.push(Value::Int(offset));
                args.push(Value::Int(count));
            }
            None => {}
        }

        Ok((sql, args))
    }
}

/// Repository for record persistence.
#[derive(Debug, Clone)]
pub struct Repository {
    executor: Arc<dyn StatementExecutor>,
    registry: Arc<Registry>,
    policy: AnomalyPolicy,
}

impl Repository {
    /// Create a repository over an executor and the registered record types.
    pub fn new(executor: Arc<dyn StatementExecutor>, registry: Arc<Registry>) -> Self {
        Repository {
            executor,
            registry,
            policy: AnomalyPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AnomalyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Insert `record`, resolving defaults for unset fields (the resolved values are stored
    /// on the record).
    ///
    /// # Errors
    /// `MissingAttribute` if the primary key is unset and has no default; any execution
    /// error from the store.
    pub async fn save<M: Model>(&self, record: &mut M) -> Result<WriteOutcome, OrmError> {
        let schema = self.registry.schema::<M>()?;

        let mut args = Vec::with_capacity(schema.fields().len() + 1);
        let primary_key = record.value_or_default(&schema, schema.primary_key())?;
        if primary_key.is_null() {
            return Err(OrmError::MissingAttribute {
                model: schema.model_name().to_string(),
                field: schema.primary_key().to_string(),
            });
        }
        args.push(primary_key);
        for field in schema.fields() {
            args.push(record.value_or_default(&schema, field)?);
        }

        let affected = self.executor.execute(schema.insert_stmt(), &args).await?;
        self.check_outcome(&schema, Operation::Insert, affected)
    }

    /// Write every ordinary field of `record` to the row with its primary key.
    ///
    /// # Errors
    /// `MissingAttribute` if the primary key or a field with a declared default is unset;
    /// any execution error from the store.
    pub async fn update<M: Model>(&self, record: &M) -> Result<WriteOutcome, OrmError> {
        let schema = self.registry.schema::<M>()?;

        let mut args = schema
            .fields()
            .iter()
            .map(|field| record.value(&schema, field))
            .collect::<Result<Vec<_>, _>>()?;
        args.push(record.value(&schema, schema.primary_key())?);

        let affected = self.executor.execute(schema.update_stmt(), &args).await?;
        self.check_outcome(&schema, Operation::Update, affected)
    }

    /// Delete the row with `record`'s primary key.
    pub async fn delete<M: Model>(&self, record: &M) -> Result<WriteOutcome, OrmError> {
        let schema = self.registry.schema::<M>()?;

        let args = vec![record.value(&schema, schema.primary_key())?];

        let affected = self.executor.execute(schema.delete_stmt(), &args).await?;
        self.check_outcome(&schema, Operation::Delete, affected)
    }

    /// Load every record matching `options`.
    ///
    /// # Errors
    /// `InvalidLimit` (before any statement is issued); any execution or hydration error.
    pub async fn find_all<M: Model>(&self, options: FindOptions) -> Result<Vec<M>, OrmError> {
        let schema = self.registry.schema::<M>()?;
        let (sql, args) = options.build(&schema)?;

        let rows = self.executor.query(&sql, &args, None).await?;
        rows.iter().map(M::from_row).collect()
    }

    /// Load the record with `primary_key`, if any.
    pub async fn find<M: Model>(&self, primary_key: Value) -> Result<Option<M>, OrmError> {
        let schema = self.registry.schema::<M>()?;
        let sql = format!(
            "{} WHERE {} = ?",
            schema.select_stmt(),
            schema.primary_key_column()
        );

        let rows = self.executor.query(&sql, &[primary_key], Some(1)).await?;
        rows.first().map(M::from_row).transpose()
    }

    /// Count the records matching an optional WHERE clause.
    pub async fn count<M: Model>(
        &self,
        filter: Option<&str>,
        args: Vec<Value>,
    ) -> Result<i64, OrmError> {
        let schema = self.registry.schema::<M>()?;
        let mut sql = format!("SELECT COUNT(*) AS `_num_` FROM {}", schema.quoted_table());
        if let Some(filter) = filter {
            sql.push_str(" WHERE ");
            sql.push_str(filter);
        }

        let rows = self.executor.query(&sql, &args, Some(1)).await?;
        match rows.first() {
            Some(row) => Ok(row.try_get::<i64>("_num_")?.unwrap_or(0)),
            None => Ok(0),
        }
    }

    fn check_outcome(
        &self,
        schema: &Schema,
        operation: Operation,
        affected: u64,
    ) -> Result<WriteOutcome, OrmError> {
        let outcome = WriteOutcome {
            operation,
            affected,
        };

        if outcome.is_anomaly() {
            warn!(
                model = schema.model_name(),
                table = schema.table_name(),
                operation = operation.as_str(),
                affected,
                expected = WriteOutcome::EXPECTED_ROWS,
                "Unexpected affected row count"
            );
            if self.policy == AnomalyPolicy::Strict {
                return Err(OrmError::AffectedRows {
                    operation: operation.as_str(),
                    expected: WriteOutcome::EXPECTED_ROWS,
                    actual: affected,
                });
            }
        }

        Ok(outcome)
    }
}
