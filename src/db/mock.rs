//! Mock executor for testing without a database.

use super::executor::StatementExecutor;
use super::row::Row;
use crate::error::OrmError;
use crate::schema::Value;
use async_trait::async_trait;
use std::sync::Mutex;

/// A statement as received by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStatement {
    pub sql: String,
    pub args: Vec<Value>,
    pub max_rows: Option<usize>,
}

/// Mock executor that records every statement and replays predefined results.
#[derive(Debug)]
pub struct MockExecutor {
    rows: Vec<Row>,
    affected: u64,
    statements: Mutex<Vec<RecordedStatement>>,
}

impl MockExecutor {
    /// Create a mock that returns no rows and reports one affected row.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            affected: 1,
            statements: Mutex::new(Vec::new()),
        }
    }

    /// Rows returned by every query (truncated to `max_rows`).
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    /// Affected-row count returned by every mutation.
    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    /// Statements received so far, in order.
    pub fn statements(&self) -> Vec<RecordedStatement> {
        self.statements
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn record(&self, sql: &str, args: &[Value], max_rows: Option<usize>) {
        if let Ok(mut statements) = self.statements.lock() {
            statements.push(RecordedStatement {
                sql: sql.to_string(),
                args: args.to_vec(),
                max_rows,
            });
        }
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatementExecutor for MockExecutor {
    async fn query(
        &self,
        sql: &str,
        args: &[Value],
        max_rows: Option<usize>,
    ) -> Result<Vec<Row>, OrmError> {
        self.record(sql, args, max_rows);
        let limit = max_rows.unwrap_or(self.rows.len());
        Ok(self.rows.iter().take(limit).cloned().collect())
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, OrmError> {
        self.record(sql, args, None);
        Ok(self.affected)
    }
}
