//! Statement execution against pooled connections.

use crate::db::pool::{Dialect, Pool};
use crate::db::row::Row;
use crate::error::OrmError;
use crate::schema::Value;
use async_trait::async_trait;
use futures::{Stream, StreamExt, TryStreamExt};
use sqlx::database::HasArguments;
use sqlx::mysql::MySql;
use sqlx::query::Query;
use sqlx::sqlite::Sqlite;
use sqlx::{Column, ColumnIndex, Database, Decode, Encode, Row as _, Type};
use std::fmt;
use tracing::info;

/// Runs statement templates with positional `?` placeholders.
///
/// Implementations acquire a connection per call and release it on every exit path.
#[async_trait]
pub trait StatementExecutor: Send + Sync + fmt::Debug {
    /// Run a query and return at most `max_rows` rows (all rows when `None`).
    async fn query(
        &self,
        sql: &str,
        args: &[Value],
        max_rows: Option<usize>,
    ) -> Result<Vec<Row>, OrmError>;

    /// Run a mutation and return the number of affected rows.
    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, OrmError>;
}

/// Executor backed by a [`Pool`].
#[derive(Debug, Clone)]
pub struct SqlExecutor {
    pool: Pool,
}

impl SqlExecutor {
    pub fn new(pool: Pool) -> Self {
        SqlExecutor { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

#[async_trait]
impl StatementExecutor for SqlExecutor {
    async fn query(
        &self,
        sql: &str,
        args: &[Value],
        max_rows: Option<usize>,
    ) -> Result<Vec<Row>, OrmError> {
        info!(sql = %sql, args = args.len(), "SQL");
        let native = translate_placeholders(sql, self.pool.dialect(), args.len())?;

        match &self.pool {
            Pool::MySql(pool) => {
                let mut conn = pool.acquire().await?;
                let stream = bind_values(sqlx::query::<MySql>(&native), args).fetch(&mut *conn);
                let rows = collect_rows(stream, max_rows).await?;
                rows.iter().map(decode_row::<MySql>).collect()
            }
            Pool::Sqlite(pool) => {
                let mut conn = pool.acquire().await?;
                let stream = bind_values(sqlx::query::<Sqlite>(&native), args).fetch(&mut *conn);
                let rows = collect_rows(stream, max_rows).await?;
                rows.iter().map(decode_row::<Sqlite>).collect()
            }
        }
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, OrmError> {
        info!(sql = %sql, args = args.len(), "SQL");
        let native = translate_placeholders(sql, self.pool.dialect(), args.len())?;

        let affected = match &self.pool {
            Pool::MySql(pool) => {
                let mut conn = pool.acquire().await?;
                bind_values(sqlx::query::<MySql>(&native), args)
                    .execute(&mut *conn)
                    .await?
                    .rows_affected()
            }
            Pool::Sqlite(pool) => {
                let mut conn = pool.acquire().await?;
                bind_values(sqlx::query::<Sqlite>(&native), args)
                    .execute(&mut *conn)
                    .await?
                    .rows_affected()
            }
        };

        Ok(affected)
    }
}

/// Rewrite `?` placeholders into the dialect's native markers.
///
/// Markers inside quoted text (`'...'`, `"..."`, `` `...` ``) are left alone.
///
/// # Errors
/// `PlaceholderMismatch` if the number of placeholders differs from `arg_count`.
pub fn translate_placeholders(
    sql: &str,
    dialect: Dialect,
    arg_count: usize,
) -> Result<String, OrmError> {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut quote: Option<char> = None;
    let mut index = 0;

    for c in sql.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                out.push(c);
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    out.push(c);
                }
                '?' => {
                    index += 1;
                    out.push_str(&dialect.placeholder(index));
                }
                _ => out.push(c),
            },
        }
    }

    if index != arg_count {
        return Err(OrmError::PlaceholderMismatch {
            expected: index,
            actual: arg_count,
        });
    }
    Ok(out)
}

fn bind_values<'q, DB>(
    mut query: Query<'q, DB, <DB as HasArguments<'q>>::Arguments>,
    args: &[Value],
) -> Query<'q, DB, <DB as HasArguments<'q>>::Arguments>
where
    DB: Database,
    bool: Encode<'q, DB> + Type<DB>,
    i64: Encode<'q, DB> + Type<DB>,
    f64: Encode<'q, DB> + Type<DB>,
    String: Encode<'q, DB> + Type<DB>,
    Vec<u8>: Encode<'q, DB> + Type<DB>,
    Option<i64>: Encode<'q, DB> + Type<DB>,
{
    for arg in args {
        query = match arg {
            Value::Null => query.bind(None::<i64>),
            Value::Bool(b) => query.bind(*b),
            Value::Int(i) => query.bind(*i),
            Value::Float(x) => query.bind(*x),
            Value::Text(s) => query.bind(s.clone()),
            Value::Bytes(b) => query.bind(b.clone()),
        };
    }
    query
}

async fn collect_rows<S, R>(stream: S, max_rows: Option<usize>) -> Result<Vec<R>, sqlx::Error>
where
    S: Stream<Item = Result<R, sqlx::Error>>,
{
    match max_rows {
        Some(n) => stream.take(n).try_collect().await,
        None => stream.try_collect().await,
    }
}

/// Decode a driver row by trying each supported scalar type in turn.
///
/// Integers are tried before booleans so MySQL tiny integers stay numeric; the record
/// conversion accepts 0/1 for boolean fields.
fn decode_row<DB>(row: &DB::Row) -> Result<Row, OrmError>
where
    DB: Database,
    usize: ColumnIndex<DB::Row>,
    for<'r> i64: Decode<'r, DB> + Type<DB>,
    for<'r> bool: Decode<'r, DB> + Type<DB>,
    for<'r> f64: Decode<'r, DB> + Type<DB>,
    for<'r> String: Decode<'r, DB> + Type<DB>,
    for<'r> Vec<u8>: Decode<'r, DB> + Type<DB>,
{
    let mut decoded = Row::new();
    for (i, column) in row.columns().iter().enumerate() {
        let value = if let Ok(v) = row.try_get::<Option<i64>, _>(i) {
            v.map_or(Value::Null, Value::Int)
        } else if let Ok(v) = row.try_get::<Option<bool>, _>(i) {
            v.map_or(Value::Null, Value::Bool)
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(i) {
            v.map_or(Value::Null, Value::Float)
        } else if let Ok(v) = row.try_get::<Option<String>, _>(i) {
            v.map_or(Value::Null, Value::Text)
        } else if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(i) {
            v.map_or(Value::Null, Value::Bytes)
        } else {
            return Err(OrmError::UnsupportedColumn(column.name().to_string()));
        };
        decoded.insert(column.name(), value);
    }
    Ok(decoded)
}
