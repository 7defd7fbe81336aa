//! Database module.
//!
//! This module provides:
//! - The connection pool handle (MySQL in production, SQLite for local runs and tests)
//! - The statement executor and its placeholder translation
//! - The repository that persists and loads record types

pub mod executor;
pub mod mock;
pub mod pool;
pub mod repo;
pub mod row;

pub use executor::{SqlExecutor, StatementExecutor};
pub use mock::MockExecutor;
pub use pool::{Dialect, Pool};
pub use repo::{AnomalyPolicy, FindOptions, Limit, Operation, Repository, WriteOutcome};
pub use row::Row;
