pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod models;
pub mod schema;

pub use config::{ConfigError, PoolConfig};
pub use db::{
    AnomalyPolicy, Dialect, FindOptions, Limit, MockExecutor, Operation, Pool, Repository, Row,
    SqlExecutor, StatementExecutor, WriteOutcome,
};
pub use error::OrmError;
pub use model::{Model, Record};
pub use schema::{FieldDefault, FieldDescriptor, ModelDecl, Registry, Schema, Value};
