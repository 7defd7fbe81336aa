//! Record types and their persistence surface.

use crate::db::{FindOptions, Repository, Row, WriteOutcome};
use crate::error::OrmError;
use crate::schema::{ModelDecl, Schema, Value};
use async_trait::async_trait;
use tracing::debug;

/// A record type mapped to one table.
///
/// Fields are plain struct members; `get_field`/`set_field` expose them by declared name
/// so the repository can bind and assign them positionally. A field holding `None` is
/// unset.
pub trait Model: Sized + Send + Sync + 'static {
    /// Declaration the schema is derived from at registration.
    fn declaration() -> ModelDecl;

    /// Current value of `field`, or `None` if unset.
    fn get_field(&self, field: &str) -> Option<Value>;

    /// Assign `field`, converting `value` to the field's type.
    fn set_field(&mut self, field: &str, value: Value) -> Result<(), OrmError>;

    /// Build an instance from a result row. Row data is taken as is; no defaults apply.
    fn from_row(row: &Row) -> Result<Self, OrmError>;

    /// Stored value of `field`.
    ///
    /// An unset ordinary field without a declared default is `Value::Null`: that is how
    /// `save` writes it and how a NULL column loads back.
    ///
    /// # Errors
    /// `MissingAttribute` if the primary key, or a field with a declared default, is unset.
    fn value(&self, schema: &Schema, field: &str) -> Result<Value, OrmError> {
        if let Some(value) = self.get_field(field) {
            return Ok(value);
        }

        let nullable = field != schema.primary_key()
            && schema
                .descriptor(field)
                .is_some_and(|descriptor| descriptor.default.is_none());
        if nullable {
            Ok(Value::Null)
        } else {
            Err(OrmError::MissingAttribute {
                model: schema.model_name().to_string(),
                field: field.to_string(),
            })
        }
    }

    /// Stored value of `field`, resolving and storing the declared default if unset.
    ///
    /// An unset field without a default resolves to `Value::Null`.
    fn value_or_default(&mut self, schema: &Schema, field: &str) -> Result<Value, OrmError> {
        if let Some(value) = self.get_field(field) {
            return Ok(value);
        }

        let descriptor = schema
            .descriptor(field)
            .ok_or_else(|| OrmError::UnknownField {
                model: schema.model_name().to_string(),
                field: field.to_string(),
            })?;

        match &descriptor.default {
            Some(default) => {
                let value = default.resolve();
                debug!(
                    model = schema.model_name(),
                    field,
                    value = %value,
                    "Using default value"
                );
                self.set_field(field, value.clone())?;
                Ok(value)
            }
            None => Ok(Value::Null),
        }
    }
}

/// Persistence operations on record instances and types.
#[async_trait]
pub trait Record: Model {
    /// Insert this instance, resolving defaults for unset fields.
    async fn save(&mut self, repo: &Repository) -> Result<WriteOutcome, OrmError>;

    /// Write every ordinary field back to the row with this primary key.
    async fn update(&self, repo: &Repository) -> Result<WriteOutcome, OrmError>;

    /// Delete the row with this primary key.
    async fn delete(&self, repo: &Repository) -> Result<WriteOutcome, OrmError>;

    async fn find_all(repo: &Repository, options: FindOptions) -> Result<Vec<Self>, OrmError>;

    async fn find(repo: &Repository, primary_key: Value) -> Result<Option<Self>, OrmError>;
}

#[async_trait]
impl<M: Model> Record for M {
    async fn save(&mut self, repo: &Repository) -> Result<WriteOutcome, OrmError> {
        repo.save(self).await
    }

    async fn update(&self, repo: &Repository) -> Result<WriteOutcome, OrmError> {
        repo.update(self).await
    }

    async fn delete(&self, repo: &Repository) -> Result<WriteOutcome, OrmError> {
        repo.delete(self).await
    }

    async fn find_all(repo: &Repository, options: FindOptions) -> Result<Vec<Self>, OrmError> {
        repo.find_all::<M>(options).await
    }

    async fn find(repo: &Repository, primary_key: Value) -> Result<Option<Self>, OrmError> {
        repo.find::<M>(primary_key).await
    }
}
