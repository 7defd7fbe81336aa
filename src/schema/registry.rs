//! Startup registration of record types.

use crate::error::OrmError;
use crate::model::Model;
use crate::schema::Schema;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Schemas of every registered record type.
///
/// Build one during process initialization, register each record type, then share it
/// (read-only) with the repository.
#[derive(Debug, Default)]
pub struct Registry {
    schemas: HashMap<TypeId, Arc<Schema>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive and store the schema for `M`. Registering the same type again returns the
    /// schema derived the first time.
    ///
    /// # Errors
    /// Returns the derivation error for an invalid declaration.
    pub fn register<M: Model>(&mut self) -> Result<Arc<Schema>, OrmError> {
        if let Some(schema) = self.schemas.get(&TypeId::of::<M>()) {
            return Ok(schema.clone());
        }

        let schema = Arc::new(Schema::derive(&M::declaration())?);
        info!(
            model = schema.model_name(),
            table = schema.table_name(),
            primary_key = schema.primary_key(),
            fields = schema.fields().len(),
            "Registered model schema"
        );
        self.schemas.insert(TypeId::of::<M>(), schema.clone());
        Ok(schema)
    }

    /// Schema of a registered type.
    pub fn schema<M: Model>(&self) -> Result<Arc<Schema>, OrmError> {
        self.schemas
            .get(&TypeId::of::<M>())
            .cloned()
            .ok_or_else(|| OrmError::UnregisteredModel(std::any::type_name::<M>().to_string()))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registered schemas ordered by table name.
    pub fn schemas(&self) -> Vec<Arc<Schema>> {
        let mut schemas: Vec<Arc<Schema>> = self.schemas.values().cloned().collect();
        schemas.sort_by(|a, b| a.table_name().cmp(b.table_name()));
        schemas
    }
}
