//! Schema derivation for record types.
//!
//! This module provides:
//! - Field descriptors and scalar values
//! - `ModelDecl`, the declarative description of a record type
//! - `Schema`, the immutable metadata derived from a declaration, including the four
//!   statement templates
//! - `Registry`, which derives each record type's schema once at startup

pub mod field;
pub mod registry;
pub mod value;

pub use field::{FieldDefault, FieldDescriptor};
pub use registry::Registry;
pub use value::{convert_field, FromValue, Value};

use crate::error::OrmError;
use std::collections::HashMap;

/// Declaration of a record type: its name, optional table name, and fields in order.
#[derive(Debug, Clone)]
pub struct ModelDecl {
    pub type_name: String,
    pub table: Option<String>,
    pub fields: Vec<(String, FieldDescriptor)>,
}

impl ModelDecl {
    pub fn new(type_name: &str) -> Self {
        ModelDecl {
            type_name: type_name.to_string(),
            table: None,
            fields: Vec::new(),
        }
    }

    pub fn table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    pub fn field(mut self, name: &str, descriptor: FieldDescriptor) -> Self {
        self.fields.push((name.to_string(), descriptor));
        self
    }
}

/// Immutable metadata for one record type.
#[derive(Debug, Clone)]
pub struct Schema {
    model_name: String,
    table_name: String,
    primary_key: String,
    fields: Vec<String>,
    descriptors: HashMap<String, FieldDescriptor>,
    select_stmt: String,
    insert_stmt: String,
    update_stmt: String,
    delete_stmt: String,
}

impl Schema {
    /// Derive the schema for a declaration.
    ///
    /// # Errors
    /// `DuplicatePrimaryKey` when a second primary key is declared, `MissingPrimaryKey` when
    /// none is.
    pub fn derive(decl: &ModelDecl) -> Result<Self, OrmError> {
        let table_name = decl
            .table
            .clone()
            .unwrap_or_else(|| decl.type_name.clone());

        let mut primary_key: Option<String> = None;
        let mut fields = Vec::with_capacity(decl.fields.len());
        let mut descriptors = HashMap::with_capacity(decl.fields.len());

        for (name, descriptor) in &decl.fields {
            if descriptor.primary_key {
                if primary_key.is_some() {
                    return Err(OrmError::DuplicatePrimaryKey {
                        model: decl.type_name.clone(),
                        field: name.clone(),
                    });
                }
                primary_key = Some(name.clone());
            } else {
                fields.push(name.clone());
            }
            descriptors.insert(name.clone(), descriptor.clone());
        }

        let primary_key = primary_key.ok_or_else(|| OrmError::MissingPrimaryKey {
            model: decl.type_name.clone(),
        })?;

        let column = |field: &str| -> String {
            let name = descriptors
                .get(field)
                .map(|d: &FieldDescriptor| d.column_name(field))
                .unwrap_or(field);
            quote(name)
        };

        let pk_column = column(&primary_key);
        let table = quote(&table_name);

        let selected: Vec<String> = std::iter::once(&primary_key)
            .chain(fields.iter())
            .map(|field| {
                let col = column(field);
                if col == quote(field) {
                    col
                } else {
                    format!("{} AS {}", col, quote(field))
                }
            })
            .collect();
        let select_stmt = format!("SELECT {} FROM {}", selected.join(", "), table);

        let inserted: Vec<String> = std::iter::once(&primary_key)
            .chain(fields.iter())
            .map(|field| column(field))
            .collect();
        let insert_stmt = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            inserted.join(", "),
            vec!["?"; inserted.len()].join(", ")
        );

        let assignments: Vec<String> = if fields.is_empty() {
            vec![format!("{} = {}", pk_column, pk_column)]
        } else {
            fields
                .iter()
                .map(|field| format!("{} = ?", column(field)))
                .collect()
        };
        let update_stmt = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            table,
            assignments.join(", "),
            pk_column
        );

        let delete_stmt = format!("DELETE FROM {} WHERE {} = ?", table, pk_column);

        Ok(Schema {
            model_name: decl.type_name.clone(),
            table_name,
            primary_key,
            fields,
            descriptors,
            select_stmt,
            insert_stmt,
            update_stmt,
            delete_stmt,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Quoted table name, for statements built outside the four templates.
    pub fn quoted_table(&self) -> String {
        quote(&self.table_name)
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Ordinary fields in declaration order (primary key excluded).
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn descriptor(&self, field: &str) -> Option<&FieldDescriptor> {
        self.descriptors.get(field)
    }

    /// Quoted column name of the primary key, for building WHERE clauses.
    pub fn primary_key_column(&self) -> String {
        let column = self
            .descriptor(&self.primary_key)
            .map(|d| d.column_name(&self.primary_key))
            .unwrap_or(&self.primary_key);
        quote(column)
    }

    pub fn select_stmt(&self) -> &str {
        &self.select_stmt
    }

    pub fn insert_stmt(&self) -> &str {
        &self.insert_stmt
    }

    pub fn update_stmt(&self) -> &str {
        &self.update_stmt
    }

    pub fn delete_stmt(&self) -> &str {
        &self.delete_stmt
    }
}

fn quote(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}
