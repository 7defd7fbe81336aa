//! Field descriptors: per-column metadata declared on a record type.

use crate::schema::Value;

/// Default applied to a field that has no value when it is first needed.
#[derive(Debug, Clone)]
pub enum FieldDefault {
    /// A fixed value.
    Constant(Value),
    /// A zero-argument producer such as a clock or id generator.
    Factory(fn() -> Value),
}

impl FieldDefault {
    pub fn resolve(&self) -> Value {
        match self {
            FieldDefault::Constant(value) => value.clone(),
            FieldDefault::Factory(produce) => produce(),
        }
    }
}

/// Describes one column of a record type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Column name override; the declared field name is used when absent.
    pub name: Option<String>,
    pub sql_type: String,
    pub primary_key: bool,
    pub default: Option<FieldDefault>,
}

impl FieldDescriptor {
    fn with_type(sql_type: &str) -> Self {
        FieldDescriptor {
            name: None,
            sql_type: sql_type.to_string(),
            primary_key: false,
            default: None,
        }
    }

    pub fn string() -> Self {
        Self::with_type("varchar(100)")
    }

    pub fn boolean() -> Self {
        Self::with_type("boolean")
    }

    pub fn integer() -> Self {
        Self::with_type("bigint")
    }

    pub fn float() -> Self {
        Self::with_type("real")
    }

    pub fn text() -> Self {
        Self::with_type("text")
    }

    pub fn column_type(mut self, sql_type: &str) -> Self {
        self.sql_type = sql_type.to_string();
        self
    }

    pub fn named(mut self, column: &str) -> Self {
        self.name = Some(column.to_string());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(FieldDefault::Constant(value.into()));
        self
    }

    pub fn default_with(mut self, produce: fn() -> Value) -> Self {
        self.default = Some(FieldDefault::Factory(produce));
        self
    }

    /// Column name for a field declared as `field`.
    pub fn column_name<'a>(&'a self, field: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seven() -> Value {
        Value::Int(7)
    }

    #[test]
    fn test_constructors_set_sql_type() {
        assert_eq!(FieldDescriptor::string().sql_type, "varchar(100)");
        assert_eq!(FieldDescriptor::boolean().sql_type, "boolean");
        assert_eq!(FieldDescriptor::integer().sql_type, "bigint");
        assert_eq!(FieldDescriptor::float().sql_type, "real");
        assert_eq!(FieldDescriptor::text().sql_type, "text");
        assert_eq!(
            FieldDescriptor::string().column_type("varchar(50)").sql_type,
            "varchar(50)"
        );
    }

    #[test]
    fn test_default_resolution() {
        let constant = FieldDescriptor::integer().default_value(0i64);
        assert_eq!(constant.default.unwrap().resolve(), Value::Int(0));

        let factory = FieldDescriptor::integer().default_with(seven);
        assert_eq!(factory.default.unwrap().resolve(), Value::Int(7));
    }

    #[test]
    fn test_column_name_override() {
        let plain = FieldDescriptor::string();
        assert_eq!(plain.column_name("email"), "email");

        let renamed = FieldDescriptor::string().named("user_email");
        assert_eq!(renamed.column_name("email"), "user_email");
    }
}
