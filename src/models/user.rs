use super::{next_id, now_timestamp};
use crate::model::Model;
use crate::schema::{FieldDescriptor, ModelDecl};
use serde::{Deserialize, Serialize};

/// A registered account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub admin: Option<bool>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub created_at: Option<f64>,
}

impl User {
    pub fn new(email: &str, password: &str, name: &str) -> Self {
        User {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

impl Model for User {
    fn declaration() -> ModelDecl {
        ModelDecl::new("User")
            .table("user")
            .field(
                "id",
                FieldDescriptor::string()
                    .primary_key()
                    .default_with(next_id)
                    .column_type("varchar(50)"),
            )
            .field("email", FieldDescriptor::string().column_type("varchar(50)"))
            .field("password", FieldDescriptor::string().column_type("varchar(50)"))
            .field("admin", FieldDescriptor::boolean().default_value(false))
            .field("name", FieldDescriptor::string().column_type("varchar(50)"))
            .field("image", FieldDescriptor::string().column_type("varchar(500)"))
            .field(
                "created_at",
                FieldDescriptor::float()
                    .named("create_at")
                    .default_with(now_timestamp),
            )
    }

    model_fields!(User {
        id,
        email,
        password,
        admin,
        name,
        image,
        created_at,
    });
}
