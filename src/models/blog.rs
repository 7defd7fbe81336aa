use super::{next_id, now_timestamp};
use crate::model::Model;
use crate::schema::{FieldDescriptor, ModelDecl};
use serde::{Deserialize, Serialize};

/// A blog post. Author details are copied onto the post when it is written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_image: Option<String>,
    pub name: Option<String>,
    pub summary: Option<String>,
    pub created_at: Option<f64>,
}

impl Model for Blog {
    fn declaration() -> ModelDecl {
        ModelDecl::new("Blog")
            .table("blog")
            .field(
                "id",
                FieldDescriptor::string()
                    .primary_key()
                    .default_with(next_id)
                    .column_type("varchar(50)"),
            )
            .field("user_id", FieldDescriptor::string().column_type("varchar(50)"))
            .field("user_name", FieldDescriptor::string().column_type("varchar(50)"))
            .field("user_image", FieldDescriptor::string().column_type("varchar(500)"))
            .field("name", FieldDescriptor::string().column_type("varchar(50)"))
            .field("summary", FieldDescriptor::string().column_type("varchar(200)"))
            .field(
                "created_at",
                FieldDescriptor::float()
                    .named("create_at")
                    .default_with(now_timestamp),
            )
    }

    model_fields!(Blog {
        id,
        user_id,
        user_name,
        user_image,
        name,
        summary,
        created_at,
    });
}
