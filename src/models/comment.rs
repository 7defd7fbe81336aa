use super::{next_id, now_timestamp};
use crate::model::Model;
use crate::schema::{FieldDescriptor, ModelDecl};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Option<String>,
    pub blog_id: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_image: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<f64>,
}

impl Model for Comment {
    fn declaration() -> ModelDecl {
        ModelDecl::new("Comment")
            .table("comment")
            .field(
                "id",
                FieldDescriptor::string()
                    .primary_key()
                    .default_with(next_id)
                    .column_type("varchar(50)"),
            )
            .field("blog_id", FieldDescriptor::string().column_type("varchar(50)"))
            .field("user_id", FieldDescriptor::string().column_type("varchar(50)"))
            .field("user_name", FieldDescriptor::string().column_type("varchar(50)"))
            .field("user_image", FieldDescriptor::string().column_type("varchar(500)"))
            .field("content", FieldDescriptor::text())
            .field("created_at", FieldDescriptor::float().default_with(now_timestamp))
    }

    model_fields!(Comment {
        id,
        blog_id,
        user_id,
        user_name,
        user_image,
        content,
        created_at,
    });
}
