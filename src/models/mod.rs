//! Record types of the blog application.

/// Implements the field accessors of [`Model`](crate::model::Model) for a struct whose
/// members are all `Option<T>` and named after their declared fields.
macro_rules! model_fields {
    ($model:ident { $($field:ident),+ $(,)? }) => {
        fn get_field(&self, field: &str) -> Option<$crate::schema::Value> {
            match field {
                $(stringify!($field) => self.$field.clone().map($crate::schema::Value::from),)+
                _ => None,
            }
        }

        fn set_field(
            &mut self,
            field: &str,
            value: $crate::schema::Value,
        ) -> Result<(), $crate::error::OrmError> {
            match field {
                $(stringify!($field) => {
                    self.$field = $crate::schema::convert_field(field, value)?
                })+
                _ => return Err($crate::models::unknown_field(stringify!($model), field)),
            }
            Ok(())
        }

        fn from_row(row: &$crate::db::Row) -> Result<Self, $crate::error::OrmError> {
            Ok($model {
                $($field: row.try_get(stringify!($field))?,)+
            })
        }
    };
}

mod blog;
mod comment;
mod user;

pub use blog::Blog;
pub use comment::Comment;
pub use user::User;

use crate::error::OrmError;
use crate::schema::Value;
use chrono::Utc;
use uuid::Uuid;

/// Time-ordered unique id: 15 digits of epoch milliseconds, a random UUID, then `000`.
pub fn next_id() -> Value {
    Value::Text(format!(
        "{:015}{}000",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    ))
}

/// Current time as fractional seconds since the Unix epoch.
pub fn now_timestamp() -> Value {
    Value::Float(Utc::now().timestamp_millis() as f64 / 1000.0)
}

pub(crate) fn unknown_field(model: &str, field: &str) -> OrmError {
    OrmError::UnknownField {
        model: model.to_string(),
        field: field.to_string(),
    }
}
