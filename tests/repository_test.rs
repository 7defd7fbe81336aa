//! Integration tests for record persistence against SQLite.

use std::sync::Arc;
use std::time::Duration;
use tablemap::models::{next_id, Blog, Comment, User};
use tablemap::{
    FieldDescriptor, FindOptions, Model, ModelDecl, OrmError, Pool, Record, Registry, Repository,
    Row, SqlExecutor, StatementExecutor, Value,
};
use tempfile::TempDir;

/// Record type used only by these tests.
#[derive(Debug, Clone, Default, PartialEq)]
struct Player {
    id: Option<String>,
    name: Option<String>,
    score: Option<i64>,
}

impl Model for Player {
    fn declaration() -> ModelDecl {
        ModelDecl::new("Player")
            .table("player")
            .field(
                "id",
                FieldDescriptor::string()
                    .primary_key()
                    .default_with(next_id)
                    .column_type("varchar(50)"),
            )
            .field("name", FieldDescriptor::string().column_type("varchar(50)"))
            .field("score", FieldDescriptor::integer().default_value(0i64))
    }

    fn get_field(&self, field: &str) -> Option<Value> {
        match field {
            "id" => self.id.clone().map(Value::from),
            "name" => self.name.clone().map(Value::from),
            "score" => self.score.map(Value::from),
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: Value) -> Result<(), OrmError> {
        match field {
            "id" => self.id = tablemap::schema::convert_field(field, value)?,
            "name" => self.name = tablemap::schema::convert_field(field, value)?,
            "score" => self.score = tablemap::schema::convert_field(field, value)?,
            _ => {
                return Err(OrmError::UnknownField {
                    model: "Player".to_string(),
                    field: field.to_string(),
                })
            }
        }
        Ok(())
    }

    fn from_row(row: &Row) -> Result<Self, OrmError> {
        Ok(Player {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            score: row.try_get("score")?,
        })
    }
}

fn player(name: &str) -> Player {
    Player {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

async fn setup_test_db() -> (Repository, TempDir) {
    setup_test_db_with_pool_size(2).await
}

async fn setup_test_db_with_pool_size(maxsize: u32) -> (Repository, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = Pool::sqlite(&db_path, maxsize, Duration::from_secs(5))
        .await
        .expect("pool failed");
    let executor = SqlExecutor::new(pool);

    let schema_sql = include_str!("schema.sql");
    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            executor.execute(trimmed, &[]).await.expect("schema failed");
        }
    }

    let mut registry = Registry::new();
    registry.register::<User>().unwrap();
    registry.register::<Blog>().unwrap();
    registry.register::<Comment>().unwrap();
    registry.register::<Player>().unwrap();

    (
        Repository::new(Arc::new(executor), Arc::new(registry)),
        temp_dir,
    )
}

#[tokio::test]
async fn test_save_applies_defaults_and_find_all_by_name() {
    let (repo, _temp) = setup_test_db().await;

    let mut alice = player("alice");
    let outcome = alice.save(&repo).await.expect("save failed");
    assert_eq!(outcome.affected, 1);
    assert!(!outcome.is_anomaly());

    let id = alice.id.clone().expect("id not generated");
    assert!(!id.is_empty());
    assert_eq!(alice.score, Some(0));

    let found = Player::find_all(
        &repo,
        FindOptions::new().filter("`name` = ?", vec![Value::from("alice")]),
    )
    .await
    .expect("find_all failed");

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id.as_deref(), Some(id.as_str()));
    assert_eq!(found[0].score, Some(0));
}

#[tokio::test]
async fn test_user_round_trip() {
    let (repo, _temp) = setup_test_db().await;

    let mut user = User::new("alice@example.com", "hashed", "alice");
    user.image = Some("http://www.gravatar.com/avatar/alice".to_string());
    repo.save(&mut user).await.expect("save failed");

    let id = user.id.clone().unwrap();
    let loaded = User::find(&repo, Value::from(id.as_str()))
        .await
        .expect("find failed")
        .expect("user missing");

    assert_eq!(loaded, user);
    assert_eq!(loaded.admin, Some(false));
}

#[tokio::test]
async fn test_nullable_column_hydrates_as_unset() {
    let (repo, _temp) = setup_test_db().await;

    let mut user = User::new("bob@example.com", "hashed", "bob");
    repo.save(&mut user).await.expect("save failed");

    let loaded: User = repo
        .find(Value::from(user.id.clone().unwrap()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.image, None);
}

#[tokio::test]
async fn test_update_after_loading_null_column() {
    let (repo, _temp) = setup_test_db().await;

    let mut user = User::new("bob@example.com", "hashed", "bob");
    repo.save(&mut user).await.expect("save failed");
    let id = user.id.clone().unwrap();

    let mut loaded = User::find(&repo, Value::from(id.as_str()))
        .await
        .unwrap()
        .expect("user missing");
    assert_eq!(loaded.image, None);

    loaded.name = Some("robert".to_string());
    let outcome = loaded.update(&repo).await.expect("update failed");
    assert_eq!(outcome.affected, 1);

    let reloaded: User = repo.find(Value::from(id)).await.unwrap().unwrap();
    assert_eq!(reloaded.name.as_deref(), Some("robert"));
    assert_eq!(reloaded.image, None);
    assert_eq!(reloaded.email.as_deref(), Some("bob@example.com"));
}

#[tokio::test]
async fn test_update_changes_fields_but_not_key() {
    let (repo, _temp) = setup_test_db().await;

    let mut blog = Blog {
        user_id: Some("u1".to_string()),
        user_name: Some("alice".to_string()),
        user_image: Some("about:blank".to_string()),
        name: Some("First post".to_string()),
        summary: Some("Hello".to_string()),
        ..Default::default()
    };
    repo.save(&mut blog).await.expect("save failed");
    let id = blog.id.clone().unwrap();

    blog.name = Some("Edited post".to_string());
    blog.summary = Some("Hello again".to_string());
    let outcome = blog.update(&repo).await.expect("update failed");
    assert_eq!(outcome.affected, 1);

    let all = repo.find_all::<Blog>(FindOptions::new()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id.as_deref(), Some(id.as_str()));
    assert_eq!(all[0].name.as_deref(), Some("Edited post"));
    assert_eq!(all[0].summary.as_deref(), Some("Hello again"));
    assert_eq!(all[0].created_at, blog.created_at);
}

#[tokio::test]
async fn test_delete_then_find_is_empty() {
    let (repo, _temp) = setup_test_db().await;

    let mut comment = Comment {
        blog_id: Some("b1".to_string()),
        user_id: Some("u1".to_string()),
        user_name: Some("alice".to_string()),
        user_image: Some("about:blank".to_string()),
        content: Some("Nice post".to_string()),
        ..Default::default()
    };
    comment.save(&repo).await.expect("save failed");
    let id = comment.id.clone().unwrap();

    let outcome = comment.delete(&repo).await.expect("delete failed");
    assert_eq!(outcome.affected, 1);

    let found = Comment::find_all(
        &repo,
        FindOptions::new().filter("`id` = ?", vec![Value::from(id)]),
    )
    .await
    .unwrap();
    assert!(found.is_empty());

    // A second delete lands on no row: reported, not raised.
    let outcome = comment.delete(&repo).await.expect("delete failed");
    assert_eq!(outcome.affected, 0);
    assert!(outcome.is_anomaly());
}

#[tokio::test]
async fn test_update_of_unsaved_record_is_anomaly() {
    let (repo, _temp) = setup_test_db().await;

    let transient = Player {
        id: Some("never-saved".to_string()),
        name: Some("ghost".to_string()),
        score: Some(3),
    };
    let outcome = transient.update(&repo).await.expect("update failed");
    assert_eq!(outcome.affected, 0);
    assert!(outcome.is_anomaly());
}

#[tokio::test]
async fn test_find_all_limits() {
    let (repo, _temp) = setup_test_db().await;
    for i in 0..7 {
        let mut p = player(&format!("p{}", i));
        p.score = Some(i);
        repo.save(&mut p).await.unwrap();
    }

    let first_five = repo
        .find_all::<Player>(FindOptions::new().order_by("`name`").limit(5))
        .await
        .unwrap();
    assert_eq!(first_five.len(), 5);

    let page = repo
        .find_all::<Player>(FindOptions::new().order_by("`name`").limit_range(2, 3))
        .await
        .unwrap();
    let names: Vec<&str> = page.iter().filter_map(|p| p.name.as_deref()).collect();
    assert_eq!(names, vec!["p2", "p3", "p4"]);

    let filtered = repo
        .find_all::<Player>(
            FindOptions::new()
                .filter("`score` >= ?", vec![Value::Int(5)])
                .order_by("`score` DESC"),
        )
        .await
        .unwrap();
    let scores: Vec<i64> = filtered.iter().filter_map(|p| p.score).collect();
    assert_eq!(scores, vec![6, 5]);
}

#[tokio::test]
async fn test_invalid_limit_rejected() {
    let (repo, _temp) = setup_test_db().await;

    let result = repo
        .find_all::<Player>(FindOptions::new().limit_values(vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
        ]))
        .await;
    assert!(matches!(result, Err(OrmError::InvalidLimit(_))));
}

#[tokio::test]
async fn test_count() {
    let (repo, _temp) = setup_test_db().await;
    for name in ["a", "b", "c"] {
        repo.save(&mut player(name)).await.unwrap();
    }

    assert_eq!(repo.count::<Player>(None, Vec::new()).await.unwrap(), 3);
    assert_eq!(
        repo.count::<Player>(Some("`name` <> ?"), vec![Value::from("a")])
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn test_duplicate_key_error_propagates() {
    let (repo, _temp) = setup_test_db().await;

    let mut first = player("alice");
    first.id = Some("fixed".to_string());
    repo.save(&mut first).await.unwrap();

    let mut second = player("bob");
    second.id = Some("fixed".to_string());
    let err = repo.save(&mut second).await.unwrap_err();
    assert!(matches!(err, OrmError::Database(_)));

    // The pool keeps serving after the failure.
    let all = repo.find_all::<Player>(FindOptions::new()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_concurrent_saves_share_small_pool() {
    let (repo, _temp) = setup_test_db_with_pool_size(2).await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                let mut p = player(&format!("worker{}", i));
                p.score = Some(i);
                repo.save(&mut p).await
            })
        })
        .collect();

    for handle in handles {
        let outcome = handle.await.unwrap().expect("save failed");
        assert!(!outcome.is_anomaly());
    }

    assert_eq!(repo.count::<Player>(None, Vec::new()).await.unwrap(), 8);
}
