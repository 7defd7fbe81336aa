use std::sync::Arc;
use tablemap::models::{Blog, Comment, User};
use tablemap::{OrmError, Pool, PoolConfig, Registry, Repository, SqlExecutor};

fn build_registry() -> Result<Registry, OrmError> {
    let mut registry = Registry::new();
    registry.register::<User>()?;
    registry.register::<Blog>()?;
    registry.register::<Comment>()?;
    Ok(registry)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match PoolConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Schemas are derived before any connection is opened
    let registry = match build_registry() {
        Ok(r) => Arc::new(r),
        Err(e) => {
            eprintln!("Model registration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match Pool::create(&config).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to create connection pool: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Repository::new(Arc::new(SqlExecutor::new(pool.clone())), registry.clone());

    for schema in registry.schemas() {
        tracing::info!(table = schema.table_name(), select = schema.select_stmt(), "Model ready");
    }

    match repo.count::<User>(None, Vec::new()).await {
        Ok(n) => tracing::info!(users = n, "Database reachable"),
        Err(e) => {
            eprintln!("Database check failed: {}", e);
            pool.close().await;
            std::process::exit(1);
        }
    }

    pool.close().await;
}
