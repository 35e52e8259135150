use anyhow::Context;

use marketplace_infra::{AppConfig, Marketplace, Repositories, postgres};

const POOL_SIZE: u32 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    marketplace_observability::init(config.log_format);

    if config.default_admin {
        tracing::warn!("admin credentials not set; using insecure default admin/admin");
    }

    let repositories = match &config.database_url {
        Some(url) => {
            let pool = postgres::connect(url, POOL_SIZE)
                .await
                .context("failed to connect to Postgres")?;
            postgres::ensure_schema(&pool)
                .await
                .context("failed to prepare database schema")?;
            tracing::info!("using PostgreSQL storage");
            Repositories::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory storage");
            Repositories::in_memory()
        }
    };

    let marketplace = Marketplace::wire(repositories).context("service wiring failed")?;
    {
        let marketplace = marketplace.clone();
        let admin = config.admin.clone();
        tokio::task::spawn_blocking(move || marketplace.seed_admin(&admin.username, &admin.password))
            .await
            .context("admin seeding aborted")?
            .context("failed to seed admin account")?;
    }

    let app = marketplace_api::app::build_app(marketplace);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
