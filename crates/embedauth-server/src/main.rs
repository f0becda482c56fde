//! EmbedAuth HTTP server.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use embedauth_auth::AuthConfig;
use embedauth_db::{DbConfig, DbManager};
use embedauth_server::app::{build_gateway, create_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "embedauth-server")]
#[command(about = "Multi-tenant embeddable authentication service")]
struct Cli {
    /// Bind address for the HTTP server.
    #[arg(long, env = "EMBEDAUTH_BIND", default_value = "0.0.0.0:3001")]
    bind: String,

    /// SurrealDB endpoint, e.g. `ws://127.0.0.1:8000` or `memory`.
    #[arg(long, env = "EMBEDAUTH_DB_URL", default_value = "memory")]
    db_url: String,

    #[arg(long, env = "EMBEDAUTH_DB_NAMESPACE", default_value = "embedauth")]
    db_namespace: String,

    #[arg(long, env = "EMBEDAUTH_DB_NAME", default_value = "main")]
    db_name: String,

    /// Root username for remote SurrealDB endpoints.
    #[arg(long, env = "EMBEDAUTH_DB_USER")]
    db_user: Option<String>,

    /// Root password for remote SurrealDB endpoints.
    #[arg(long, env = "EMBEDAUTH_DB_PASS")]
    db_pass: Option<String>,

    /// Session lifetime in days.
    #[arg(long, env = "EMBEDAUTH_SESSION_DAYS", default_value_t = 7)]
    session_days: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("embedauth_server=info,embedauth_db=info")),
        )
        .init();

    let cli = Cli::parse();

    let db_config = DbConfig {
        url: cli.db_url,
        namespace: cli.db_namespace,
        database: cli.db_name,
        username: cli.db_user,
        password: cli.db_pass,
    };

    let manager = DbManager::connect(&db_config).await?;
    let db = manager.client();
    embedauth_db::run_migrations(&db).await?;

    let auth_config = AuthConfig {
        session_lifetime_days: cli.session_days,
        ..Default::default()
    };
    let gateway = Arc::new(build_gateway(db, auth_config));
    let app = create_router(gateway);

    let listener = tokio::net::TcpListener::bind(&cli.bind).await?;
    info!(bind = %cli.bind, "EmbedAuth server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
