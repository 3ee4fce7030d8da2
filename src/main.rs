use std::sync::Arc;

use gigwire::{AppState, auth::token::JwtKeys, db, hub::ChatHub};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gigwire=debug,info")),
        )
        .init();

    let database_url =
        dotenv::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://gigwire.db?mode=rwc".to_owned());
    let jwt_secret =
        dotenv::var("JWT_SECRET").unwrap_or_else(|_| "change-me-in-production".to_owned());
    let bind_addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());

    let db_pool = db::connect(&database_url).await?;
    db::init_schema(&db_pool).await?;

    let app_state = AppState {
        db_pool,
        jwt: JwtKeys::new(&jwt_secret),
        hub: Arc::new(ChatHub::new()),
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(%bind_addr, "gigwire listening");
    axum::serve(listener, gigwire::app(app_state)).await?;
    Ok(())
}
