use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zip_api::{
    AppState,
    config::{AppConfig, Env},
    create_router,
};

/// main
///
/// Loads configuration, sets up logging, opens the store and serves HTTP.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let config = AppConfig::load()?;

    // RUST_LOG wins; otherwise verbose for this crate, request summaries for tower_http.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "zip_api=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    let repo = zip_api::build_repository(&config).await?;

    if let Some(seed) = &config.seed_user {
        zip_api::seed_login_user(repo.as_ref(), seed).await?;
    }

    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState { repo, config });

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API documentation available at /swagger-ui");

    axum::serve(listener, app).await?;
    Ok(())
}
