use funnel_tracker::{config, load_data, resolve_data_path, router, AppState};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let data_path = resolve_data_path()?;
    if let Some(parent) = data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let data = load_data(&data_path).await;
    let api_key = config::collector_key();
    if api_key.is_none() {
        info!("COLLECTOR_ANON_KEY not set, accepting unauthenticated inserts");
    }
    let state = AppState::new(data_path, data, config::events_table()).with_api_key(api_key);

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config::port()));

    info!("collector listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
