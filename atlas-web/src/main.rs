use std::net::SocketAddr;

use atlas_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let state = AppState::from_env().await;
    if state.demo_mode {
        tracing::info!("running in demo mode, probe results are simulated");
    }

    // Serve bundled assets when a static build is present
    let static_dir = std::env::current_dir()?.join("static");
    let app = if static_dir.exists() {
        tracing::info!("Serving static files from {}", static_dir.display());
        atlas_web::build_router_with_static(state.clone(), static_dir.to_str().unwrap())
    } else {
        tracing::info!("No static build found, serving pages only");
        atlas_web::build_router(state.clone())
    };

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("atlas-web listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.pools.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
    }
}
