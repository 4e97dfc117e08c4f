use clap::Parser;
use dotenvy::dotenv;
use std::env;
use tracing_subscriber::EnvFilter;
use union_connect::app::app;
use union_connect::appstate::AppState;
use union_connect::config::Config;

#[tokio::main]
async fn main() {
    dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        unsafe {
            // Concurrent writing of set_var is not permitted,
            // but we're in main, so that shouldn't be a problem.
            env::set_var("RUST_LOG", "INFO");
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::parse();
    let addr = config.site_addr.clone();
    let health_interval = config.health_interval();
    let sweep_interval = config.sweep_interval();

    let state = AppState::new(config);
    state.monitor.start(health_interval);
    let sweeper = state.start_sweeper(sweep_interval);

    let monitor = state.monitor.clone();
    let analytics = state.analytics.clone();

    tracing::info!("listening on http://{}", &addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind the tcp address");
    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("failed to serve on the address");

    monitor.stop();
    sweeper.abort();
    match analytics.flush() {
        Ok(sent) => tracing::info!("flushed {} analytics events on shutdown", sent),
        Err(e) => tracing::warn!("dropping analytics on shutdown: {}", e),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("shutting down");
}
