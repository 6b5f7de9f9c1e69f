//! Gateway Binary - HTTP API in front of the resolver and media proxy
//!
//! Wires up:
//! - reqwest outbound adapter
//! - Configured metadata source (aggregator API or page scraper)
//! - axum inbound adapter

use clipfetch::adapters::http::{router, AppState};
use clipfetch::adapters::ReqwestClient;
use clipfetch::application::{build_source, MediaProxy, ResolverService, UrlNormalizer};
use clipfetch::config::GatewayConfig;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = GatewayConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Adapters
    let client = match ReqwestClient::new() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("Failed to build HTTP client: {:?}", e);
            std::process::exit(1);
        }
    };

    // 2. Application Services
    let source = build_source(&config, client.clone());
    let resolver = Arc::new(ResolverService::new(
        UrlNormalizer::new(client.clone()),
        source,
    ));
    tracing::info!("Resolving through {}", resolver.source_name());

    let proxy = Arc::new(MediaProxy::new(client));

    // 3. HTTP Layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(AppState { resolver, proxy })
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // 4. Start Server
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .expect("Failed to bind TCP listener");
    tracing::info!("Listening at {}", config.bind_addr());
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
