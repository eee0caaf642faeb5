use clap::Parser;
use running_loops::{
    AppState, config::ServerConfig, create_router, directions::DirectionsClient,
    geocoder::NominatimClient,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "running_loops=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();
    if config.directions_api_key.is_none() {
        tracing::warn!(
            "DIRECTIONS_API_KEY is not set; requests to {} are unauthenticated",
            config.directions_url
        );
    }
    if let Some(seed) = config.seed {
        tracing::info!("using fixed waypoint seed {seed}");
    }

    let directions = DirectionsClient::new(config.directions_params())?;
    let geocoder = NominatimClient::new(config.geocoder_params())?;
    let state = AppState::new(directions, geocoder).with_seed(config.seed);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = create_router(state).layer(cors);

    tracing::info!("starting loop planner on http://{}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
