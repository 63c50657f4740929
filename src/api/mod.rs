use axum::{
    Router,
    routing::{get, get_service, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::upstream::PerplexityClient;

pub mod handlers;
pub mod models;

/// Fixed page routes and the file under the public directory each one serves.
pub const PAGES: &[(&str, &str)] = &[
    ("/", "demo.html"),
    ("/full", "app.html"),
    ("/login", "login.html"),
    ("/app", "app.html"),
];

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub upstream: PerplexityClient,
}

impl AppState {
    pub fn new(config: Config) -> AppState {
        let upstream = PerplexityClient::from_config(&config);
        AppState {
            config: Arc::new(config),
            upstream,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_dir = state.config.public_dir.clone();
    let brand_dir = state.config.brand_dir.clone();

    let mut router = Router::new()
        // API routes
        .route("/api/config", get(handlers::config_handler))
        .route("/api/perplexity", post(handlers::perplexity_handler))
        .route("/api/ai-search", post(handlers::ai_search_handler))
        .with_state(state);

    // Pages (auth disabled)
    for &(path, file) in PAGES {
        router = router.route(path, get_service(ServeFile::new(public_dir.join(file))));
    }

    router
        .nest_service("/brand", ServeDir::new(brand_dir))
        .fallback_service(ServeDir::new(public_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
