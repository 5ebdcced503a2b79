pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    error::Result,
    services::{
        comparables_service::ComparablesService, feed_service::IdeaFeed,
        session_service::SessionStore,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<RwLock<IdeaFeed>>,
    pub sessions: Arc<RwLock<SessionStore>>,
    pub comparables: Arc<ComparablesService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let comparables = ComparablesService::from_config(&config)?;

        let mut feed = IdeaFeed::new();
        if config.seed_sample_ideas {
            feed.seed_samples(chrono::Utc::now());
        }

        Ok(Self {
            feed: Arc::new(RwLock::new(feed)),
            sessions: Arc::new(RwLock::new(SessionStore::new())),
            comparables: Arc::new(comparables),
            config: Arc::new(config),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .allowed_origins
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid allowed origin: {}", origin);
                        None
                    }
                })
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    // Readable without a session; posting still takes `AuthUser`
    let public_routes = Router::new()
        .route("/api/auth/sign-in", post(handlers::auth::sign_in))
        .route("/api/feed/filters", get(handlers::ideas::get_time_filters))
        .route(
            "/api/ideas",
            get(handlers::ideas::get_ideas).post(handlers::ideas::create_idea),
        )
        .route("/api/ideas/{idea_id}", get(handlers::ideas::get_idea));

    // Protected routes
    let protected_routes = Router::new()
        .route("/api/auth/sign-out", post(handlers::auth::sign_out))
        .route("/api/auth/me", get(handlers::auth::get_current_user))
        .route("/api/ideas/mine", get(handlers::ideas::get_my_ideas))
        .route("/api/ideas/{idea_id}/vote", post(handlers::ideas::vote_idea));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
