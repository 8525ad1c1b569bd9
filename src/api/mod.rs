//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Thin REST adapter over the catalog using Axum. Commands go to the write side, reads come
// from the projections, so a GET right after a POST may still answer 404.
//
// | Component      | Description                                                |
// |----------------|------------------------------------------------------------|
// | API            | Router and server lifecycle                                |
// | Routes         | Handler functions for API endpoints                        |
// | States         | Shared application state                                   |
// | DTOs           | Request bodies and write-side responses                    |
//
//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name           | Description                                       | Key Methods       |
// |----------------|---------------------------------------------------|-------------------|
// | AppState       | Shared application state                          | new               |
// | Api            | Main API structure                                | routes, serve     |
//--------------------------------------------------------------------------------------------------

mod dto;
mod error;
mod routes;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::app::Catalog;

pub use dto::*;
pub use error::{ApiError, ApiResult};

/// Shared application state accessible by all handlers
pub struct AppState {
    pub catalog: Catalog,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

/// Main API structure
pub struct Api {
    addr: SocketAddr,
    state: Arc<AppState>,
}

impl Api {
    pub fn new(addr: SocketAddr, catalog: Catalog) -> Self {
        Self {
            addr,
            state: Arc::new(AppState::new(catalog)),
        }
    }

    /// Creates all routes for the API
    pub fn routes(&self) -> Router {
        router(self.state.clone())
    }

    /// Serves until `shutdown` is cancelled.
    ///
    /// # Errors
    /// Binding the listener or accepting connections failed.
    pub async fn serve(self, shutdown: CancellationToken) -> std::io::Result<()> {
        let app = self.routes();
        let listener = TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "API listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("API stopped");
        Ok(())
    }
}

/// Builds the router over an existing state
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(routes::health))
        // Commands
        .route("/artists", post(routes::subscribe_artist))
        .route("/albums", post(routes::publish_album))
        .route("/songs", post(routes::publish_song))
        .route("/songs/:id/plays", post(routes::play_song))
        // Projections
        .route("/artists/:id", get(routes::get_artist))
        .route("/artists/:id/albums", get(routes::get_albums_by_artist))
        .route("/albums/:id", get(routes::get_album))
        .route("/songs/:id", get(routes::get_song))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
