use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::StockService;

pub mod routes;

/// Server state
pub struct AppState {
    pub service: StockService,
}

impl AppState {
    /// Identifier of the collection served by this state
    pub fn collection(&self) -> String {
        self.service.gateway().collection_uri().to_uri_string()
    }

    /// Identifier of one item; `id` is passed through unparsed
    pub fn item(&self, id: &str) -> String {
        format!("{}/{}", self.collection(), id)
    }
}

pub fn router(service: StockService) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route(
            "/stock",
            get(routes::list_collection)
                .post(routes::create_item)
                .delete(routes::delete_collection),
        )
        .route(
            "/stock/{id}",
            get(routes::get_item)
                .patch(routes::update_item)
                .delete(routes::delete_item),
        )
        .route("/stock/{id}/sale", post(routes::sell_item))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(port: u16, service: StockService) -> anyhow::Result<()> {
    let app = router(service);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
