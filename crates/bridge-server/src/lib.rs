mod auth;
mod cors;

use std::any::Any;
use std::net::SocketAddr;

use axum::Json;
use axum::Router;
use axum::response::{IntoResponse, Response};
use bridge_config::Config;
use bridge_core::ErrorBody;
use http::StatusCode;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the transcription pipeline fails to initialize
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let pipeline = stt::build_pipeline(config)?;

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health));
        }

        // route_layer keeps unknown paths at 404 instead of 401
        app = app.merge(
            stt::endpoint_router(&config.upload)
                .route_layer(axum::middleware::from_fn(auth::auth_middleware))
                .with_state(pipeline),
        );

        // Apply middleware layers (innermost first)
        app = app.layer(TraceLayer::new_for_http());

        if config.server.cors.enabled {
            app = app.layer(cors::cors_layer(&config.server.cors));
        }

        app = app
            .layer(TimeoutLayer::new(config.server.request_timeout))
            .layer(CatchPanicLayer::custom(panic_response));

        Ok(Self {
            router: app,
            listen_address: config.server.listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

async fn health() -> &'static str {
    "ok"
}

#[allow(clippy::needless_pass_by_value)]
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    tracing::error!(panic = detail, "request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("Internal server error")),
    )
        .into_response()
}
