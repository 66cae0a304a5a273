use crate::config::PracticeConfig;
use crate::handlers;
use crate::middleware::auth_middleware;
use crate::services::{JwtService, MongoDb};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: PracticeConfig,
    pub db: MongoDb,
    pub jwt: JwtService,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: PracticeConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;
        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let jwt = JwtService::new(&config.jwt);

        let state = AppState {
            config: config.clone(),
            db: db.clone(),
            jwt,
        };

        let app = build_router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn db(&self) -> &MongoDb {
        &self.state.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub fn build_router(state: AppState) -> Router {
    // Everything past login requires a resolved identity.
    let protected = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/cases",
            get(handlers::cases::list_cases).post(handlers::cases::create_case),
        )
        .route(
            "/cases/:id",
            get(handlers::cases::get_case)
                .put(handlers::cases::update_case)
                .delete(handlers::cases::delete_case),
        )
        .route(
            "/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/client/profile",
            get(handlers::clients::get_profile).put(handlers::clients::update_profile),
        )
        .route("/client/cases", get(handlers::clients::list_client_cases))
        .route(
            "/invoices",
            get(handlers::invoices::list_invoices).post(handlers::invoices::create_invoice),
        )
        .route("/invoices/stats", get(handlers::invoices::invoice_stats))
        .route(
            "/invoices/recent-activity",
            get(handlers::invoices::recent_activity),
        )
        .route(
            "/invoices/:id",
            get(handlers::invoices::get_invoice)
                .put(handlers::invoices::update_invoice)
                .delete(handlers::invoices::delete_invoice),
        )
        .route(
            "/events",
            get(handlers::events::list_events).post(handlers::events::create_event),
        )
        .route(
            "/events/:id",
            get(handlers::events::get_event)
                .put(handlers::events::update_event)
                .delete(handlers::events::delete_event),
        )
        .route(
            "/tasks",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(handlers::tasks::get_task)
                .put(handlers::tasks::update_task)
                .delete(handlers::tasks::delete_task),
        )
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/client/login", post(handlers::auth::client_login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
