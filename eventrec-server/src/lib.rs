//! eventrec-server library - HTTP surface over the event repository
//!
//! Browse, filter and export routes need a session; create/edit/delete,
//! category additions and media uploads additionally need the `edit` role.

use std::sync::Arc;

use axum::Router;
use eventrec_common::media::MediaUploader;
use eventrec_common::notify::NotificationBus;
use eventrec_common::report::ReportExporter;
use eventrec_common::taxonomy::TaxonomyRegistry;
use eventrec_common::EventRepository;
use tokio::sync::RwLock;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Authoritative event list
    pub repository: Arc<EventRepository>,
    /// Category registry (session-lifetime, not persisted)
    pub taxonomy: Arc<RwLock<TaxonomyRegistry>>,
    pub exporter: Arc<ReportExporter>,
    pub uploader: Arc<dyn MediaUploader>,
}

impl AppState {
    /// Create new application state with the default category set
    pub fn new(
        repository: Arc<EventRepository>,
        exporter: ReportExporter,
        uploader: Arc<dyn MediaUploader>,
    ) -> Self {
        Self {
            repository,
            taxonomy: Arc::new(RwLock::new(TaxonomyRegistry::with_defaults())),
            exporter: Arc::new(exporter),
            uploader,
        }
    }

    pub fn notifications(&self) -> &NotificationBus {
        self.repository.notifications()
    }
}

/// Build application router
///
/// `/health` is public; everything under `/api` passes through the session
/// middleware.
pub fn build_router(state: AppState) -> Router {
    use axum::extract::DefaultBodyLimit;
    use axum::middleware;
    use axum::routing::{get, post};
    use tower_http::trace::TraceLayer;

    let protected = Router::new()
        .route(
            "/api/events",
            get(api::list_events).post(api::create_event),
        )
        .route(
            "/api/events/:id",
            get(api::get_event)
                .put(api::update_event)
                .delete(api::delete_event),
        )
        .route(
            "/api/categories",
            get(api::list_categories).post(api::add_category),
        )
        .route(
            "/api/categories/:name/subcategories",
            post(api::add_subcategory),
        )
        .route("/api/dashboard", get(api::dashboard))
        .route("/api/report", get(api::report))
        .route("/api/report/export", post(api::export_report))
        .route(
            "/api/media",
            post(api::upload_media).layer(DefaultBodyLimit::max(api::media::MEDIA_BODY_LIMIT)),
        )
        .route("/api/notifications", get(api::notification_stream))
        .layer(middleware::from_fn(api::session_middleware));

    let public = Router::new().merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
