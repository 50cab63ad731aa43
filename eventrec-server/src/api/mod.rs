//! HTTP API handlers for eventrec-server

pub mod categories;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod health;
pub mod media;
pub mod report;
pub mod session;
pub mod sse;

pub use categories::{add_category, add_subcategory, list_categories};
pub use dashboard::dashboard;
pub use error::ApiError;
pub use events::{create_event, delete_event, get_event, list_events, update_event};
pub use health::health_routes;
pub use media::upload_media;
pub use report::{export_report, report};
pub use session::{session_middleware, EditorSession, ROLE_HEADER, USER_HEADER};
pub use sse::notification_stream;
