//! Category registry routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use eventrec_common::notify::Notification;
use eventrec_common::taxonomy::CategoryEntry;
use serde::Deserialize;

use super::{ApiError, EditorSession};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NameBody {
    pub name: String,
}

/// GET /api/categories
///
/// Categories in registry order, each with its sub-categories.
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<CategoryEntry>> {
    Json(state.taxonomy.read().await.entries().to_vec())
}

/// POST /api/categories
///
/// 201 when added, 200 when the name was already registered.
pub async fn add_category(
    State(state): State<AppState>,
    _editor: EditorSession,
    Json(body): Json<NameBody>,
) -> Result<(StatusCode, Json<Vec<CategoryEntry>>), ApiError> {
    let name = required_name(&body.name)?;

    let mut taxonomy = state.taxonomy.write().await;
    let status = if taxonomy.add_category(name) {
        state.notifications().emit_lossy(Notification::success(
            "Category Added",
            format!("{} has been added to the categories list.", name),
        ));
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(taxonomy.entries().to_vec())))
}

/// POST /api/categories/:name/subcategories
pub async fn add_subcategory(
    State(state): State<AppState>,
    _editor: EditorSession,
    Path(category): Path<String>,
    Json(body): Json<NameBody>,
) -> Result<(StatusCode, Json<Vec<String>>), ApiError> {
    let name = required_name(&body.name)?;

    let mut taxonomy = state.taxonomy.write().await;
    if !taxonomy.contains(&category) {
        return Err(ApiError::NotFound(format!("Category '{}' not found", category)));
    }

    let status = if taxonomy.add_subcategory(&category, name) {
        state.notifications().emit_lossy(Notification::success(
            "Event Type Added",
            format!("{} has been added to the event types list for {}.", name, category),
        ));
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(taxonomy.subcategories_of(&category))))
}

fn required_name(raw: &str) -> Result<&str, ApiError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name must not be blank".to_string()));
    }
    Ok(name)
}
