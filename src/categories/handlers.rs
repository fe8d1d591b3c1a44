use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    categories::{
        dto::{valid_entry_type, CreateCategoryRequest, UpdateCategoryRequest},
        repo::Category,
    },
    error::ApiError,
    state::AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            put(update_category).delete(delete_category),
        )
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = Category::list_by_user(&state.db, user.id).await?;
    Ok(Json(categories))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
    let kind = payload.kind.as_deref().unwrap_or_default();

    if name.is_empty() || kind.is_empty() {
        return Err(ApiError::Validation(
            "Please add a name and type for the category".into(),
        ));
    }
    if !valid_entry_type(kind) {
        return Err(ApiError::Validation(
            r#"Type must be either "income" or "expense""#.into(),
        ));
    }

    // Uniqueness is scoped to the owner; other users may reuse the name.
    if Category::find_by_name(&state.db, user.id, name)
        .await?
        .is_some()
    {
        warn!(user_id = %user.id, name = %name, "duplicate category name");
        return Err(ApiError::Duplicate(
            "Category with this name already exists for you".into(),
        ));
    }

    let category = Category::create(&state.db, user.id, name, kind).await?;
    info!(user_id = %user.id, category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let category = Category::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".into()))?;

    if category.user_id != user.id {
        warn!(user_id = %user.id, category_id = %id, "category owned by another user");
        return Err(ApiError::Forbidden(
            "Not authorized to update this category".into(),
        ));
    }

    // Absent or blank fields keep their current values.
    let kind = match payload.kind.as_deref() {
        Some(k) if !k.is_empty() => {
            if !valid_entry_type(k) {
                return Err(ApiError::Validation(
                    r#"Type must be either "income" or "expense""#.into(),
                ));
            }
            k.to_string()
        }
        _ => category.kind.clone(),
    };
    let name = match payload.name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => category.name.clone(),
    };

    if name != category.name
        && Category::find_by_name(&state.db, user.id, &name)
            .await?
            .is_some()
    {
        warn!(user_id = %user.id, name = %name, "duplicate category name");
        return Err(ApiError::Duplicate(
            "Category with this name already exists for you".into(),
        ));
    }

    let updated = Category::update(&state.db, id, &name, &kind).await?;
    info!(user_id = %user.id, category_id = %id, "category updated");
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let category = Category::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".into()))?;

    if category.user_id != user.id {
        warn!(user_id = %user.id, category_id = %id, "category owned by another user");
        return Err(ApiError::Forbidden(
            "Not authorized to delete this category".into(),
        ));
    }

    Category::delete(&state.db, id).await?;
    info!(user_id = %user.id, category_id = %id, "category deleted");
    Ok(Json(json!({ "message": "Category removed successfully" })))
}
