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
    categories::repo::Category,
    error::ApiError,
    state::AppState,
    transactions::{
        dto::{
            valid_entry_type, CategoryRef, CreateTransactionRequest, TransactionResponse,
            UpdateTransactionRequest,
        },
        repo::Transaction,
    },
};

pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/transactions/:id",
            put(update_transaction).delete(delete_transaction),
        )
}

#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let rows = Transaction::list_expanded_by_user(&state.db, user.id).await?;
    let items = rows.into_iter().map(TransactionResponse::from).collect();
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn create_transaction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let kind = payload.kind.as_deref().unwrap_or_default();
    let (Some(amount), Some(date), Some(category_id)) =
        (payload.amount, payload.date, payload.category)
    else {
        return Err(ApiError::Validation(
            "Please add amount, type, date, and category".into(),
        ));
    };
    if kind.is_empty() {
        return Err(ApiError::Validation(
            "Please add amount, type, date, and category".into(),
        ));
    }
    if !valid_entry_type(kind) {
        return Err(ApiError::Validation(
            r#"Type must be either "income" or "expense""#.into(),
        ));
    }
    if amount < 0.0 {
        return Err(ApiError::Validation(
            "Amount must be a non-negative number".into(),
        ));
    }

    // The referenced category must exist and belong to the caller. The check
    // and the insert are separate statements; a category deleted in between
    // leaves a dangling reference.
    let category = Category::find_owned(&state.db, category_id, user.id)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %user.id, category_id = %category_id, "category not owned");
            ApiError::InvalidCategory(
                "Invalid category or category does not belong to user".into(),
            )
        })?;

    let description = payload.description.unwrap_or_default();
    let txn = Transaction::create(
        &state.db,
        user.id,
        category.id,
        amount,
        kind,
        &description,
        date,
    )
    .await?;

    info!(user_id = %user.id, transaction_id = %txn.id, "transaction created");
    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse {
            id: txn.id,
            user_id: txn.user_id,
            amount: txn.amount,
            kind: txn.kind,
            description: txn.description,
            date: txn.date,
            category: Some(CategoryRef {
                id: category.id,
                name: category.name,
                kind: category.kind,
            }),
            created_at: txn.created_at,
            updated_at: txn.updated_at,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_transaction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let txn = Transaction::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".into()))?;

    if txn.user_id != user.id {
        warn!(user_id = %user.id, transaction_id = %id, "transaction owned by another user");
        return Err(ApiError::Forbidden(
            "Not authorized to update this transaction".into(),
        ));
    }

    let kind = match payload.kind.as_deref() {
        Some(k) if !k.is_empty() => {
            if !valid_entry_type(k) {
                return Err(ApiError::Validation(
                    r#"Type must be either "income" or "expense""#.into(),
                ));
            }
            k.to_string()
        }
        _ => txn.kind.clone(),
    };

    if let Some(amount) = payload.amount {
        if amount < 0.0 {
            return Err(ApiError::Validation(
                "Amount must be a non-negative number".into(),
            ));
        }
    }

    // A reassigned category goes through the same ownership check as create.
    if let Some(category_id) = payload.category {
        Category::find_owned(&state.db, category_id, user.id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %user.id, category_id = %category_id, "category not owned");
                ApiError::InvalidCategory(
                    "Invalid category or category does not belong to user".into(),
                )
            })?;
    }

    let amount = payload.amount.unwrap_or(txn.amount);
    // An explicit "" clears the description; an absent field keeps it.
    let description = payload.description.unwrap_or_else(|| txn.description.clone());
    let date = payload.date.unwrap_or(txn.date);
    let category_id = payload.category.unwrap_or(txn.category_id);

    Transaction::update(
        &state.db,
        id,
        category_id,
        amount,
        &kind,
        &description,
        date,
    )
    .await?;

    let expanded = Transaction::find_expanded(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".into()))?;

    info!(user_id = %user.id, transaction_id = %id, "transaction updated");
    Ok(Json(TransactionResponse::from(expanded)))
}

#[instrument(skip(state))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let txn = Transaction::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".into()))?;

    if txn.user_id != user.id {
        warn!(user_id = %user.id, transaction_id = %id, "transaction owned by another user");
        return Err(ApiError::Forbidden(
            "Not authorized to delete this transaction".into(),
        ));
    }

    Transaction::delete(&state.db, id).await?;
    info!(user_id = %user.id, transaction_id = %id, "transaction deleted");
    Ok(Json(json!({ "message": "Transaction removed successfully" })))
}
