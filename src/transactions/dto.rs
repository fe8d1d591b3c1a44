use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::transactions::repo::TransactionWithCategory;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Request body for creating a transaction. Fields are optional so missing
/// input becomes a 400 with a message instead of a deserialize rejection.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
    pub category: Option<Uuid>,
}

/// Request body for a partial transaction update. An absent `description`
/// keeps the stored value; an explicit `""` clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionRequest {
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
    pub category: Option<Uuid>,
}

/// Category details embedded in transaction responses.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Transaction as returned to clients, with the category reference expanded.
/// `category` is null when the referenced category no longer exists.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub date: Date,
    pub category: Option<CategoryRef>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<TransactionWithCategory> for TransactionResponse {
    fn from(row: TransactionWithCategory) -> Self {
        let category = match (row.category_name, row.category_kind) {
            (Some(name), Some(kind)) => Some(CategoryRef {
                id: row.category_id,
                name,
                kind,
            }),
            _ => None,
        };
        Self {
            id: row.id,
            user_id: row.user_id,
            amount: row.amount,
            kind: row.kind,
            description: row.description,
            date: row.date,
            category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) fn valid_entry_type(kind: &str) -> bool {
    matches!(kind, "income" | "expense")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn entry_types_are_income_or_expense() {
        assert!(valid_entry_type("income"));
        assert!(valid_entry_type("expense"));
        assert!(!valid_entry_type("savings"));
        assert!(!valid_entry_type(""));
    }

    #[test]
    fn create_request_parses_iso_date() {
        let req: CreateTransactionRequest = serde_json::from_str(
            r#"{
                "amount": 15000.0,
                "type": "expense",
                "date": "2024-01-01",
                "category": "8f2e1b34-9c7d-4a16-b5e8-0d3f6a291c45"
            }"#,
        )
        .expect("deserialize");
        assert_eq!(req.amount, Some(15000.0));
        assert_eq!(req.kind.as_deref(), Some("expense"));
        assert_eq!(req.date, Some(date!(2024 - 01 - 01)));
        assert!(req.description.is_none());
    }

    #[test]
    fn description_absent_and_empty_are_distinct() {
        let absent: UpdateTransactionRequest =
            serde_json::from_str(r#"{"amount": 10.0}"#).expect("deserialize");
        assert!(absent.description.is_none());

        let cleared: UpdateTransactionRequest =
            serde_json::from_str(r#"{"description": ""}"#).expect("deserialize");
        assert_eq!(cleared.description.as_deref(), Some(""));
    }

    #[test]
    fn response_expands_category_fields() {
        let row = TransactionWithCategory {
            id: uuid::Uuid::new_v4(),
            user_id: uuid::Uuid::new_v4(),
            category_id: uuid::Uuid::new_v4(),
            amount: 15000.0,
            kind: "expense".to_string(),
            description: String::new(),
            date: date!(2024 - 01 - 01),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
            category_name: Some("Food".to_string()),
            category_kind: Some("expense".to_string()),
        };
        let resp = TransactionResponse::from(row);
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["type"], "expense");
        assert_eq!(json["category"]["name"], "Food");
        assert_eq!(json["category"]["type"], "expense");
    }

    #[test]
    fn dangling_category_expands_to_null() {
        let row = TransactionWithCategory {
            id: uuid::Uuid::new_v4(),
            user_id: uuid::Uuid::new_v4(),
            category_id: uuid::Uuid::new_v4(),
            amount: 1.0,
            kind: "income".to_string(),
            description: "stale".to_string(),
            date: date!(2024 - 06 - 15),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
            category_name: None,
            category_kind: None,
        };
        let resp = TransactionResponse::from(row);
        let json = serde_json::to_value(&resp).expect("serialize");
        assert!(json["category"].is_null());
    }
}
