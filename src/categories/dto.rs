use serde::Deserialize;

/// Request body for creating a category. Fields are optional so missing
/// input becomes a 400 with a message instead of a deserialize rejection.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Request body for a partial category update. Absent fields keep their
/// current values.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub(crate) fn valid_entry_type(kind: &str) -> bool {
    matches!(kind, "income" | "expense")
}
