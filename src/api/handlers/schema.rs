use axum::Json;
use schemars::schema_for;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::insight::Insight;

/// JSON Schema for the `Insight` payload — the same schema the narrative
/// generator is prompted with.
pub async fn get_schema() -> Result<Json<Value>, ApiError> {
    let schema = schema_for!(Insight);
    Ok(Json(serde_json::to_value(schema).map_err(|e| {
        ApiError::Internal(format!("serializing schema: {e}"))
    })?))
}
