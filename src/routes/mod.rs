use serde_json::json;

pub mod prices;
pub mod products;

/// Failure envelope shared by every pricing endpoint.
pub(crate) fn failure(message: &str) -> serde_json::Value {
    json!({ "success": false, "message": message })
}
