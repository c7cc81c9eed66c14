use serde_json::Value;

pub const NUTRITION_PATH_SUFFIX: &str = "nutrition";

/// `GET {base_url}/recipes/{recipe_id}/nutrition`
pub fn recipe_nutrition_url(base_url: &str, recipe_id: &str) -> String {
    format!(
        "{}/recipes/{}/{}",
        base_url.trim_end_matches('/'),
        recipe_id.trim(),
        NUTRITION_PATH_SUFFIX
    )
}

/// Key under which wrapped response bodies carry the nutrition payload.
pub const NUTRIENTS_KEY: &str = "nutrients";

/// Pulls the nutrition payload out of a lookup response body.
///
/// Servers answer with a wrapper object (`{"recipe_id": .., "nutrients": ..}`), a bare list of
/// `{nutrient_name, value, daily_pct}` records, or the named nutrition fields directly. Only the
/// wrapper is unpacked; everything else is handed to the normalizer as-is, which copes with
/// either nutrition shape.
pub fn nutrition_from_body(body: Value) -> Value {
    match body {
        Value::Object(mut obj) if obj.contains_key(NUTRIENTS_KEY) => {
            obj.remove(NUTRIENTS_KEY).unwrap_or(Value::Null)
        }
        other => other,
    }
}
