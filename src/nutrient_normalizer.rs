use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_GLYCEMIC_INDEX: f64 = 50.0;
/// Assumed soluble fiber (g) when nothing is known about the meal's fiber.
pub const DEFAULT_SOLUBLE_FIBER_G: f64 = 1.0;
/// Assumed insoluble fiber (g) when nothing is known about the meal's fiber.
pub const DEFAULT_INSOLUBLE_FIBER_G: f64 = 2.0;
pub const SOLUBLE_FIBER_SHARE: f64 = 0.33;
pub const INSOLUBLE_FIBER_SHARE: f64 = 0.67;

// Priority-ordered nutrient names for tagged lists, first match wins.
const CARB_NAMES: &[&str] = &["Total Carbohydrate", "Carbohydrates"];
const PROTEIN_NAMES: &[&str] = &["Protein"];
const FAT_NAMES: &[&str] = &["Total Fat", "Fat"];
const SOLUBLE_FIBER_NAMES: &[&str] = &["Soluble Fiber"];
const INSOLUBLE_FIBER_NAMES: &[&str] = &["Insoluble Fiber"];
const TOTAL_FIBER_NAMES: &[&str] = &["Fiber"];

/// Canonical per-meal nutrient record consumed by the glucose engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealNutrientProfile {
    pub total_carbs: f64,
    pub soluble_fiber: f64,
    pub insoluble_fiber: f64,
    pub protein: f64,
    pub fat: f64,
    pub glycemic_index: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_method: Option<String>,
}

impl Default for MealNutrientProfile {
    fn default() -> Self {
        MealNutrientProfile {
            total_carbs: 0.0,
            soluble_fiber: DEFAULT_SOLUBLE_FIBER_G,
            insoluble_fiber: DEFAULT_INSOLUBLE_FIBER_G,
            protein: 0.0,
            fat: 0.0,
            glycemic_index: DEFAULT_GLYCEMIC_INDEX,
            cooking_method: None,
        }
    }
}

/// Nutrition already exposed as named fields ("Shape A"). Every field is optional;
/// absent values are filled in by [`normalize_direct`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectNutrition {
    pub carbs: Option<f64>,
    pub fiber: Option<f64>,
    pub soluble_fiber: Option<f64>,
    pub insoluble_fiber: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub glycemic_index: Option<f64>,
    pub cooking_method: Option<String>,
}

impl DirectNutrition {
    /// Reads the known fields out of a JSON object. Fields holding anything other than a
    /// finite number (or a numeric string) are treated as absent rather than rejected.
    pub fn from_json_object(obj: &Map<String, Value>) -> Self {
        DirectNutrition {
            carbs: obj.get("carbs").and_then(numeric),
            fiber: obj.get("fiber").and_then(numeric),
            soluble_fiber: obj.get("solubleFiber").and_then(numeric),
            insoluble_fiber: obj.get("insolubleFiber").and_then(numeric),
            protein: obj.get("protein").and_then(numeric),
            fat: obj.get("fat").and_then(numeric),
            glycemic_index: obj.get("GI").and_then(numeric),
            cooking_method: obj
                .get("cookingMethod")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

/// One `{nutrient_name, value, daily_pct}` triple from a recipe nutrition API ("Shape B").
#[derive(Debug, Clone, PartialEq)]
pub struct NutrientRecord {
    pub nutrient_name: String,
    pub value: Option<f64>,
    pub daily_pct: Option<f64>,
}

impl NutrientRecord {
    /// Entries without a name are dropped; non-numeric values become `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let nutrient_name = obj.get("nutrient_name")?.as_str()?.trim().to_string();
        Some(NutrientRecord {
            nutrient_name,
            value: obj.get("value").and_then(numeric),
            daily_pct: obj.get("daily_pct").and_then(numeric),
        })
    }
}

fn numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn non_negative(value: f64) -> f64 {
    value.max(0.0)
}

fn resolve_glycemic_index(direct: Option<f64>, meal_type_default_gi: Option<f64>) -> f64 {
    direct
        .or(meal_type_default_gi.filter(|gi| gi.is_finite()))
        .unwrap_or(DEFAULT_GLYCEMIC_INDEX)
}

/// Converts arbitrary nutrition JSON into a [`MealNutrientProfile`].
///
/// Objects are read as named fields, arrays as nutrient-name/value records. Any other
/// input yields the all-default profile; this function never fails.
///
/// # Arguments
/// * `raw`: nutrition data as received from a recipe lookup or a food log entry.
/// * `meal_type_default_gi`: GI to assume when the data carries none (see `MealSlot`).
pub fn normalize(raw: &Value, meal_type_default_gi: Option<f64>) -> MealNutrientProfile {
    match raw {
        Value::Object(obj) => {
            normalize_direct(&DirectNutrition::from_json_object(obj), meal_type_default_gi)
        }
        Value::Array(items) => {
            let records: Vec<NutrientRecord> =
                items.iter().filter_map(NutrientRecord::from_json).collect();
            normalize_tagged(&records, meal_type_default_gi)
        }
        _ => MealNutrientProfile {
            glycemic_index: resolve_glycemic_index(None, meal_type_default_gi),
            ..MealNutrientProfile::default()
        },
    }
}

pub fn normalize_direct(
    nutrition: &DirectNutrition,
    meal_type_default_gi: Option<f64>,
) -> MealNutrientProfile {
    let finite = |v: Option<f64>| v.filter(|n| n.is_finite());
    let total_fiber = finite(nutrition.fiber);

    let soluble_fiber = finite(nutrition.soluble_fiber)
        .or(total_fiber.map(|f| f * SOLUBLE_FIBER_SHARE))
        .unwrap_or(DEFAULT_SOLUBLE_FIBER_G);
    let insoluble_fiber = finite(nutrition.insoluble_fiber)
        .or(total_fiber.map(|f| f * INSOLUBLE_FIBER_SHARE))
        .unwrap_or(DEFAULT_INSOLUBLE_FIBER_G);

    MealNutrientProfile {
        total_carbs: non_negative(finite(nutrition.carbs).unwrap_or(0.0)),
        soluble_fiber: non_negative(soluble_fiber),
        insoluble_fiber: non_negative(insoluble_fiber),
        protein: non_negative(finite(nutrition.protein).unwrap_or(0.0)),
        fat: non_negative(finite(nutrition.fat).unwrap_or(0.0)),
        glycemic_index: resolve_glycemic_index(
            finite(nutrition.glycemic_index),
            meal_type_default_gi,
        ),
        cooking_method: nutrition.cooking_method.clone(),
    }
}

fn lookup(records: &[NutrientRecord], names: &[&str]) -> Option<f64> {
    names.iter().find_map(|name| {
        records
            .iter()
            .filter(|r| r.nutrient_name == *name)
            .find_map(|r| r.value)
    })
}

pub fn normalize_tagged(
    records: &[NutrientRecord],
    meal_type_default_gi: Option<f64>,
) -> MealNutrientProfile {
    let explicit_soluble = lookup(records, SOLUBLE_FIBER_NAMES);
    let explicit_insoluble = lookup(records, INSOLUBLE_FIBER_NAMES);
    let total_fiber = lookup(records, TOTAL_FIBER_NAMES);

    let soluble_fiber = explicit_soluble
        .or(total_fiber.map(|f| f * SOLUBLE_FIBER_SHARE))
        .unwrap_or(DEFAULT_SOLUBLE_FIBER_G);

    let insoluble_fiber = match (explicit_insoluble, total_fiber, explicit_soluble) {
        (Some(insoluble), _, _) => insoluble,
        // Combined figure alongside an explicit soluble one: the remainder is insoluble.
        (None, Some(fiber), Some(soluble)) => {
            let remainder = fiber - soluble;
            if remainder.is_finite() && remainder >= 0.0 {
                remainder
            } else {
                DEFAULT_INSOLUBLE_FIBER_G
            }
        }
        (None, Some(fiber), None) => fiber * INSOLUBLE_FIBER_SHARE,
        (None, None, _) => DEFAULT_INSOLUBLE_FIBER_G,
    };

    MealNutrientProfile {
        total_carbs: non_negative(lookup(records, CARB_NAMES).unwrap_or(0.0)),
        soluble_fiber: non_negative(soluble_fiber),
        insoluble_fiber: non_negative(insoluble_fiber),
        protein: non_negative(lookup(records, PROTEIN_NAMES).unwrap_or(0.0)),
        fat: non_negative(lookup(records, FAT_NAMES).unwrap_or(0.0)),
        glycemic_index: resolve_glycemic_index(None, meal_type_default_gi),
        cooking_method: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_garbage_input_yields_default_profile() {
        for raw in [Value::Null, json!(42), json!("pasta"), json!(true)] {
            assert_eq!(normalize(&raw, Some(50.0)), MealNutrientProfile::default());
        }
    }

    #[test]
    fn test_direct_fields_with_explicit_fiber_split() {
        let raw = json!({
            "carbs": 30, "solubleFiber": 1, "insolubleFiber": 2,
            "protein": 15, "fat": 10, "GI": 50
        });
        let profile = normalize(&raw, Some(55.0));
        assert_eq!(profile.total_carbs, 30.0);
        assert_eq!(profile.soluble_fiber, 1.0);
        assert_eq!(profile.insoluble_fiber, 2.0);
        assert_eq!(profile.protein, 15.0);
        assert_eq!(profile.fat, 10.0);
        assert_eq!(profile.glycemic_index, 50.0); // explicit GI beats the slot default
    }

    #[test]
    fn test_direct_total_fiber_is_split() {
        let profile = normalize(&json!({ "carbs": 40, "fiber": 9 }), None);
        assert!(approx(profile.soluble_fiber, 2.97));
        assert!(approx(profile.insoluble_fiber, 6.03));
    }

    #[test]
    fn test_direct_missing_fiber_keeps_minimum_assumption() {
        let profile = normalize(&json!({ "carbs": 40, "solubleFiber": "n/a" }), Some(40.0));
        assert_eq!(profile.soluble_fiber, 1.0);
        assert_eq!(profile.insoluble_fiber, 2.0);
        assert_eq!(profile.glycemic_index, 40.0);
    }

    #[test]
    fn test_negative_masses_are_clamped() {
        let profile = normalize(&json!({ "carbs": -5, "fat": -1, "protein": 3 }), None);
        assert_eq!(profile.total_carbs, 0.0);
        assert_eq!(profile.fat, 0.0);
        assert_eq!(profile.protein, 3.0);
    }

    #[test]
    fn test_cooking_method_is_carried() {
        let profile = normalize(&json!({ "carbs": 20, "cookingMethod": " fried " }), None);
        assert_eq!(profile.cooking_method.as_deref(), Some("fried"));
    }

    #[test]
    fn test_tagged_list_priority_names() {
        let raw = json!([
            { "nutrient_name": "Carbohydrates", "value": 99, "daily_pct": 30 },
            { "nutrient_name": "Total Carbohydrate", "value": 45, "daily_pct": 15 },
            { "nutrient_name": "Fat", "value": 3 },
            { "nutrient_name": "Total Fat", "value": 12 },
            { "nutrient_name": "Protein", "value": "20.5" }
        ]);
        let profile = normalize(&raw, Some(55.0));
        assert_eq!(profile.total_carbs, 45.0);
        assert_eq!(profile.fat, 12.0);
        assert_eq!(profile.protein, 20.5);
        assert_eq!(profile.glycemic_index, 55.0);
        assert_eq!(profile.soluble_fiber, 1.0);
        assert_eq!(profile.insoluble_fiber, 2.0);
    }

    #[test]
    fn test_tagged_fiber_remainder() {
        let raw = json!([
            { "nutrient_name": "Fiber", "value": 7 },
            { "nutrient_name": "Soluble Fiber", "value": 2 }
        ]);
        let profile = normalize(&raw, None);
        assert_eq!(profile.soluble_fiber, 2.0);
        assert_eq!(profile.insoluble_fiber, 5.0);
    }

    #[test]
    fn test_tagged_fiber_remainder_negative_falls_back() {
        let raw = json!([
            { "nutrient_name": "Fiber", "value": 1 },
            { "nutrient_name": "Soluble Fiber", "value": 3 }
        ]);
        let profile = normalize(&raw, None);
        assert_eq!(profile.soluble_fiber, 3.0);
        assert_eq!(profile.insoluble_fiber, DEFAULT_INSOLUBLE_FIBER_G);
    }

    #[test]
    fn test_tagged_combined_fiber_only() {
        let raw = json!([{ "nutrient_name": "Fiber", "value": 10 }]);
        let profile = normalize(&raw, None);
        assert!(approx(profile.soluble_fiber, 3.3));
        assert!(approx(profile.insoluble_fiber, 6.7));
        assert_eq!(profile.glycemic_index, DEFAULT_GLYCEMIC_INDEX);
    }

    #[test]
    fn test_tagged_list_skips_malformed_entries() {
        let raw = json!([
            "Protein: 10g",
            { "value": 4 },
            { "nutrient_name": "Protein", "value": null },
            { "nutrient_name": "Protein", "value": 8 }
        ]);
        assert_eq!(normalize(&raw, None).protein, 8.0);
    }
}
