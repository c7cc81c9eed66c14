use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::meal_aggregator::combine_profiles;
use crate::meal_slot::MealSlot;
use crate::nutrient_normalizer::{normalize_direct, DirectNutrition, MealNutrientProfile};

// Expected header:
// slot,name,carbs,fiber,soluble_fiber,insoluble_fiber,protein,fat,gi,cooking_method
#[derive(Debug, Deserialize)]
struct LogRow {
    slot: String,
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    carbs: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fiber: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    soluble_fiber: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    insoluble_fiber: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    protein: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fat: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    gi: Option<f64>,
    #[serde(default)]
    cooking_method: Option<String>,
}

impl LogRow {
    fn into_entry(self) -> LogEntry {
        LogEntry {
            name: self.name.trim().to_string(),
            nutrition: DirectNutrition {
                carbs: self.carbs,
                fiber: self.fiber,
                soluble_fiber: self.soluble_fiber,
                insoluble_fiber: self.insoluble_fiber,
                protein: self.protein,
                fat: self.fat,
                glycemic_index: self.gi,
                cooking_method: self
                    .cooking_method
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub name: String,
    pub nutrition: DirectNutrition,
}

/// A day's manually logged food, grouped by meal slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealLog {
    entries: BTreeMap<MealSlot, Vec<LogEntry>>,
}

impl MealLog {
    pub fn push(&mut self, slot: MealSlot, entry: LogEntry) {
        self.entries.entry(slot).or_default().push(entry);
    }

    pub fn entries(&self, slot: MealSlot) -> &[LogEntry] {
        self.entries.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }

    /// Combined profile for one slot, or `None` when nothing was logged for it.
    pub fn slot_profile(&self, slot: MealSlot) -> Option<MealNutrientProfile> {
        let default_gi = Some(slot.default_glycemic_index());
        combine_profiles(
            self.entries(slot)
                .iter()
                .map(|entry| normalize_direct(&entry.nutrition, default_gi)),
        )
    }
}

pub fn load_meal_log(csv_path: &Path) -> Result<MealLog> {
    if !csv_path.exists() {
        return Err(anyhow::anyhow!("Meal log file not found at: {:?}", csv_path));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open meal log at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let mut log = MealLog::default();
    for (row_index, result) in rdr.deserialize::<LogRow>().enumerate() {
        let row =
            result.with_context(|| format!("Failed to read meal log row {}", row_index + 1))?;
        match row.slot.parse::<MealSlot>() {
            Ok(slot) => {
                let entry = row.into_entry();
                debug!("Logged {} item '{}'", slot, entry.name);
                log.push(slot, entry);
            }
            Err(e) => {
                warn!("Skipping meal log row {}: {}", row_index + 1, e);
            }
        }
    }

    if log.is_empty() {
        return Err(anyhow::anyhow!("No usable meal log entries in {:?}", csv_path));
    }
    Ok(log)
}
