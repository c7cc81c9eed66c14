use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api_connection::NutritionSource;
use crate::glucose::{
    simulate_day, BehavioralModifiers, DailyGlucoseSeries, DayMeals, UserPhysiologicalProfile,
};
use crate::meal_aggregator::aggregate_slot;
use crate::meal_log::MealLog;
use crate::meal_slot::MealSlot;
use crate::nutrient_normalizer::{normalize, MealNutrientProfile};

/// Where a meal slot's nutrition comes from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MealSource {
    /// Raw log entries for the slot (either nutrition shape), aggregated together.
    Logged(Vec<Value>),
    /// A profile that has already been normalized.
    Profile(MealNutrientProfile),
    /// A recipe id to look up through the nutrition source.
    Recipe(String),
    #[default]
    Missing,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DayPlan {
    pub breakfast: MealSource,
    pub lunch: MealSource,
    pub snack: MealSource,
    pub dinner: MealSource,
}

impl DayPlan {
    pub fn get(&self, slot: MealSlot) -> &MealSource {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Snack => &self.snack,
            MealSlot::Dinner => &self.dinner,
        }
    }

    pub fn set(&mut self, slot: MealSlot, source: MealSource) {
        match slot {
            MealSlot::Breakfast => self.breakfast = source,
            MealSlot::Lunch => self.lunch = source,
            MealSlot::Snack => self.snack = source,
            MealSlot::Dinner => self.dinner = source,
        }
    }

    /// Slots with logged food use the log; the rest stay missing.
    pub fn from_meal_log(log: &MealLog) -> Self {
        let mut plan = DayPlan::default();
        for slot in MealSlot::ALL {
            if let Some(profile) = log.slot_profile(slot) {
                plan.set(slot, MealSource::Profile(profile));
            }
        }
        plan
    }
}

/// Turns day plans into glucose series, fetching recipe nutrition where needed.
pub struct DayPlanner<'a> {
    source: &'a dyn NutritionSource,
    bedtime_offset: f64,
}

impl<'a> DayPlanner<'a> {
    pub fn new(source: &'a dyn NutritionSource, bedtime_offset: f64) -> Self {
        DayPlanner {
            source,
            bedtime_offset,
        }
    }

    async fn resolve_slot(&self, slot: MealSlot, meal_source: &MealSource) -> MealNutrientProfile {
        let default_gi = Some(slot.default_glycemic_index());
        let resolved = match meal_source {
            MealSource::Profile(profile) => Some(profile.clone()),
            MealSource::Logged(entries) => aggregate_slot(entries, default_gi),
            MealSource::Recipe(recipe_id) => match self.source.fetch_nutrition(recipe_id).await {
                Ok(nutrition) => {
                    debug!("Fetched nutrition for {} recipe '{}'", slot, recipe_id);
                    Some(normalize(&nutrition, default_gi))
                }
                Err(e) => {
                    warn!(
                        "Nutrition lookup for {} recipe '{}' failed, using example meal: {}",
                        slot, recipe_id, e
                    );
                    None
                }
            },
            MealSource::Missing => None,
        };

        resolved.unwrap_or_else(|| {
            debug!("No meal data for {}, using example meal", slot);
            slot.example_meal()
        })
    }

    /// Resolves every slot. A slot whose data cannot be obtained falls back to its example
    /// meal; it never stops the other slots from resolving.
    pub async fn resolve_meals(&self, plan: &DayPlan) -> DayMeals {
        DayMeals {
            breakfast: self.resolve_slot(MealSlot::Breakfast, &plan.breakfast).await,
            lunch: self.resolve_slot(MealSlot::Lunch, &plan.lunch).await,
            snack: self.resolve_slot(MealSlot::Snack, &plan.snack).await,
            dinner: self.resolve_slot(MealSlot::Dinner, &plan.dinner).await,
        }
    }

    pub async fn simulate(
        &self,
        plan: &DayPlan,
        user: &UserPhysiologicalProfile,
        behavior: &BehavioralModifiers,
    ) -> DailyGlucoseSeries {
        let meals = self.resolve_meals(plan).await;
        let series = simulate_day(&meals, user, behavior).with_bedtime(self.bedtime_offset);
        info!(
            peak = series.peak().unwrap_or(user.fasting_glucose),
            "Simulated day starting at {:.1} mg/dL",
            user.fasting_glucose
        );
        series
    }

    /// Simulates two days side by side, e.g. a past diet against the current plan.
    pub async fn compare(
        &self,
        past: &DayPlan,
        current: &DayPlan,
        user: &UserPhysiologicalProfile,
        behavior: &BehavioralModifiers,
    ) -> DayComparison {
        let (past, current) = tokio::join!(
            self.simulate(past, user, behavior),
            self.simulate(current, user, behavior)
        );
        DayComparison { past, current }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayComparison {
    pub past: DailyGlucoseSeries,
    pub current: DailyGlucoseSeries,
}

impl DayComparison {
    /// Current minus past, reading by reading.
    pub fn differences(&self) -> Vec<f64> {
        self.current
            .all_readings()
            .iter()
            .zip(self.past.all_readings())
            .map(|(current, past)| current - past)
            .collect()
    }
}
