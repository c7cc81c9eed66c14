use serde::{Deserialize, Serialize};

use super::engine::{simulate, GlucoseTrajectory};
use super::profile::{BehavioralModifiers, UserPhysiologicalProfile};
use crate::meal_slot::MealSlot;
use crate::nutrient_normalizer::MealNutrientProfile;

pub const DEFAULT_BASE_FASTING_GLUCOSE: f64 = 90.0;
pub const DEFAULT_BEDTIME_OFFSET: f64 = 5.0;

// Presentation hints for whatever renders the series; the simulation never clamps.
pub const DISPLAY_MIN_MG_DL: f64 = 70.0;
pub const DISPLAY_MAX_MG_DL: f64 = 200.0;
pub const ELEVATED_THRESHOLD_MG_DL: f64 = 100.0;
pub const HIGH_THRESHOLD_MG_DL: f64 = 140.0;

pub fn clamp_for_display(reading: f64) -> f64 {
    reading.clamp(DISPLAY_MIN_MG_DL, DISPLAY_MAX_MG_DL)
}

/// The four meals of one day, one normalized profile per slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayMeals {
    pub breakfast: MealNutrientProfile,
    pub lunch: MealNutrientProfile,
    pub snack: MealNutrientProfile,
    pub dinner: MealNutrientProfile,
}

impl DayMeals {
    pub fn get(&self, slot: MealSlot) -> &MealNutrientProfile {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Snack => &self.snack,
            MealSlot::Dinner => &self.dinner,
        }
    }

    /// Builds a day by asking for each slot's meal in chaining order.
    pub fn from_fn(mut meal_for: impl FnMut(MealSlot) -> MealNutrientProfile) -> Self {
        DayMeals {
            breakfast: meal_for(MealSlot::Breakfast),
            lunch: meal_for(MealSlot::Lunch),
            snack: meal_for(MealSlot::Snack),
            dinner: meal_for(MealSlot::Dinner),
        }
    }

    pub fn examples() -> Self {
        DayMeals::from_fn(MealSlot::example_meal)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MealSlot, &MealNutrientProfile)> {
        MealSlot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MealTrajectory {
    pub slot: MealSlot,
    pub trajectory: GlucoseTrajectory,
}

/// A day's glucose curve: the first meal's five readings followed by the +1h..+4h
/// readings of every later meal, plus an optional bedtime estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGlucoseSeries {
    pub meals: Vec<MealTrajectory>,
    pub readings: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedtime: Option<f64>,
}

impl DailyGlucoseSeries {
    /// Chains trajectories in the given order, dropping each later meal's starting
    /// reading since it repeats the previous meal's +4h value.
    pub fn from_trajectories(meals: Vec<MealTrajectory>) -> Self {
        let readings = meals
            .iter()
            .enumerate()
            .flat_map(|(i, meal)| {
                let readings = meal.trajectory.readings();
                if i == 0 {
                    &readings[..]
                } else {
                    meal.trajectory.post_meal()
                }
            })
            .copied()
            .collect();
        DailyGlucoseSeries {
            meals,
            readings,
            bedtime: None,
        }
    }

    /// Appends the bedtime estimate: the day's first fasting reading plus `offset`.
    pub fn with_bedtime(mut self, offset: f64) -> Self {
        self.bedtime = self.meals.first().map(|m| m.trajectory.fasting() + offset);
        self
    }

    pub fn trajectory(&self, slot: MealSlot) -> Option<&GlucoseTrajectory> {
        self.meals
            .iter()
            .find(|m| m.slot == slot)
            .map(|m| &m.trajectory)
    }

    /// Chained readings followed by the bedtime estimate when present.
    pub fn all_readings(&self) -> Vec<f64> {
        self.readings.iter().copied().chain(self.bedtime).collect()
    }

    /// Time-slot names matching [`all_readings`](Self::all_readings) one to one.
    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::with_capacity(self.readings.len() + 1);
        for (i, meal) in self.meals.iter().enumerate() {
            if i == 0 {
                labels.push("Fasting".to_string());
            }
            for hour in 1..=4 {
                labels.push(format!("{}h after {}", hour, meal.slot));
            }
        }
        if self.bedtime.is_some() {
            labels.push("Bedtime".to_string());
        }
        labels
    }

    pub fn peak(&self) -> Option<f64> {
        self.readings.iter().copied().reduce(f64::max)
    }
}

/// Simulates a whole day.
///
/// Breakfast starts from `user.fasting_glucose`; each later meal starts from the previous
/// meal's +4h reading. The caller's profile is left untouched.
pub fn simulate_day(
    meals: &DayMeals,
    user: &UserPhysiologicalProfile,
    behavior: &BehavioralModifiers,
) -> DailyGlucoseSeries {
    let trajectories = meals
        .iter()
        .scan(user.fasting_glucose, |fasting, (slot, meal)| {
            let trajectory = simulate(meal, &user.with_fasting_glucose(*fasting), behavior);
            *fasting = trajectory.four_hours();
            Some(MealTrajectory { slot, trajectory })
        })
        .collect();
    DailyGlucoseSeries::from_trajectories(trajectories)
}
