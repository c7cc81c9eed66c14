use serde::{Deserialize, Serialize};

use super::profile::{BehavioralModifiers, UserPhysiologicalProfile};
use crate::nutrient_normalizer::MealNutrientProfile;

/// Soluble fiber blunts the glycemic impact 1.5x more per gram than insoluble fiber.
const SOLUBLE_FIBER_WEIGHT: f64 = 1.5;
const COOKING_GI_PENALTY: f64 = 1.2;
const GI_RAISING_COOKING_METHODS: &[&str] = &["fried", "gelatinized"];

const PROTEIN_CONVERSION_RATE: f64 = 0.5;
const HIGH_PROTEIN_CONVERSION_RATE: f64 = 0.6;
const HIGH_PROTEIN_THRESHOLD_G: f64 = 30.0;
const FAT_CONVERSION_RATE: f64 = 0.1;

const IMMEDIATE_EXERCISE_MODIFIER: f64 = -0.30;
const DELAYED_EXERCISE_MODIFIER: f64 = -0.20;

/// Predicted glucose (mg/dL) at fasting, +1h, +2h, +3h and +4h after one meal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlucoseTrajectory([f64; 5]);

impl GlucoseTrajectory {
    pub fn readings(&self) -> &[f64; 5] {
        &self.0
    }

    pub fn fasting(&self) -> f64 {
        self.0[0]
    }

    /// The +4h value, which becomes the next meal's fasting level.
    pub fn four_hours(&self) -> f64 {
        self.0[4]
    }

    /// The +1h..+4h readings, i.e. everything after the starting level.
    pub fn post_meal(&self) -> &[f64] {
        &self.0[1..]
    }
}

/// Additive risk coefficients for the early rise, the delayed rise and the long-term load.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskCoefficients {
    pub short_term: f64,
    pub delayed: f64,
    pub long_term: f64,
}

impl RiskCoefficients {
    /// Every condition contributes independently; effects stack.
    pub fn from_profile(user: &UserPhysiologicalProfile, behavior: &BehavioralModifiers) -> Self {
        let mut k = RiskCoefficients::default();

        if user.age > 60 {
            k.short_term += 0.10;
            k.long_term += 0.05;
        }
        if user.bmi >= 30.0 {
            k.short_term += 0.15;
            k.delayed += 0.10;
            k.long_term += 0.10;
        }
        if user.has_type2_diabetes {
            k.short_term += 0.20;
            k.delayed += 0.15;
            k.long_term += 0.15;
        }
        if user.is_pregnant {
            k.short_term += 0.25;
            k.delayed += 0.20;
            k.long_term += 0.20;
        }
        // Not capped: a large dose can push the short-term coefficient below zero.
        if user.insulin_units > 0.0 {
            k.short_term -= 0.10 * user.insulin_units;
        }
        if user.takes_metformin {
            k.short_term -= 0.05;
            k.delayed -= 0.05;
        }

        if behavior.poor_sleep {
            k.short_term += 0.10;
            k.delayed += 0.05;
        }
        if behavior.is_stressed {
            k.short_term += 0.20;
            k.delayed += 0.10;
        }
        k
    }
}

/// Additive offsets applied to the 0-2h and 2-4h deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActivityModifiers {
    pub immediate: f64,
    pub delayed: f64,
}

impl ActivityModifiers {
    pub fn from_behavior(behavior: &BehavioralModifiers) -> Self {
        if behavior.post_meal_exercise {
            ActivityModifiers {
                immediate: IMMEDIATE_EXERCISE_MODIFIER,
                delayed: DELAYED_EXERCISE_MODIFIER,
            }
        } else {
            ActivityModifiers::default()
        }
    }
}

pub fn effective_carbs(meal: &MealNutrientProfile) -> f64 {
    let fiber_offset = meal.soluble_fiber * SOLUBLE_FIBER_WEIGHT + meal.insoluble_fiber;
    (meal.total_carbs - fiber_offset).max(0.0)
}

pub fn raises_glycemic_index(cooking_method: Option<&str>) -> bool {
    cooking_method
        .map(|method| method.trim().to_lowercase())
        .is_some_and(|method| GI_RAISING_COOKING_METHODS.contains(&method.as_str()))
}

pub fn adjusted_glycemic_index(meal: &MealNutrientProfile) -> f64 {
    if raises_glycemic_index(meal.cooking_method.as_deref()) {
        meal.glycemic_index * COOKING_GI_PENALTY
    } else {
        meal.glycemic_index
    }
}

/// Fractional dampener on the early rise, 5% per 10 g of fat.
pub fn fat_slowdown_factor(fat: f64) -> f64 {
    (fat / 10.0) * 0.05
}

pub fn protein_conversion_rate(protein: f64) -> f64 {
    if protein > HIGH_PROTEIN_THRESHOLD_G {
        HIGH_PROTEIN_CONVERSION_RATE
    } else {
        PROTEIN_CONVERSION_RATE
    }
}

// TODO: give long-term high-fat diets their own rate once one has been agreed on.
pub fn fat_conversion_rate(_long_term_high_fat_diet: bool) -> f64 {
    FAT_CONVERSION_RATE
}

/// Simulates the glucose response to a single meal.
///
/// Deterministic and allocation-free. No clamping is applied, so extreme inputs can
/// produce readings outside any physiological range.
///
/// # Arguments
/// * `meal`: the normalized meal.
/// * `user`: physiological profile; `fasting_glucose` is the starting level.
/// * `behavior`: exercise, sleep and stress around the meal.
///
/// # Returns
/// A `GlucoseTrajectory` of five readings starting at `user.fasting_glucose`.
pub fn simulate(
    meal: &MealNutrientProfile,
    user: &UserPhysiologicalProfile,
    behavior: &BehavioralModifiers,
) -> GlucoseTrajectory {
    let effective_carbs = effective_carbs(meal);
    let gi_fraction = adjusted_glycemic_index(meal) / 100.0;
    let fat_slowdown = fat_slowdown_factor(meal.fat);

    let protein_equiv_carbs = meal.protein * protein_conversion_rate(meal.protein);
    let fat_converted_sugar = meal.fat * fat_conversion_rate(user.long_term_high_fat_diet);

    let k = RiskCoefficients::from_profile(user, behavior);
    let activity = ActivityModifiers::from_behavior(behavior);

    let delta_0_2h = (effective_carbs * gi_fraction * (1.0 - fat_slowdown) + activity.immediate)
        * 0.5
        * (1.0 + k.short_term);
    let delta_2_4h = (protein_equiv_carbs + fat_converted_sugar)
        * 0.3
        * (1.0 + k.delayed + activity.delayed);
    let total_glycemic_load = effective_carbs * gi_fraction;
    let delta_long_term = total_glycemic_load * 0.01 * (1.0 + k.long_term);

    let fasting = user.fasting_glucose;
    GlucoseTrajectory([
        fasting,
        fasting + delta_0_2h * 0.7,
        fasting + delta_0_2h + delta_2_4h * 0.3 + delta_long_term * 0.2,
        fasting + delta_0_2h * 0.3 + delta_2_4h * 0.8 + delta_long_term * 0.5,
        fasting + delta_0_2h * 0.1 + delta_2_4h * 0.4 + delta_long_term * 0.8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy_user() -> UserPhysiologicalProfile {
        UserPhysiologicalProfile {
            age: 35,
            bmi: 22.0,
            has_type2_diabetes: false,
            is_pregnant: false,
            insulin_units: 0.0,
            takes_metformin: false,
            fasting_glucose: 90.0,
            long_term_high_fat_diet: false,
        }
    }

    fn meal(carbs: f64, protein: f64, fat: f64) -> MealNutrientProfile {
        MealNutrientProfile {
            total_carbs: carbs,
            soluble_fiber: 1.0,
            insoluble_fiber: 2.0,
            protein,
            fat,
            glycemic_index: 50.0,
            cooking_method: None,
        }
    }

    #[test]
    fn test_effective_carbs_never_negative() {
        let fibrous = MealNutrientProfile {
            total_carbs: 4.0,
            soluble_fiber: 5.0,
            insoluble_fiber: 6.0,
            ..MealNutrientProfile::default()
        };
        assert_eq!(effective_carbs(&fibrous), 0.0);
        assert_eq!(effective_carbs(&meal(30.0, 0.0, 0.0)), 26.5);
    }

    #[test]
    fn test_cooking_method_penalty() {
        let mut fried = meal(30.0, 0.0, 0.0);
        fried.cooking_method = Some("Fried".to_string());
        assert!((adjusted_glycemic_index(&fried) - 60.0).abs() < 1e-9);

        let mut steamed = meal(30.0, 0.0, 0.0);
        steamed.cooking_method = Some("steamed".to_string());
        assert_eq!(adjusted_glycemic_index(&steamed), 50.0);
        assert!(raises_glycemic_index(Some("gelatinized")));
        assert!(!raises_glycemic_index(None));
    }

    #[test]
    fn test_protein_rate_threshold() {
        assert_eq!(protein_conversion_rate(30.0), 0.5);
        assert_eq!(protein_conversion_rate(30.5), 0.6);
    }

    #[test]
    fn test_fat_rate_ignores_unset_diet_flag() {
        assert_eq!(fat_conversion_rate(false), 0.1);
    }

    #[test]
    fn test_risk_coefficients_stack() {
        let user = UserPhysiologicalProfile {
            age: 65,
            bmi: 31.0,
            has_type2_diabetes: true,
            takes_metformin: true,
            ..healthy_user()
        };
        let behavior = BehavioralModifiers {
            poor_sleep: true,
            is_stressed: true,
            ..Default::default()
        };
        let k = RiskCoefficients::from_profile(&user, &behavior);
        assert!((k.short_term - (0.10 + 0.15 + 0.20 - 0.05 + 0.10 + 0.20)).abs() < 1e-9);
        assert!((k.delayed - (0.10 + 0.15 - 0.05 + 0.05 + 0.10)).abs() < 1e-9);
        assert!((k.long_term - (0.05 + 0.10 + 0.15)).abs() < 1e-9);
    }

    #[test]
    fn test_insulin_can_push_short_term_negative() {
        let user = UserPhysiologicalProfile {
            insulin_units: 12.0,
            ..healthy_user()
        };
        let k = RiskCoefficients::from_profile(&user, &BehavioralModifiers::default());
        assert!((k.short_term + 1.2).abs() < 1e-9);

        // (1 + k) < 0 flips the early rise into a dip
        let trajectory = simulate(&meal(60.0, 0.0, 0.0), &user, &BehavioralModifiers::default());
        assert!(trajectory.readings()[1] < 90.0);
    }

    #[test]
    fn test_exercise_offsets_early_rise() {
        let active = BehavioralModifiers {
            post_meal_exercise: true,
            ..Default::default()
        };
        let m = meal(30.0, 15.0, 10.0);
        let rested = simulate(&m, &healthy_user(), &BehavioralModifiers::default());
        let moved = simulate(&m, &healthy_user(), &active);
        // immediate offset: -0.30 * 0.5 * 0.7 at +1h
        assert!((rested.readings()[1] - moved.readings()[1] - 0.105).abs() < 1e-9);
        assert!(moved.readings()[3] < rested.readings()[3]);
    }

    #[test]
    fn test_empty_meal_stays_flat() {
        let empty = MealNutrientProfile {
            soluble_fiber: 0.0,
            insoluble_fiber: 0.0,
            ..MealNutrientProfile::default()
        };
        let trajectory = simulate(&empty, &healthy_user(), &BehavioralModifiers::default());
        assert_eq!(trajectory.readings(), &[90.0; 5]);
    }
}
