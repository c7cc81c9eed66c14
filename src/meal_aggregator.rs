use serde_json::Value;

use crate::nutrient_normalizer::{normalize, MealNutrientProfile};

/// Running state while folding several log entries into one meal-slot profile.
#[derive(Debug, Clone, PartialEq)]
struct SlotAccumulator {
    profile: MealNutrientProfile,
    // Carbs (g) backing the current weighted GI.
    gi_weight: f64,
    entries: usize,
    cooking_method: CookingAgreement,
}

#[derive(Debug, Clone, PartialEq)]
enum CookingAgreement {
    Unset,
    Same(Option<String>),
    Mixed,
}

impl SlotAccumulator {
    fn empty() -> Self {
        SlotAccumulator {
            profile: MealNutrientProfile {
                total_carbs: 0.0,
                soluble_fiber: 0.0,
                insoluble_fiber: 0.0,
                protein: 0.0,
                fat: 0.0,
                glycemic_index: 0.0,
                cooking_method: None,
            },
            gi_weight: 0.0,
            entries: 0,
            cooking_method: CookingAgreement::Unset,
        }
    }

    fn absorb(self, entry: MealNutrientProfile) -> Self {
        let (glycemic_index, gi_weight) = if entry.total_carbs > 0.0 {
            let weight = self.gi_weight + entry.total_carbs;
            let gi = (self.profile.glycemic_index * self.gi_weight
                + entry.glycemic_index * entry.total_carbs)
                / weight;
            (gi, weight)
        } else if self.entries == 0 {
            (entry.glycemic_index, self.gi_weight)
        } else {
            (self.profile.glycemic_index, self.gi_weight)
        };

        let cooking_method = match self.cooking_method {
            CookingAgreement::Unset => CookingAgreement::Same(entry.cooking_method.clone()),
            CookingAgreement::Same(method) if method == entry.cooking_method => {
                CookingAgreement::Same(method)
            }
            _ => CookingAgreement::Mixed,
        };

        SlotAccumulator {
            profile: MealNutrientProfile {
                total_carbs: self.profile.total_carbs + entry.total_carbs,
                soluble_fiber: self.profile.soluble_fiber + entry.soluble_fiber,
                insoluble_fiber: self.profile.insoluble_fiber + entry.insoluble_fiber,
                protein: self.profile.protein + entry.protein,
                fat: self.profile.fat + entry.fat,
                glycemic_index,
                cooking_method: None,
            },
            gi_weight,
            entries: self.entries + 1,
            cooking_method,
        }
    }

    fn finish(self) -> Option<MealNutrientProfile> {
        if self.entries == 0 {
            return None;
        }
        let cooking_method = match self.cooking_method {
            CookingAgreement::Same(method) => method,
            _ => None,
        };
        Some(MealNutrientProfile {
            cooking_method,
            ..self.profile
        })
    }
}

/// Folds already-normalized entries of one meal slot into a single profile.
///
/// Masses add up linearly. The slot's GI is a running average weighted by each entry's
/// carbs, so carb-heavy items dominate; an entry without carbs only sets the GI when it
/// is the first one. Returns `None` when there are no entries.
pub fn combine_profiles<I>(entries: I) -> Option<MealNutrientProfile>
where
    I: IntoIterator<Item = MealNutrientProfile>,
{
    entries
        .into_iter()
        .fold(SlotAccumulator::empty(), SlotAccumulator::absorb)
        .finish()
}

/// Normalizes each raw log entry with the slot's default GI, then combines them.
pub fn aggregate_slot(
    entries: &[Value],
    meal_type_default_gi: Option<f64>,
) -> Option<MealNutrientProfile> {
    combine_profiles(entries.iter().map(|raw| normalize(raw, meal_type_default_gi)))
}
