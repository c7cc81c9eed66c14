use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::nutrient_normalizer::MealNutrientProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
}

impl MealSlot {
    /// Slots in the order a day is chained.
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Snack,
        MealSlot::Dinner,
    ];

    pub fn default_glycemic_index(self) -> f64 {
        match self {
            MealSlot::Breakfast => 50.0,
            MealSlot::Lunch => 55.0,
            MealSlot::Snack => 40.0,
            MealSlot::Dinner => 45.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Snack => "snack",
            MealSlot::Dinner => "dinner",
        }
    }

    /// Stand-in meal used when nothing is known about what was eaten in this slot,
    /// so a day's simulation always has four complete meals.
    pub fn example_meal(self) -> MealNutrientProfile {
        let (total_carbs, soluble_fiber, insoluble_fiber, protein, fat) = match self {
            MealSlot::Breakfast => (45.0, 2.0, 3.0, 15.0, 10.0),
            MealSlot::Lunch => (60.0, 2.0, 4.0, 25.0, 15.0),
            MealSlot::Snack => (20.0, 1.0, 2.0, 5.0, 5.0),
            MealSlot::Dinner => (50.0, 2.0, 4.0, 30.0, 20.0),
        };
        MealNutrientProfile {
            total_carbs,
            soluble_fiber,
            insoluble_fiber,
            protein,
            fat,
            glycemic_index: self.default_glycemic_index(),
            cooking_method: None,
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MealSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "snack" | "snacks" => Ok(MealSlot::Snack),
            "dinner" => Ok(MealSlot::Dinner),
            other => Err(format!("Unknown meal slot: '{}'", other)),
        }
    }
}
