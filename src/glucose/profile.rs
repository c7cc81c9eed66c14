use serde::{Deserialize, Serialize};

/// Physiological characteristics of the person whose glucose response is simulated.
///
/// `fasting_glucose` is the starting level (mg/dL) for one meal. When a day is chained it
/// is overwritten per meal on a copy of the profile, never on the caller's value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPhysiologicalProfile {
    pub age: u32,
    pub bmi: f64,
    #[serde(default)]
    pub has_type2_diabetes: bool,
    #[serde(default)]
    pub is_pregnant: bool,
    /// 0 means not on insulin.
    #[serde(default)]
    pub insulin_units: f64,
    #[serde(default)]
    pub takes_metformin: bool,
    pub fasting_glucose: f64,
    /// Long-term high-fat diet. Accepted and carried, but nothing sets it yet and the
    /// fat conversion rate does not depend on it.
    #[serde(default)]
    pub long_term_high_fat_diet: bool,
}

impl UserPhysiologicalProfile {
    /// Same person, different starting glucose.
    pub fn with_fasting_glucose(self, fasting_glucose: f64) -> Self {
        UserPhysiologicalProfile {
            fasting_glucose,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BehavioralModifiers {
    pub post_meal_exercise: bool,
    pub poor_sleep: bool,
    pub is_stressed: bool,
}
