use clap::Parser;
use std::path::PathBuf;

use crate::glucose::{BehavioralModifiers, UserPhysiologicalProfile};
use crate::meal_slot::MealSlot;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Simulates a day of blood glucose from meal nutrition",
    long_about = None
)]
pub struct Cli {
    /// CSV food log for the day to simulate
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// CSV food log of an earlier day to compare against
    #[arg(long)]
    pub compare_log: Option<PathBuf>,

    /// Recipe id to look up for breakfast when the log has no breakfast entries
    #[arg(long)]
    pub breakfast_recipe: Option<String>,
    #[arg(long)]
    pub lunch_recipe: Option<String>,
    #[arg(long)]
    pub snack_recipe: Option<String>,
    #[arg(long)]
    pub dinner_recipe: Option<String>,

    /// JSON file holding the user's physiological profile (replaces the profile flags)
    #[arg(long)]
    pub profile: Option<PathBuf>,

    #[arg(long, default_value_t = 35)]
    pub age: u32,
    #[arg(long, default_value_t = 22.0)]
    pub bmi: f64,
    #[arg(long)]
    pub type2_diabetes: bool,
    #[arg(long)]
    pub pregnant: bool,
    /// Insulin units taken with meals (0 = not on insulin)
    #[arg(long, default_value_t = 0.0)]
    pub insulin_units: f64,
    #[arg(long)]
    pub metformin: bool,

    /// Fasting glucose before breakfast in mg/dL [default: GLUCOSE_BASE_FASTING or 90]
    #[arg(long)]
    pub fasting_glucose: Option<f64>,

    /// Exercise after every meal
    #[arg(long)]
    pub exercise: bool,
    #[arg(long)]
    pub poor_sleep: bool,
    #[arg(long)]
    pub stressed: bool,

    /// Print the result as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn recipe_for(&self, slot: MealSlot) -> Option<&str> {
        let recipe = match slot {
            MealSlot::Breakfast => &self.breakfast_recipe,
            MealSlot::Lunch => &self.lunch_recipe,
            MealSlot::Snack => &self.snack_recipe,
            MealSlot::Dinner => &self.dinner_recipe,
        };
        recipe.as_deref()
    }

    pub fn user_profile(&self, base_fasting_glucose: f64) -> UserPhysiologicalProfile {
        UserPhysiologicalProfile {
            age: self.age,
            bmi: self.bmi,
            has_type2_diabetes: self.type2_diabetes,
            is_pregnant: self.pregnant,
            insulin_units: self.insulin_units,
            takes_metformin: self.metformin,
            fasting_glucose: self.fasting_glucose.unwrap_or(base_fasting_glucose),
            long_term_high_fat_diet: false,
        }
    }

    pub fn behavior(&self) -> BehavioralModifiers {
        BehavioralModifiers {
            post_meal_exercise: self.exercise,
            poor_sleep: self.poor_sleep,
            is_stressed: self.stressed,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_profile_and_behavior() {
        let cli = Cli::parse_from([
            "glucose-sim",
            "--type2-diabetes",
            "--insulin-units",
            "2",
            "--stressed",
            "--lunch-recipe",
            "716429",
        ]);
        let user = cli.user_profile(92.0);
        assert!(user.has_type2_diabetes);
        assert_eq!(user.insulin_units, 2.0);
        assert_eq!(user.fasting_glucose, 92.0);
        assert!(cli.behavior().is_stressed);
        assert!(!cli.behavior().post_meal_exercise);
        assert_eq!(cli.recipe_for(MealSlot::Lunch), Some("716429"));
        assert_eq!(cli.recipe_for(MealSlot::Dinner), None);
    }

    #[test]
    fn test_fasting_flag_overrides_config() {
        let cli = Cli::parse_from(["glucose-sim", "--fasting-glucose", "101.5"]);
        assert_eq!(cli.user_profile(90.0).fasting_glucose, 101.5);
    }
}
