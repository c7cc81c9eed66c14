use async_trait::async_trait;
use glucose_sim::api_connection::{NutritionSource, RecipeClient, RecipeSourceError};
use glucose_sim::config::RecipeApiConfig;
use glucose_sim::glucose::{
    simulate_day, BehavioralModifiers, DayMeals, UserPhysiologicalProfile,
};
use glucose_sim::meal_slot::MealSlot;
use glucose_sim::planner::{DayPlan, DayPlanner, MealSource};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// In-memory recipe store; unknown ids answer with a server error.
struct FakeRecipeStore {
    recipes: HashMap<String, Value>,
}

#[async_trait]
impl NutritionSource for FakeRecipeStore {
    async fn fetch_nutrition(&self, recipe_id: &str) -> Result<Value, RecipeSourceError> {
        self.recipes
            .get(recipe_id)
            .cloned()
            .ok_or_else(|| RecipeSourceError::Api {
                status: StatusCode::BAD_GATEWAY,
                body: format!("upstream lost recipe {}", recipe_id),
            })
    }
}

fn store() -> FakeRecipeStore {
    let mut recipes = HashMap::new();
    recipes.insert(
        "pancakes".to_string(),
        json!([
            { "nutrient_name": "Total Carbohydrate", "value": 70, "daily_pct": 25 },
            { "nutrient_name": "Protein", "value": 12, "daily_pct": 24 },
            { "nutrient_name": "Total Fat", "value": 14, "daily_pct": 18 },
            { "nutrient_name": "Fiber", "value": 3, "daily_pct": 11 }
        ]),
    );
    recipes.insert(
        "salad".to_string(),
        json!({ "carbs": 15, "fiber": 8, "protein": 20, "fat": 18, "GI": 30 }),
    );
    FakeRecipeStore { recipes }
}

fn user() -> UserPhysiologicalProfile {
    UserPhysiologicalProfile {
        age: 52,
        bmi: 29.0,
        has_type2_diabetes: true,
        is_pregnant: false,
        insulin_units: 0.0,
        takes_metformin: true,
        fasting_glucose: 110.0,
        long_term_high_fat_diet: false,
    }
}

#[tokio::test]
async fn test_resolve_meals_from_mixed_sources() {
    let store = store();
    let planner = DayPlanner::new(&store, 5.0);
    let plan = DayPlan {
        breakfast: MealSource::Recipe("pancakes".to_string()),
        lunch: MealSource::Recipe("salad".to_string()),
        snack: MealSource::Logged(vec![
            json!({ "carbs": 10, "GI": 80 }),
            json!({ "carbs": 30, "GI": 40 }),
        ]),
        dinner: MealSource::Missing,
    };

    let meals = planner.resolve_meals(&plan).await;
    assert_eq!(meals.breakfast.total_carbs, 70.0);
    assert_eq!(
        meals.breakfast.glycemic_index,
        MealSlot::Breakfast.default_glycemic_index()
    );
    assert_eq!(meals.lunch.glycemic_index, 30.0);
    assert_eq!(meals.snack.glycemic_index, 50.0);
    assert_eq!(meals.dinner, MealSlot::Dinner.example_meal());
}

#[tokio::test]
async fn test_failed_lookup_only_affects_its_slot() {
    let store = store();
    let planner = DayPlanner::new(&store, 5.0);
    let plan = DayPlan {
        breakfast: MealSource::Recipe("pancakes".to_string()),
        lunch: MealSource::Recipe("vanished-recipe".to_string()),
        snack: MealSource::Missing,
        dinner: MealSource::Recipe("salad".to_string()),
    };

    let meals = planner.resolve_meals(&plan).await;
    assert_eq!(meals.lunch, MealSlot::Lunch.example_meal());
    assert_eq!(meals.dinner.total_carbs, 15.0);

    let series = planner
        .simulate(&plan, &user(), &BehavioralModifiers::default())
        .await;
    assert_eq!(series.readings.len(), 17);
    assert_eq!(series.all_readings().len(), 18);
    assert_eq!(series.bedtime, Some(115.0));
    assert!(series.all_readings().iter().all(|r| r.is_finite()));

    let direct = simulate_day(&meals, &user(), &BehavioralModifiers::default());
    assert_eq!(series.readings, direct.readings);
}

#[tokio::test]
async fn test_compare_days() {
    let store = store();
    let planner = DayPlanner::new(&store, 5.0);
    let past = DayPlan::default();
    let current = DayPlan {
        lunch: MealSource::Recipe("salad".to_string()),
        ..DayPlan::default()
    };

    let comparison = planner
        .compare(&past, &current, &user(), &BehavioralModifiers::default())
        .await;
    let expected_past =
        simulate_day(&DayMeals::examples(), &user(), &BehavioralModifiers::default());
    assert_eq!(comparison.past.readings, expected_past.readings);

    let differences = comparison.differences();
    assert_eq!(differences.len(), 18);
    // breakfast is identical in both days
    assert!(differences[..5].iter().all(|d| *d == 0.0));
    // a low-GI salad instead of the example lunch lowers the post-lunch peak
    assert!(differences[6] < 0.0);
}

#[tokio::test]
async fn test_unreachable_recipe_service_falls_back() {
    let config = RecipeApiConfig {
        // nothing listens on the discard port locally
        base_url: "http://127.0.0.1:9/api".to_string(),
        api_key_env_var: "GLUCOSE_SIM_TEST_NO_SUCH_KEY_ABXYZ".to_string(),
        max_retries: 2,
        retry_delay: Duration::from_millis(20),
        timeout: Duration::from_secs(2),
    };
    let client = RecipeClient::new(&config).unwrap();

    let started = Instant::now();
    let err = client.fetch_recipe_nutrition("pancakes").await.unwrap_err();
    assert!(matches!(err, RecipeSourceError::Network(_)), "{:?}", err);
    assert!(err.is_retryable());
    // two retries means at least two delays were waited out
    assert!(started.elapsed() >= Duration::from_millis(40));

    let planner = DayPlanner::new(&client, 5.0);
    let plan = DayPlan {
        breakfast: MealSource::Recipe("pancakes".to_string()),
        ..DayPlan::default()
    };
    let meals = planner.resolve_meals(&plan).await;
    assert_eq!(meals, DayMeals::examples());
}
