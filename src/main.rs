use anyhow::{Context, Result};
use glucose_sim::api_connection::RecipeClient;
use glucose_sim::cli::{parse_args, Cli};
use glucose_sim::config::SimulatorConfig;
use glucose_sim::glucose::day::{
    clamp_for_display, ELEVATED_THRESHOLD_MG_DL, HIGH_THRESHOLD_MG_DL,
};
use glucose_sim::glucose::{DailyGlucoseSeries, UserPhysiologicalProfile};
use glucose_sim::logging;
use glucose_sim::meal_log::load_meal_log;
use glucose_sim::meal_slot::MealSlot;
use glucose_sim::planner::{DayComparison, DayPlan, DayPlanner, MealSource};
use std::path::Path;
use tokio::fs;
use tracing::info;

async fn load_profile(path: &Path) -> Result<UserPhysiologicalProfile> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read profile file '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse profile file '{}'", path.display()))
}

/// Logged food wins for a slot; otherwise the slot's recipe id is looked up.
fn build_plan(log_path: Option<&Path>, cli: &Cli) -> Result<DayPlan> {
    let mut plan = match log_path {
        Some(path) => DayPlan::from_meal_log(&load_meal_log(path)?),
        None => DayPlan::default(),
    };
    for slot in MealSlot::ALL {
        let missing = matches!(plan.get(slot), MealSource::Missing);
        if let (true, Some(recipe_id)) = (missing, cli.recipe_for(slot)) {
            plan.set(slot, MealSource::Recipe(recipe_id.to_string()));
        }
    }
    Ok(plan)
}

fn reading_flag(reading: f64) -> &'static str {
    if clamp_for_display(reading) != reading {
        "off chart"
    } else if reading >= HIGH_THRESHOLD_MG_DL {
        "high"
    } else if reading >= ELEVATED_THRESHOLD_MG_DL {
        "elevated"
    } else {
        ""
    }
}

fn print_series(series: &DailyGlucoseSeries) {
    println!("{:<22} {:>8}", "Time", "mg/dL");
    for (label, reading) in series.labels().iter().zip(series.all_readings()) {
        println!("{:<22} {:>8.1} {}", label, reading, reading_flag(reading));
    }
}

fn print_comparison(comparison: &DayComparison) {
    println!("{:<22} {:>8} {:>8} {:>8}", "Time", "Past", "Current", "Change");
    let rows = comparison
        .current
        .labels()
        .into_iter()
        .zip(comparison.past.all_readings())
        .zip(comparison.current.all_readings())
        .zip(comparison.differences());
    for (((label, past), current), change) in rows {
        println!(
            "{:<22} {:>8.1} {:>8.1} {:>+8.1} {}",
            label,
            past,
            current,
            change,
            reading_flag(current)
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_args();
    logging::init(cli.verbose);

    let config = SimulatorConfig::from_env().context("Failed to load simulator configuration")?;

    let user = match &cli.profile {
        Some(path) => {
            let profile = load_profile(path).await?;
            match cli.fasting_glucose {
                Some(fasting) => profile.with_fasting_glucose(fasting),
                None => profile,
            }
        }
        None => cli.user_profile(config.base_fasting_glucose),
    };
    let behavior = cli.behavior();

    let client = RecipeClient::new(&config.recipe_api)
        .context("Failed to initialize recipe nutrition client")?;
    info!("Recipe nutrition service: {}", client.base_url());
    let planner = DayPlanner::new(&client, config.bedtime_offset);

    let current_plan = build_plan(cli.log.as_deref(), &cli)?;

    match &cli.compare_log {
        Some(past_log) => {
            let past_plan = DayPlan::from_meal_log(&load_meal_log(past_log)?);
            let comparison = planner
                .compare(&past_plan, &current_plan, &user, &behavior)
                .await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                print_comparison(&comparison);
            }
        }
        None => {
            let series = planner.simulate(&current_plan, &user, &behavior).await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                print_series(&series);
            }
        }
    }

    Ok(())
}
