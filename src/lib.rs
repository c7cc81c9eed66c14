pub mod api_connection;
pub mod cli;
pub mod config;
pub mod glucose;
pub mod logging;
pub mod meal_aggregator;
pub mod meal_log;
pub mod meal_slot;
pub mod nutrient_normalizer;
pub mod planner;
