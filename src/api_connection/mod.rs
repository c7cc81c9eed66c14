pub mod connection;
pub mod endpoints;

pub use connection::{NutritionSource, RecipeClient, RecipeSourceError};
