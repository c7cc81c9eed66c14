pub mod day;
pub mod engine;
pub mod profile;

pub use day::{simulate_day, DailyGlucoseSeries, DayMeals, MealTrajectory};
pub use engine::{simulate, GlucoseTrajectory};
pub use profile::{BehavioralModifiers, UserPhysiologicalProfile};
