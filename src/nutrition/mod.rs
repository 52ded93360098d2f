//! Nutrition calculation module
//!
//! Pure calculation core: daily aggregation, goal progress, and energy
//! balance estimation. No I/O and no shared state; every function is safe
//! to call concurrently.

pub mod aggregate;
pub mod energy;
pub mod progress;

pub use aggregate::{daily_breakdown, sum_entries, DailyBreakdown, DayTotals, ResolvedEntry};
pub use energy::{
    estimate_energy, weekly_weight_change_lbs, ActivityLevel, BmrFormula, EnergyEstimate,
    EnergyInput, EnergyInputError, GoalAdjustment, Sex,
};
pub use progress::{
    evaluate_nutrient, evaluate_progress, GoalProgress, GoalSet, NutrientProgress,
    ProgressStatus, ProgressThresholds,
};
