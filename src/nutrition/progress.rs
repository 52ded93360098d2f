//! Goal progress evaluation
//!
//! Compares a day's nutrition totals against a user's goals, producing a
//! clamped percentage for progress bars, the unclamped remaining amount,
//! and a tri-state status per nutrient.

use serde::{Deserialize, Serialize};

use crate::models::Nutrition;

/// A user's daily nutrition goals. `None` means the goal is not set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GoalSet {
    pub calories: Option<f64>,
    pub protein: Option<f64>,      // grams
    pub carbs: Option<f64>,        // grams
    pub fat: Option<f64>,          // grams
}

/// Tri-state progress status for one nutrient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// Below the on-target band
    Under,
    /// Within the on-target band (inclusive on both ends)
    OnTarget,
    /// Past the goal
    Over,
    /// No usable goal (unset, zero, or negative)
    NoGoal,
}

/// Status band boundaries, as raw percentages of goal.
///
/// The 80/100 split is a product decision, kept as named values rather
/// than magic numbers in the evaluator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProgressThresholds {
    /// Raw percentage at which intake counts as on-target
    pub on_target_min: f64,
    /// Raw percentage above which intake counts as over
    pub over_min: f64,
}

impl Default for ProgressThresholds {
    fn default() -> Self {
        Self {
            on_target_min: 80.0,
            over_min: 100.0,
        }
    }
}

/// Progress of one nutrient against its goal
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NutrientProgress {
    pub value: f64,
    pub goal: Option<f64>,
    /// Percentage of goal clamped to [0, 100], for progress-bar width
    pub percent: f64,
    /// goal - value, unclamped (negative means over goal)
    pub remaining: f64,
    pub status: ProgressStatus,
}

/// Progress across all four tracked nutrients
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GoalProgress {
    pub calories: NutrientProgress,
    pub protein: NutrientProgress,
    pub carbs: NutrientProgress,
    pub fat: NutrientProgress,
}

/// Evaluate one nutrient value against its goal.
///
/// A goal of `None` or <= 0 yields `NoGoal` with percent and remaining
/// both zero. Otherwise the status is decided from the RAW percentage, so
/// an intake at 250% of goal is `Over` even though the bar is pinned at
/// 100.
pub fn evaluate_nutrient(
    value: f64,
    goal: Option<f64>,
    thresholds: &ProgressThresholds,
) -> NutrientProgress {
    let goal_value = match goal {
        Some(g) if g > 0.0 => g,
        _ => {
            return NutrientProgress {
                value,
                goal: None,
                percent: 0.0,
                remaining: 0.0,
                status: ProgressStatus::NoGoal,
            }
        }
    };

    let raw_percent = (value / goal_value) * 100.0;
    let percent = raw_percent.clamp(0.0, 100.0);

    let status = if raw_percent < thresholds.on_target_min {
        ProgressStatus::Under
    } else if raw_percent <= thresholds.over_min {
        ProgressStatus::OnTarget
    } else {
        ProgressStatus::Over
    };

    NutrientProgress {
        value,
        goal: Some(goal_value),
        percent,
        remaining: goal_value - value,
        status,
    }
}

/// Evaluate a day's totals against a goal set.
///
/// Always returns a complete result; an entirely unset goal set produces
/// `NoGoal` across the board.
pub fn evaluate_progress(
    totals: &Nutrition,
    goals: &GoalSet,
    thresholds: &ProgressThresholds,
) -> GoalProgress {
    GoalProgress {
        calories: evaluate_nutrient(totals.calories, goals.calories, thresholds),
        protein: evaluate_nutrient(totals.protein, goals.protein, thresholds),
        carbs: evaluate_nutrient(totals.carbs, goals.carbs, thresholds),
        fat: evaluate_nutrient(totals.fat, goals.fat, thresholds),
    }
}
