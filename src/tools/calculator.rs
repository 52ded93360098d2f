//! Energy calculator tool
//!
//! Maps string selections from the MCP boundary onto the typed energy
//! estimator, and folds in the user's stored calorie goal for the weekly
//! weight-change comparison.

use serde::Serialize;

use crate::db::Database;
use crate::models::User;
use crate::nutrition::{
    estimate_energy, ActivityLevel, BmrFormula, EnergyEstimate, EnergyInput, GoalAdjustment, Sex,
};

/// Response for estimate_energy
#[derive(Debug, Serialize)]
pub struct EstimateEnergyResponse {
    pub bmr: i64,
    pub tdee: i64,
    pub target_calories: i64,
    pub formula: BmrFormula,
    pub activity_multiplier: f64,
    /// The user's stored calorie goal, when one exists
    pub daily_calorie_goal: Option<f64>,
    /// Stored goal minus target (positive = eating over target)
    pub intake_delta: Option<i64>,
    pub weekly_weight_change_lbs: Option<f64>,
}

#[allow(clippy::too_many_arguments)]
pub fn estimate(
    db: &Database,
    user_id: i64,
    sex: &str,
    age_years: u32,
    weight_kg: f64,
    height_cm: f64,
    formula: &str,
    activity_level: &str,
    goal: &str,
    body_fat_percent: Option<f64>,
) -> Result<EstimateEnergyResponse, String> {
    let sex = Sex::from_str(sex).ok_or_else(|| format!("Invalid sex: {}", sex))?;
    let formula =
        BmrFormula::from_str(formula).ok_or_else(|| format!("Invalid formula: {}", formula))?;
    let activity = ActivityLevel::from_str(activity_level)
        .ok_or_else(|| format!("Invalid activity level: {}", activity_level))?;
    let adjustment =
        GoalAdjustment::from_str(goal).ok_or_else(|| format!("Invalid goal: {}", goal))?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = User::get_by_id(&conn, user_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("User {} not found", user_id))?;

    let input = EnergyInput {
        sex,
        age_years,
        weight_kg,
        height_cm,
        formula,
        activity,
        adjustment,
        body_fat_percent,
    };

    let EnergyEstimate {
        bmr,
        tdee,
        target_calories,
        intake_delta,
        weekly_weight_change_lbs,
    } = estimate_energy(&input, user.daily_calorie_goal).map_err(|e| e.to_string())?;

    Ok(EstimateEnergyResponse {
        bmr,
        tdee,
        target_calories,
        formula,
        activity_multiplier: activity.multiplier(),
        daily_calorie_goal: user.daily_calorie_goal,
        intake_delta,
        weekly_weight_change_lbs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::settings::update_settings;
    use crate::tools::users::tests::{admin_db, register};

    #[test]
    fn test_estimate_without_stored_goal() {
        let (db, _) = admin_db();
        let user = register(&db, "u@example.com", "U");

        let resp = estimate(
            &db, user, "male", 30, 70.0, 175.0, "mifflin", "moderate", "deficit", None,
        )
        .unwrap();
        assert_eq!(resp.bmr, 1649);
        assert_eq!(resp.tdee, 2556);
        assert_eq!(resp.target_calories, 2056);
        assert_eq!(resp.intake_delta, None);
    }

    #[test]
    fn test_estimate_with_stored_goal() {
        let (db, _) = admin_db();
        let user = register(&db, "u@example.com", "U");
        update_settings(&db, user, Some(2306.0), None, None, None).unwrap();

        let resp = estimate(
            &db, user, "male", 30, 70.0, 175.0, "mifflin", "moderate", "deficit", None,
        )
        .unwrap();
        assert_eq!(resp.intake_delta, Some(250));
        assert_eq!(resp.weekly_weight_change_lbs, Some(0.5));
    }

    #[test]
    fn test_estimate_rejects_bad_selections() {
        let (db, _) = admin_db();
        let user = register(&db, "u@example.com", "U");

        assert!(estimate(&db, user, "other", 30, 70.0, 175.0, "mifflin", "moderate", "deficit", None).is_err());
        assert!(estimate(&db, user, "male", 30, 70.0, 175.0, "cunningham", "moderate", "deficit", None).is_err());
        assert!(estimate(&db, user, "male", 30, 70.0, 175.0, "katch", "moderate", "deficit", None).is_err());
    }
}
