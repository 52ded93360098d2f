//! Settings tools
//!
//! Per-user daily nutrition goals. A supplied value of 0 clears the goal
//! (stored NULL), matching the evaluator's no-goal rule; omitted values
//! are left unchanged.

use serde::Serialize;

use crate::db::Database;
use crate::models::User;
use crate::nutrition::GoalSet;

/// Response for get_settings and update_settings
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub user_id: i64,
    pub goals: GoalSet,
    pub updated_at: String,
}

/// Merge one supplied goal value into the stored one
fn merge_goal(current: Option<f64>, supplied: Option<f64>, label: &str) -> Result<Option<f64>, String> {
    match supplied {
        None => Ok(current),
        Some(v) if !v.is_finite() || v < 0.0 => {
            Err(format!("{} goal must be a non-negative number", label))
        }
        Some(v) if v == 0.0 => Ok(None),
        Some(v) => Ok(Some(v)),
    }
}

/// Get a user's stored goals
pub fn get_settings(db: &Database, user_id: i64) -> Result<SettingsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let user = User::get_by_id(&conn, user_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("User {} not found", user_id))?;

    Ok(SettingsResponse {
        user_id: user.id,
        goals: user.goals(),
        updated_at: user.updated_at,
    })
}

/// Update a user's goals. Only supplied values change; 0 clears.
pub fn update_settings(
    db: &Database,
    user_id: i64,
    calorie_goal: Option<f64>,
    protein_goal: Option<f64>,
    carb_goal: Option<f64>,
    fat_goal: Option<f64>,
) -> Result<SettingsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let user = User::get_by_id(&conn, user_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("User {} not found", user_id))?;

    let current = user.goals();
    let goals = GoalSet {
        calories: merge_goal(current.calories, calorie_goal, "calorie")?,
        protein: merge_goal(current.protein, protein_goal, "protein")?,
        carbs: merge_goal(current.carbs, carb_goal, "carb")?,
        fat: merge_goal(current.fat, fat_goal, "fat")?,
    };

    let user = User::set_goals(&conn, user_id, &goals)
        .map_err(|e| format!("Failed to update goals: {}", e))?
        .ok_or_else(|| format!("User {} not found", user_id))?;

    tracing::info!(user_id, "goals updated");

    Ok(SettingsResponse {
        user_id: user.id,
        goals: user.goals(),
        updated_at: user.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::users::tests::{admin_db, register};

    #[test]
    fn test_update_merges_and_clears() {
        let (db, _) = admin_db();
        let user = register(&db, "u@example.com", "U");

        let resp = update_settings(&db, user, Some(2000.0), Some(120.0), None, None).unwrap();
        assert_eq!(resp.goals.calories, Some(2000.0));
        assert_eq!(resp.goals.protein, Some(120.0));
        assert_eq!(resp.goals.carbs, None);

        // Omitted values stay; zero clears
        let resp = update_settings(&db, user, None, Some(0.0), None, Some(70.0)).unwrap();
        assert_eq!(resp.goals.calories, Some(2000.0));
        assert_eq!(resp.goals.protein, None);
        assert_eq!(resp.goals.fat, Some(70.0));
    }

    #[test]
    fn test_update_rejects_negative() {
        let (db, _) = admin_db();
        let user = register(&db, "u@example.com", "U");
        assert!(update_settings(&db, user, Some(-100.0), None, None, None).is_err());
    }

    #[test]
    fn test_get_settings_unknown_user() {
        let (db, _) = admin_db();
        assert!(get_settings(&db, 9999).is_err());
    }
}
