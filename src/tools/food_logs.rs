//! Food log tools
//!
//! Logging foods eaten per day. Entries are owned by the logging user;
//! quantity updates and deletes check ownership here, at the boundary.

use serde::Serialize;

use crate::db::Database;
use crate::models::{FoodItem, FoodLog, FoodLogCreate, FoodLogDetail, Nutrition, User};
use crate::nutrition::sum_entries;

/// Response for log_food
#[derive(Debug, Serialize)]
pub struct LogFoodResponse {
    pub id: i64,
    pub date: String,
    pub food_name: String,
    pub quantity: f64,
    /// Per-serving nutrition scaled by quantity
    pub nutrition: Nutrition,
}

/// Response for list_logs
#[derive(Debug, Serialize)]
pub struct ListLogsResponse {
    pub date: String,
    pub entries: Vec<FoodLogDetail>,
    /// Totals across the listed entries
    pub totals: Nutrition,
}

/// Response for update_log_quantity
#[derive(Debug, Serialize)]
pub struct UpdateLogQuantityResponse {
    pub id: i64,
    pub quantity: f64,
    pub updated_at: String,
}

/// Response for delete_log
#[derive(Debug, Serialize)]
pub struct DeleteLogResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Validate an ISO calendar date ("YYYY-MM-DD")
fn validate_date(date: &str) -> Result<(), String> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| format!("Invalid date '{}': expected YYYY-MM-DD", date))
}

fn validate_quantity(quantity: f64) -> Result<(), String> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err("quantity must be greater than 0".to_string());
    }
    Ok(())
}

/// Log a food eaten on a date
pub fn log_food(
    db: &Database,
    user_id: i64,
    food_item_id: i64,
    date: &str,
    quantity: f64,
) -> Result<LogFoodResponse, String> {
    validate_date(date)?;
    validate_quantity(quantity)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if User::get_by_id(&conn, user_id)
        .map_err(|e| format!("Database error: {}", e))?
        .is_none()
    {
        return Err(format!("User {} not found", user_id));
    }

    let food = FoodItem::get_by_id(&conn, food_item_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Food item {} not found", food_item_id))?;

    let log = FoodLog::create(
        &conn,
        &FoodLogCreate {
            user_id,
            food_item_id,
            date: date.to_string(),
            quantity,
        },
    )
    .map_err(|e| format!("Failed to create food log: {}", e))?;

    tracing::info!(log_id = log.id, user_id, date, "food logged");

    Ok(LogFoodResponse {
        id: log.id,
        date: log.date,
        food_name: food.name,
        quantity: log.quantity,
        nutrition: food.nutrition.scale(quantity),
    })
}

/// List a user's log entries for one date, with totals
pub fn list_logs(db: &Database, user_id: i64, date: &str) -> Result<ListLogsResponse, String> {
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let entries = FoodLog::list_for_date(&conn, user_id, date)
        .map_err(|e| format!("Failed to list food logs: {}", e))?;

    let resolved: Vec<_> = entries.iter().map(|e| e.resolved()).collect();
    let totals = sum_entries(&resolved);

    Ok(ListLogsResponse {
        date: date.to_string(),
        entries,
        totals,
    })
}

/// Fetch a log entry and check it belongs to the acting user
fn owned_log(
    conn: &rusqlite::Connection,
    user_id: i64,
    log_id: i64,
) -> Result<FoodLog, String> {
    let log = FoodLog::get_by_id(conn, log_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Food log {} not found", log_id))?;

    if log.user_id != user_id {
        return Err(format!("Food log {} does not belong to user {}", log_id, user_id));
    }
    Ok(log)
}

/// Change the quantity of an owned log entry
pub fn update_log_quantity(
    db: &Database,
    user_id: i64,
    log_id: i64,
    quantity: f64,
) -> Result<UpdateLogQuantityResponse, String> {
    validate_quantity(quantity)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    owned_log(&conn, user_id, log_id)?;

    let log = FoodLog::update_quantity(&conn, log_id, quantity)
        .map_err(|e| format!("Failed to update food log: {}", e))?
        .ok_or_else(|| format!("Food log {} not found", log_id))?;

    Ok(UpdateLogQuantityResponse {
        id: log.id,
        quantity: log.quantity,
        updated_at: log.updated_at,
    })
}

/// Delete an owned log entry
pub fn delete_log(db: &Database, user_id: i64, log_id: i64) -> Result<DeleteLogResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    owned_log(&conn, user_id, log_id)?;

    FoodLog::delete(&conn, log_id).map_err(|e| format!("Failed to delete food log: {}", e))?;

    tracing::info!(log_id, user_id, "food log deleted");

    Ok(DeleteLogResponse {
        success: true,
        deleted_id: log_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FoodItemCreate;
    use crate::tools::food_items::add_food;
    use crate::tools::users::tests::{admin_db, register};

    fn seed_food(db: &Database, admin_id: i64) -> i64 {
        add_food(
            db,
            admin_id,
            FoodItemCreate {
                name: "Eggs".to_string(),
                calories: 78.0,
                protein: 6.3,
                carbs: 0.6,
                fat: 5.3,
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_log_and_list_with_totals() {
        let (db, admin_id) = admin_db();
        let user = register(&db, "u@example.com", "U");
        let food = seed_food(&db, admin_id);

        log_food(&db, user, food, "2025-01-09", 2.0).unwrap();
        log_food(&db, user, food, "2025-01-09", 1.0).unwrap();

        let listed = list_logs(&db, user, "2025-01-09").unwrap();
        assert_eq!(listed.entries.len(), 2);
        // 3 eggs: 234 kcal, calories rounded, macros fractional
        assert_eq!(listed.totals.calories, 234.0);
        assert!((listed.totals.protein - 18.9).abs() < 1e-9);
    }

    #[test]
    fn test_log_food_validates_input() {
        let (db, admin_id) = admin_db();
        let user = register(&db, "u@example.com", "U");
        let food = seed_food(&db, admin_id);

        assert!(log_food(&db, user, food, "01/09/2025", 1.0).is_err());
        assert!(log_food(&db, user, food, "2025-01-09", 0.0).is_err());
        assert!(log_food(&db, user, food, "2025-01-09", -1.0).is_err());
        assert!(log_food(&db, user, 9999, "2025-01-09", 1.0).is_err());
    }

    #[test]
    fn test_ownership_enforced() {
        let (db, admin_id) = admin_db();
        let alice = register(&db, "alice@example.com", "Alice");
        let bob = register(&db, "bob@example.com", "Bob");
        let food = seed_food(&db, admin_id);

        let log = log_food(&db, alice, food, "2025-01-09", 1.0).unwrap();

        assert!(update_log_quantity(&db, bob, log.id, 2.0).is_err());
        assert!(delete_log(&db, bob, log.id).is_err());

        assert!(update_log_quantity(&db, alice, log.id, 2.0).is_ok());
        assert!(delete_log(&db, alice, log.id).unwrap().success);
    }
}
