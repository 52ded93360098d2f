//! Food Log model
//!
//! One row per food eaten by a user on a calendar day.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::ResolvedEntry;
use super::Nutrition;

/// A logged food entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLog {
    pub id: i64,
    pub user_id: i64,
    pub food_item_id: i64,
    pub date: String,  // ISO date: "2025-01-09"
    pub quantity: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// A log entry joined with its food item's name and nutrition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLogDetail {
    pub id: i64,
    pub user_id: i64,
    pub food_item_id: i64,
    pub food_name: String,
    pub date: String,
    pub quantity: f64,
    /// Per-serving values of the referenced food
    pub per_serving: Nutrition,
    pub created_at: String,
}

/// Data for creating a food log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLogCreate {
    pub user_id: i64,
    pub food_item_id: i64,
    pub date: String,
    pub quantity: f64,
}

impl FoodLogDetail {
    /// View of this entry as the aggregation core consumes it
    pub fn resolved(&self) -> ResolvedEntry {
        ResolvedEntry {
            date: self.date.clone(),
            per_serving: self.per_serving,
            quantity: self.quantity,
        }
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            food_item_id: row.get("food_item_id")?,
            food_name: row.get("food_name")?,
            date: row.get("date")?,
            quantity: row.get("quantity")?,
            per_serving: Nutrition {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fat: row.get("fat")?,
            },
            created_at: row.get("created_at")?,
        })
    }
}

const DETAIL_SELECT: &str = r#"
    SELECT
        fl.id, fl.user_id, fl.food_item_id, fl.date, fl.quantity, fl.created_at,
        fi.name AS food_name, fi.calories, fi.protein, fi.carbs, fi.fat
    FROM food_logs fl
    INNER JOIN food_items fi ON fi.id = fl.food_item_id
"#;

impl FoodLog {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            food_item_id: row.get("food_item_id")?,
            date: row.get("date")?,
            quantity: row.get("quantity")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new log entry
    pub fn create(conn: &Connection, data: &FoodLogCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO food_logs (user_id, food_item_id, date, quantity)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![data.user_id, data.food_item_id, data.date, data.quantity],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a log entry by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_logs WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List a user's resolved entries for one date, newest first
    pub fn list_for_date(conn: &Connection, user_id: i64, date: &str) -> DbResult<Vec<FoodLogDetail>> {
        let sql = format!(
            "{} WHERE fl.user_id = ?1 AND fl.date = ?2 ORDER BY fl.created_at DESC",
            DETAIL_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;

        let logs = stmt
            .query_map(params![user_id, date], FoodLogDetail::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    /// List a user's resolved entries for an inclusive date range
    pub fn list_for_range(
        conn: &Connection,
        user_id: i64,
        start_date: &str,
        end_date: &str,
    ) -> DbResult<Vec<FoodLogDetail>> {
        let sql = format!(
            "{} WHERE fl.user_id = ?1 AND fl.date >= ?2 AND fl.date <= ?3 ORDER BY fl.date ASC",
            DETAIL_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;

        let logs = stmt
            .query_map(params![user_id, start_date, end_date], FoodLogDetail::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    /// Update the quantity of a log entry
    pub fn update_quantity(conn: &Connection, id: i64, quantity: f64) -> DbResult<Option<Self>> {
        conn.execute(
            "UPDATE food_logs SET quantity = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![quantity, id],
        )?;

        Self::get_by_id(conn, id)
    }

    /// Count all log entries
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM food_logs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a log entry
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM food_logs WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
