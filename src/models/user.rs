//! User model
//!
//! Roster rows with role and per-user daily nutrition goals.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::GoalSet;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub daily_calorie_goal: Option<f64>,
    pub daily_protein_goal: Option<f64>,
    pub daily_carb_goal: Option<f64>,
    pub daily_fat_goal: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for registering a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub name: String,
}

impl User {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            email: row.get("email")?,
            name: row.get("name")?,
            role: Role::from_str(row.get::<_, String>("role")?.as_str()),
            daily_calorie_goal: row.get("daily_calorie_goal")?,
            daily_protein_goal: row.get("daily_protein_goal")?,
            daily_carb_goal: row.get("daily_carb_goal")?,
            daily_fat_goal: row.get("daily_fat_goal")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// The user's goals as the progress evaluator consumes them
    pub fn goals(&self) -> GoalSet {
        GoalSet {
            calories: self.daily_calorie_goal,
            protein: self.daily_protein_goal,
            carbs: self.daily_carb_goal,
            fat: self.daily_fat_goal,
        }
    }

    /// Register a new user (role defaults to 'user')
    pub fn create(conn: &Connection, data: &UserCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO users (email, name) VALUES (?1, ?2)",
            params![data.email, data.name],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a user by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a user by email
    pub fn get_by_email(conn: &Connection, email: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE email = ?1")?;

        let result = stmt.query_row([email], Self::from_row);
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all users, oldest first
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users ORDER BY created_at ASC, id ASC")?;

        let users = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Count all users
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Change a user's role
    pub fn set_role(conn: &Connection, id: i64, role: Role) -> DbResult<Option<Self>> {
        conn.execute(
            "UPDATE users SET role = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![role.as_str(), id],
        )?;

        Self::get_by_id(conn, id)
    }

    /// Replace the user's stored goals. `None` clears a goal.
    pub fn set_goals(conn: &Connection, id: i64, goals: &GoalSet) -> DbResult<Option<Self>> {
        conn.execute(
            r#"
            UPDATE users SET
                daily_calorie_goal = ?1,
                daily_protein_goal = ?2,
                daily_carb_goal = ?3,
                daily_fat_goal = ?4,
                updated_at = datetime('now')
            WHERE id = ?5
            "#,
            params![goals.calories, goals.protein, goals.carbs, goals.fat, id],
        )?;

        Self::get_by_id(conn, id)
    }

    /// Delete a user; their food logs cascade
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_register_defaults_to_user_role() {
        let conn = test_conn();
        let user = User::create(
            &conn,
            &UserCreate {
                email: "sam@example.com".to_string(),
                name: "Sam".to_string(),
            },
        )
        .unwrap();
        assert_eq!(user.role, Role::User);
        assert!(user.daily_calorie_goal.is_none());
    }

    #[test]
    fn test_email_unique() {
        let conn = test_conn();
        let data = UserCreate {
            email: "sam@example.com".to_string(),
            name: "Sam".to_string(),
        };
        User::create(&conn, &data).unwrap();
        assert!(User::create(&conn, &data).is_err());
    }

    #[test]
    fn test_set_goals_roundtrip() {
        let conn = test_conn();
        let user = User::create(
            &conn,
            &UserCreate {
                email: "sam@example.com".to_string(),
                name: "Sam".to_string(),
            },
        )
        .unwrap();

        let goals = GoalSet {
            calories: Some(2000.0),
            protein: Some(120.0),
            carbs: None,
            fat: Some(65.0),
        };
        let updated = User::set_goals(&conn, user.id, &goals).unwrap().unwrap();
        assert_eq!(updated.daily_calorie_goal, Some(2000.0));
        assert_eq!(updated.daily_carb_goal, None);
        assert_eq!(updated.goals().fat, Some(65.0));
    }
}
