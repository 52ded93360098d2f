//! User roster tools
//!
//! Registration plus admin-only roster management. Authentication itself
//! is out of scope; tools take an explicit acting-user id and check its
//! stored role.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::Database;
use crate::models::{Role, User, UserCreate};

/// Summary of a user for roster listings
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            created_at: user.created_at.clone(),
        }
    }
}

/// Response for register_user
#[derive(Debug, Serialize)]
pub struct RegisterUserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Response for list_users
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserSummary>,
    pub total: usize,
}

/// Response for set_user_role
#[derive(Debug, Serialize)]
pub struct SetUserRoleResponse {
    pub id: i64,
    pub role: Role,
    pub updated_at: String,
}

/// Response for delete_user
#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Look up the acting user and require the admin role
pub(crate) fn require_admin(conn: &Connection, acting_user_id: i64) -> Result<User, String> {
    let user = User::get_by_id(conn, acting_user_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Acting user {} not found", acting_user_id))?;

    if user.role != Role::Admin {
        return Err("Forbidden: admin role required".to_string());
    }
    Ok(user)
}

/// Register a new user with the default role
pub fn register_user(db: &Database, email: &str, name: &str) -> Result<RegisterUserResponse, String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err("A valid email address is required".to_string());
    }
    let name = name.trim();
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if User::get_by_email(&conn, &email)
        .map_err(|e| format!("Database error: {}", e))?
        .is_some()
    {
        return Err(format!("A user with email {} already exists", email));
    }

    // The first account bootstraps the roster as an admin
    let first_user =
        User::count(&conn).map_err(|e| format!("Database error: {}", e))? == 0;

    let mut user = User::create(
        &conn,
        &UserCreate {
            email,
            name: name.to_string(),
        },
    )
    .map_err(|e| format!("Failed to register user: {}", e))?;

    if first_user {
        user = User::set_role(&conn, user.id, Role::Admin)
            .map_err(|e| format!("Failed to set role: {}", e))?
            .ok_or_else(|| format!("User {} not found", user.id))?;
    }

    tracing::info!(user_id = user.id, role = user.role.as_str(), "user registered");

    Ok(RegisterUserResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    })
}

/// Get a user by ID
pub fn get_user(db: &Database, id: i64) -> Result<Option<UserSummary>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let user = User::get_by_id(&conn, id).map_err(|e| format!("Database error: {}", e))?;
    Ok(user.as_ref().map(UserSummary::from))
}

/// List the roster (admin only)
pub fn list_users(db: &Database, acting_user_id: i64) -> Result<ListUsersResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    require_admin(&conn, acting_user_id)?;

    let users = User::list(&conn).map_err(|e| format!("Failed to list users: {}", e))?;
    let summaries: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();
    let total = summaries.len();

    Ok(ListUsersResponse {
        users: summaries,
        total,
    })
}

/// Change a user's role (admin only; admins cannot change their own role)
pub fn set_user_role(
    db: &Database,
    acting_user_id: i64,
    user_id: i64,
    role: &str,
) -> Result<SetUserRoleResponse, String> {
    let role = match role.to_lowercase().as_str() {
        "user" => Role::User,
        "admin" => Role::Admin,
        other => return Err(format!("Invalid role: {}", other)),
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    require_admin(&conn, acting_user_id)?;

    // Self-demotion would lock the roster; refuse role changes on self
    if acting_user_id == user_id {
        return Err("You cannot change your own role".to_string());
    }

    let user = User::set_role(&conn, user_id, role)
        .map_err(|e| format!("Failed to update role: {}", e))?
        .ok_or_else(|| format!("User {} not found", user_id))?;

    tracing::info!(user_id, role = role.as_str(), "user role changed");

    Ok(SetUserRoleResponse {
        id: user.id,
        role: user.role,
        updated_at: user.updated_at,
    })
}

/// Delete a user and their food logs (admin only)
pub fn delete_user(
    db: &Database,
    acting_user_id: i64,
    user_id: i64,
) -> Result<DeleteUserResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    require_admin(&conn, acting_user_id)?;

    if acting_user_id == user_id {
        return Err("You cannot delete your own account".to_string());
    }

    let deleted = User::delete(&conn, user_id)
        .map_err(|e| format!("Failed to delete user: {}", e))?;
    if !deleted {
        return Err(format!("User {} not found", user_id));
    }

    tracing::info!(user_id, "user deleted");

    Ok(DeleteUserResponse {
        success: true,
        deleted_id: user_id,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DB_SEQ: AtomicUsize = AtomicUsize::new(0);

    /// Pooled database over a shared in-memory SQLite, migrated and seeded
    /// with one admin. Returns (db, admin_id).
    pub(crate) fn admin_db() -> (Database, i64) {
        let n = DB_SEQ.fetch_add(1, Ordering::SeqCst);
        let uri = format!("file:macrolog_test_{}?mode=memory&cache=shared", n);
        let db = Database::new(&uri).unwrap();
        db.with_conn(|conn| crate::db::migrations::run_migrations(conn))
            .unwrap();

        let admin_id = db
            .with_conn(|conn| {
                let user = User::create(
                    conn,
                    &UserCreate {
                        email: "admin@example.com".to_string(),
                        name: "Admin".to_string(),
                    },
                )?;
                User::set_role(conn, user.id, Role::Admin)?;
                Ok(user.id)
            })
            .unwrap();

        (db, admin_id)
    }

    /// Register a regular user, returning their id
    pub(crate) fn register(db: &Database, email: &str, name: &str) -> i64 {
        register_user(db, email, name).unwrap().id
    }

    #[test]
    fn test_first_registered_user_is_admin() {
        let n = DB_SEQ.fetch_add(1, Ordering::SeqCst);
        let uri = format!("file:macrolog_boot_{}?mode=memory&cache=shared", n);
        let db = Database::new(&uri).unwrap();
        db.with_conn(|conn| crate::db::migrations::run_migrations(conn))
            .unwrap();

        let first = register_user(&db, "first@example.com", "First").unwrap();
        assert_eq!(first.role, Role::Admin);
        let second = register_user(&db, "second@example.com", "Second").unwrap();
        assert_eq!(second.role, Role::User);
    }

    #[test]
    fn test_register_rejects_bad_email() {
        let (db, _) = admin_db();
        assert!(register_user(&db, "not-an-email", "X").is_err());
        assert!(register_user(&db, "", "X").is_err());
    }

    #[test]
    fn test_register_rejects_duplicate_email() {
        let (db, _) = admin_db();
        register(&db, "dup@example.com", "First");
        assert!(register_user(&db, "dup@example.com", "Second").is_err());
        // Email comparison is case-insensitive
        assert!(register_user(&db, "DUP@example.com", "Third").is_err());
    }

    #[test]
    fn test_list_users_requires_admin() {
        let (db, admin_id) = admin_db();
        let member = register(&db, "m@example.com", "Member");

        assert!(list_users(&db, member).is_err());
        let roster = list_users(&db, admin_id).unwrap();
        assert_eq!(roster.total, 2);
    }

    #[test]
    fn test_role_change_guards() {
        let (db, admin_id) = admin_db();
        let member = register(&db, "m@example.com", "Member");

        // Non-admin cannot promote
        assert!(set_user_role(&db, member, member, "admin").is_err());
        // Admin cannot change own role
        assert!(set_user_role(&db, admin_id, admin_id, "user").is_err());
        // Invalid role string rejected
        assert!(set_user_role(&db, admin_id, member, "owner").is_err());

        let resp = set_user_role(&db, admin_id, member, "admin").unwrap();
        assert_eq!(resp.role, Role::Admin);
    }

    #[test]
    fn test_delete_user_guards() {
        let (db, admin_id) = admin_db();
        let member = register(&db, "m@example.com", "Member");

        assert!(delete_user(&db, member, admin_id).is_err());
        assert!(delete_user(&db, admin_id, admin_id).is_err());
        assert!(delete_user(&db, admin_id, member).unwrap().success);
        assert!(get_user(&db, member).unwrap().is_none());
    }
}
