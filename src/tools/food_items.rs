//! Food catalog tools
//!
//! Tools for managing the shared food catalog. Writes require an acting
//! admin; reads are open to everyone.

use serde::Serialize;

use crate::db::Database;
use crate::models::{FoodItem, FoodItemCreate, FoodItemUpdate};

use super::users::require_admin;

/// Response for add_food
#[derive(Debug, Serialize)]
pub struct AddFoodResponse {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// Summary of a food item for list/search results
#[derive(Debug, Serialize)]
pub struct FoodSummary {
    pub id: i64,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl From<&FoodItem> for FoodSummary {
    fn from(item: &FoodItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            calories: item.nutrition.calories,
            protein: item.nutrition.protein,
            carbs: item.nutrition.carbs,
            fat: item.nutrition.fat,
        }
    }
}

/// Full food item detail response
#[derive(Debug, Serialize)]
pub struct FoodDetail {
    pub id: i64,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub created_at: String,
    pub updated_at: String,
    /// Number of food-log entries referencing this food
    pub log_count: i64,
}

/// Response for search_foods
#[derive(Debug, Serialize)]
pub struct SearchFoodsResponse {
    pub items: Vec<FoodSummary>,
    pub total: usize,
}

/// Response for list_foods
#[derive(Debug, Serialize)]
pub struct ListFoodsResponse {
    pub items: Vec<FoodSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for update_food
#[derive(Debug, Serialize)]
pub struct UpdateFoodResponse {
    pub success: bool,
    pub updated_at: String,
}

/// Response for delete_food
#[derive(Debug, Serialize)]
pub struct DeleteFoodResponse {
    pub success: bool,
    pub deleted_id: i64,
}

fn validate_nutrition(calories: f64, protein: f64, carbs: f64, fat: f64) -> Result<(), String> {
    for (value, label) in [
        (calories, "calories"),
        (protein, "protein"),
        (carbs, "carbs"),
        (fat, "fat"),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{} must be a non-negative number", label));
        }
    }
    Ok(())
}

/// Add a new food to the catalog (admin only)
pub fn add_food(
    db: &Database,
    acting_user_id: i64,
    data: FoodItemCreate,
) -> Result<AddFoodResponse, String> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err("Food name cannot be empty".to_string());
    }
    validate_nutrition(data.calories, data.protein, data.carbs, data.fat)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    require_admin(&conn, acting_user_id)?;

    let item = FoodItem::create(&conn, &data)
        .map_err(|e| format!("Failed to create food item: {}", e))?;

    tracing::info!(food_id = item.id, "food added to catalog");

    Ok(AddFoodResponse {
        id: item.id,
        name: item.name,
        created_at: item.created_at,
    })
}

/// Get full details for a food item
pub fn get_food(db: &Database, id: i64) -> Result<Option<FoodDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = match FoodItem::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get food item: {}", e))?
    {
        Some(item) => item,
        None => return Ok(None),
    };

    let log_count = FoodItem::get_log_usage_count(&conn, id)
        .map_err(|e| format!("Failed to get usage count: {}", e))?;

    Ok(Some(FoodDetail {
        id: item.id,
        name: item.name,
        calories: item.nutrition.calories,
        protein: item.nutrition.protein,
        carbs: item.nutrition.carbs,
        fat: item.nutrition.fat,
        created_at: item.created_at,
        updated_at: item.updated_at,
        log_count,
    }))
}

/// Search foods by name
pub fn search_foods(db: &Database, query: &str, limit: i64) -> Result<SearchFoodsResponse, String> {
    let limit = limit.clamp(1, 100);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = FoodItem::search(&conn, query, limit)
        .map_err(|e| format!("Failed to search food items: {}", e))?;

    let summaries: Vec<FoodSummary> = items.iter().map(FoodSummary::from).collect();
    let total = summaries.len();

    Ok(SearchFoodsResponse {
        items: summaries,
        total,
    })
}

/// List foods with sorting and pagination
pub fn list_foods(
    db: &Database,
    sort_by: &str,
    sort_order: &str,
    limit: i64,
    offset: i64,
) -> Result<ListFoodsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = FoodItem::list(&conn, sort_by, sort_order, limit, offset)
        .map_err(|e| format!("Failed to list food items: {}", e))?;
    let total = FoodItem::count(&conn).map_err(|e| format!("Failed to count food items: {}", e))?;

    Ok(ListFoodsResponse {
        items: items.iter().map(FoodSummary::from).collect(),
        total,
        limit,
        offset,
    })
}

/// Update a catalog food (admin only)
pub fn update_food(
    db: &Database,
    acting_user_id: i64,
    id: i64,
    data: FoodItemUpdate,
) -> Result<UpdateFoodResponse, String> {
    if let Some(ref name) = data.name {
        if name.trim().is_empty() {
            return Err("Food name cannot be empty".to_string());
        }
    }
    for (value, label) in [
        (data.calories, "calories"),
        (data.protein, "protein"),
        (data.carbs, "carbs"),
        (data.fat, "fat"),
    ] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(format!("{} must be a non-negative number", label));
            }
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    require_admin(&conn, acting_user_id)?;

    let item = FoodItem::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update food item: {}", e))?
        .ok_or_else(|| format!("Food item {} not found", id))?;

    Ok(UpdateFoodResponse {
        success: true,
        updated_at: item.updated_at,
    })
}

/// Delete a catalog food (admin only; refused while logs reference it)
pub fn delete_food(
    db: &Database,
    acting_user_id: i64,
    id: i64,
) -> Result<DeleteFoodResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    require_admin(&conn, acting_user_id)?;

    let log_count = FoodItem::get_log_usage_count(&conn, id)
        .map_err(|e| format!("Failed to get usage count: {}", e))?;
    if log_count > 0 {
        return Err(format!(
            "Cannot delete food item {}: referenced by {} food log entries",
            id, log_count
        ));
    }

    let deleted = FoodItem::delete(&conn, id)
        .map_err(|e| format!("Failed to delete food item: {}", e))?;
    if !deleted {
        return Err(format!("Food item {} not found", id));
    }

    tracing::info!(food_id = id, "food removed from catalog");

    Ok(DeleteFoodResponse {
        success: true,
        deleted_id: id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::users::tests::{admin_db, register};

    #[test]
    fn test_add_food_requires_admin() {
        let (db, admin_id) = admin_db();
        let member = register(&db, "m@example.com", "Member");

        let data = FoodItemCreate {
            name: "Rice".to_string(),
            calories: 130.0,
            protein: 2.7,
            carbs: 28.0,
            fat: 0.3,
        };

        assert!(add_food(&db, member, data.clone()).is_err());
        assert!(add_food(&db, admin_id, data).is_ok());
    }

    #[test]
    fn test_delete_blocked_while_logged() {
        let (db, admin_id) = admin_db();
        let user = register(&db, "m@example.com", "Member");

        let food = add_food(
            &db,
            admin_id,
            FoodItemCreate {
                name: "Rice".to_string(),
                calories: 130.0,
                protein: 2.7,
                carbs: 28.0,
                fat: 0.3,
            },
        )
        .unwrap();

        let log =
            crate::tools::food_logs::log_food(&db, user, food.id, "2025-01-09", 1.0).unwrap();
        assert!(delete_food(&db, admin_id, food.id).is_err());

        crate::tools::food_logs::delete_log(&db, user, log.id).unwrap();
        assert!(delete_food(&db, admin_id, food.id).unwrap().success);
    }

    #[test]
    fn test_add_food_rejects_negative_values() {
        let (db, admin_id) = admin_db();
        let data = FoodItemCreate {
            name: "Bad".to_string(),
            calories: -10.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
        };
        assert!(add_food(&db, admin_id, data).is_err());
    }
}
