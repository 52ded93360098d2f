//! Macrolog MCP Server Implementation
//!
//! Implements the MCP server with all Macrolog tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{FoodItemCreate, FoodItemUpdate};
use crate::tools::calculator;
use crate::tools::food_items;
use crate::tools::food_logs;
use crate::tools::settings;
use crate::tools::status::StatusTracker;
use crate::tools::summary;
use crate::tools::users;

/// Macrolog MCP Service
#[derive(Clone)]
pub struct MacrologService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<MacrologService>,
}

impl MacrologService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// User Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RegisterUserParams {
    /// Email address (unique, case-insensitive)
    pub email: String,
    /// Display name
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetUserParams {
    /// User ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListUsersParams {
    /// ID of the user making the request (must be an admin)
    pub acting_user_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetUserRoleParams {
    /// ID of the admin making the request
    pub acting_user_id: i64,
    /// User whose role to change
    pub user_id: i64,
    /// New role: "user" or "admin"
    pub role: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteUserParams {
    /// ID of the admin making the request
    pub acting_user_id: i64,
    /// User to delete (their food logs are removed too)
    pub user_id: i64,
}

// ============================================================================
// Settings Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetSettingsParams {
    /// User ID
    pub user_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateSettingsParams {
    /// User ID
    pub user_id: i64,
    /// Daily calorie goal in kcal (0 clears the goal, omit to keep current)
    pub daily_calorie_goal: Option<f64>,
    /// Daily protein goal in grams (0 clears, omit to keep)
    pub daily_protein_goal: Option<f64>,
    /// Daily carb goal in grams (0 clears, omit to keep)
    pub daily_carb_goal: Option<f64>,
    /// Daily fat goal in grams (0 clears, omit to keep)
    pub daily_fat_goal: Option<f64>,
}

// ============================================================================
// Food Catalog Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddFoodParams {
    /// ID of the admin making the request
    pub acting_user_id: i64,
    /// Food name
    pub name: String,
    /// Calories per serving (kcal)
    pub calories: f64,
    /// Protein per serving (grams)
    #[serde(default)]
    pub protein: f64,
    /// Carbs per serving (grams)
    #[serde(default)]
    pub carbs: f64,
    /// Fat per serving (grams)
    #[serde(default)]
    pub fat: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetFoodParams {
    /// Food item ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchFoodsParams {
    /// Name fragment to search for
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListFoodsParams {
    /// Sort field: name, created_at, or calories
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// Sort order: asc or desc
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_sort_by() -> String {
    "name".to_string()
}

fn default_sort_order() -> String {
    "asc".to_string()
}

fn default_list_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateFoodParams {
    /// ID of the admin making the request
    pub acting_user_id: i64,
    /// Food item ID
    pub id: i64,
    /// New name
    pub name: Option<String>,
    /// New calories per serving
    pub calories: Option<f64>,
    /// New protein per serving
    pub protein: Option<f64>,
    /// New carbs per serving
    pub carbs: Option<f64>,
    /// New fat per serving
    pub fat: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteFoodParams {
    /// ID of the admin making the request
    pub acting_user_id: i64,
    /// Food item ID (only deletable while no log entries reference it)
    pub id: i64,
}

// ============================================================================
// Food Log Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogFoodParams {
    /// User ID
    pub user_id: i64,
    /// Food item ID from the catalog
    pub food_item_id: i64,
    /// Date in YYYY-MM-DD format
    pub date: String,
    /// Number of servings (must be > 0)
    #[serde(default = "default_quantity")]
    pub quantity: f64,
}

fn default_quantity() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListLogsParams {
    /// User ID
    pub user_id: i64,
    /// Date in YYYY-MM-DD format
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateLogQuantityParams {
    /// User ID (must own the log entry)
    pub user_id: i64,
    /// Food log ID
    pub log_id: i64,
    /// New number of servings (must be > 0)
    pub quantity: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteLogParams {
    /// User ID (must own the log entry)
    pub user_id: i64,
    /// Food log ID
    pub log_id: i64,
}

// ============================================================================
// Summary Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetSummaryParams {
    /// User ID
    pub user_id: i64,
    /// Number of trailing days to include (1-366)
    #[serde(default = "default_summary_days")]
    pub days: i64,
    /// Reference date in YYYY-MM-DD format (defaults to today)
    pub today: Option<String>,
}

fn default_summary_days() -> i64 {
    30
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDayParams {
    /// User ID
    pub user_id: i64,
    /// Date in YYYY-MM-DD format
    pub date: String,
}

// ============================================================================
// Calculator Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EstimateEnergyParams {
    /// User ID (stored calorie goal is compared against the target)
    pub user_id: i64,
    /// Biological sex: "male" or "female"
    pub sex: String,
    /// Age in years (10-120)
    pub age_years: u32,
    /// Body weight in kilograms (20-400)
    pub weight_kg: f64,
    /// Height in centimeters (100-250)
    pub height_cm: f64,
    /// BMR formula: "mifflin", "harris", or "katch"
    #[serde(default = "default_formula")]
    pub formula: String,
    /// Activity level: sedentary, light, moderate, active, very_active
    #[serde(default = "default_activity_level")]
    pub activity_level: String,
    /// Goal: "deficit" (or "lose"), "maintain", "surplus" (or "gain")
    #[serde(default = "default_goal")]
    pub goal: String,
    /// Body fat percentage (1-70, required for the katch formula)
    pub body_fat_percent: Option<f64>,
}

fn default_formula() -> String {
    "mifflin".to_string()
}

fn default_activity_level() -> String {
    "sedentary".to_string()
}

fn default_goal() -> String {
    "maintain".to_string()
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MacrologService {
    // --- Status ---

    #[tool(description = "Get the current status of the Macrolog service including build info, database status, and process information")]
    async fn macrolog_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Users ---

    #[tool(description = "Register a new user with an email address and display name. The first registered user becomes an admin.")]
    fn register_user(&self, Parameters(p): Parameters<RegisterUserParams>) -> Result<CallToolResult, McpError> {
        let result = users::register_user(&self.database, &p.email, &p.name)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get a user's profile including role and goals")]
    fn get_user(&self, Parameters(p): Parameters<GetUserParams>) -> Result<CallToolResult, McpError> {
        let result = users::get_user(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(user) => serde_json::to_string_pretty(&user),
            None => Ok(format!(r#"{{"error": "User not found", "id": {}}}"#, p.id)),
        }
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List all registered users (admin only)")]
    fn list_users(&self, Parameters(p): Parameters<ListUsersParams>) -> Result<CallToolResult, McpError> {
        let result = users::list_users(&self.database, p.acting_user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Change a user's role to 'user' or 'admin' (admin only; admins cannot change their own role)")]
    fn set_user_role(&self, Parameters(p): Parameters<SetUserRoleParams>) -> Result<CallToolResult, McpError> {
        let result = users::set_user_role(&self.database, p.acting_user_id, p.user_id, &p.role)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a user and all of their food logs (admin only; admins cannot delete themselves)")]
    fn delete_user(&self, Parameters(p): Parameters<DeleteUserParams>) -> Result<CallToolResult, McpError> {
        let result = users::delete_user(&self.database, p.acting_user_id, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Settings ---

    #[tool(description = "Get a user's daily nutrition goals")]
    fn get_settings(&self, Parameters(p): Parameters<GetSettingsParams>) -> Result<CallToolResult, McpError> {
        let result = settings::get_settings(&self.database, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update a user's daily nutrition goals. Only supplied goals change; a value of 0 clears that goal.")]
    fn update_settings(&self, Parameters(p): Parameters<UpdateSettingsParams>) -> Result<CallToolResult, McpError> {
        let result = settings::update_settings(
            &self.database,
            p.user_id,
            p.daily_calorie_goal,
            p.daily_protein_goal,
            p.daily_carb_goal,
            p.daily_fat_goal,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Food Catalog ---

    #[tool(description = "Add a new food to the catalog with per-serving nutritional values (admin only)")]
    fn add_food(&self, Parameters(p): Parameters<AddFoodParams>) -> Result<CallToolResult, McpError> {
        let data = FoodItemCreate {
            name: p.name,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
        };
        let result = food_items::add_food(&self.database, p.acting_user_id, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get full details for a catalog food including how many log entries reference it")]
    fn get_food(&self, Parameters(p): Parameters<GetFoodParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::get_food(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(item) => serde_json::to_string_pretty(&item),
            None => Ok(format!(r#"{{"error": "Food item not found", "id": {}}}"#, p.id)),
        }
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Search catalog foods by name")]
    fn search_foods(&self, Parameters(p): Parameters<SearchFoodsParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::search_foods(&self.database, &p.query, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List catalog foods with sorting and pagination")]
    fn list_foods(&self, Parameters(p): Parameters<ListFoodsParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::list_foods(&self.database, &p.sort_by, &p.sort_order, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update a catalog food's name or nutritional values (admin only)")]
    fn update_food(&self, Parameters(p): Parameters<UpdateFoodParams>) -> Result<CallToolResult, McpError> {
        let data = FoodItemUpdate {
            name: p.name,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
        };
        let result = food_items::update_food(&self.database, p.acting_user_id, p.id, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a catalog food (admin only; refused while any log entries reference it)")]
    fn delete_food(&self, Parameters(p): Parameters<DeleteFoodParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::delete_food(&self.database, p.acting_user_id, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Food Logs ---

    #[tool(description = "Log a food eaten on a date. Quantity is the number of servings and scales the food's nutrition.")]
    fn log_food(&self, Parameters(p): Parameters<LogFoodParams>) -> Result<CallToolResult, McpError> {
        let result = food_logs::log_food(&self.database, p.user_id, p.food_item_id, &p.date, p.quantity)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List a user's food log entries for a date with running totals")]
    fn list_logs(&self, Parameters(p): Parameters<ListLogsParams>) -> Result<CallToolResult, McpError> {
        let result = food_logs::list_logs(&self.database, p.user_id, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Change the serving quantity of a food log entry (owner only)")]
    fn update_log_quantity(&self, Parameters(p): Parameters<UpdateLogQuantityParams>) -> Result<CallToolResult, McpError> {
        let result = food_logs::update_log_quantity(&self.database, p.user_id, p.log_id, p.quantity)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a food log entry (owner only)")]
    fn delete_log(&self, Parameters(p): Parameters<DeleteLogParams>) -> Result<CallToolResult, McpError> {
        let result = food_logs::delete_log(&self.database, p.user_id, p.log_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Summaries ---

    #[tool(description = "Get a multi-day nutrition summary: daily totals for the trailing window, today's totals, and goal progress")]
    fn get_summary(&self, Parameters(p): Parameters<GetSummaryParams>) -> Result<CallToolResult, McpError> {
        let result = summary::get_summary(&self.database, p.user_id, p.days, p.today.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get a single day's food log entries, totals, and goal progress")]
    fn get_day(&self, Parameters(p): Parameters<GetDayParams>) -> Result<CallToolResult, McpError> {
        let result = summary::get_day(&self.database, p.user_id, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Calculator ---

    #[tool(description = "Estimate BMR, TDEE, and a target calorie intake from body stats. Compares the target against the user's stored calorie goal when one exists.")]
    fn estimate_energy(&self, Parameters(p): Parameters<EstimateEnergyParams>) -> Result<CallToolResult, McpError> {
        let result = calculator::estimate(
            &self.database,
            p.user_id,
            &p.sex,
            p.age_years,
            p.weight_kg,
            p.height_cm,
            &p.formula,
            &p.activity_level,
            &p.goal,
            p.body_fat_percent,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for MacrologService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "macrolog".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Macrolog".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Macrolog - Nutrition tracking with daily goals. \
                 Users: register_user/get_user/list_users/set_user_role/delete_user. \
                 Admin tools take acting_user_id; role checks are enforced against it. \
                 Goals: get_settings/update_settings (a goal value of 0 clears that goal). \
                 Food catalog: add/get/search/list/update/delete_food (per-serving values; writes are admin only). \
                 Logging: log_food/list_logs/update_log_quantity/delete_log (dates are YYYY-MM-DD, quantity is servings). \
                 Summaries: get_summary (trailing N-day window with daily totals and goal progress), get_day. \
                 Calculator: estimate_energy (Mifflin-St Jeor, Harris-Benedict, or Katch-McArdle)."
                    .into(),
            ),
        }
    }
}
