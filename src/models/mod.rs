//! Data models
//!
//! Rust structs representing database entities.

mod food_item;
mod food_log;
mod nutrition;
mod user;

pub use food_item::{FoodItem, FoodItemCreate, FoodItemUpdate};
pub use food_log::{FoodLog, FoodLogCreate, FoodLogDetail};
pub use nutrition::Nutrition;
pub use user::{Role, User, UserCreate};
