//! Macrolog tools module
//!
//! MCP tool implementations for nutrition tracking.

pub mod calculator;
pub mod food_items;
pub mod food_logs;
pub mod settings;
pub mod status;
pub mod summary;
pub mod users;
