//! Macrolog Library
//!
//! Core functionality for personal nutrition tracking.

pub mod build_info;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
