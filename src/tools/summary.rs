//! Summary tools
//!
//! Daily and trailing-window nutrition summaries with goal progress.
//! "Today" is stamped once per request from the local clock (or taken
//! from the caller); the aggregation core never touches timezones.

use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;

use crate::db::Database;
use crate::models::{FoodLog, FoodLogDetail, User};
use crate::nutrition::{
    daily_breakdown, sum_entries, DayTotals, GoalProgress, GoalSet, ProgressThresholds,
};

/// Response for get_summary
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub start_date: String,
    pub end_date: String,
    pub goals: GoalSet,
    /// One totals record per date with logged entries, ascending
    pub daily_data: Vec<DayTotals>,
    /// Totals for the reference date (zeros when nothing was logged)
    pub today_summary: DayTotals,
    /// Today's totals evaluated against the stored goals
    pub today_progress: GoalProgress,
}

/// Response for get_day
#[derive(Debug, Serialize)]
pub struct DaySummaryResponse {
    pub date: String,
    pub entries: Vec<FoodLogDetail>,
    pub totals: DayTotals,
    pub progress: GoalProgress,
}

fn parse_date(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}': expected YYYY-MM-DD", date))
}

/// Resolve the reference date: caller-supplied, or the local calendar day
fn reference_date(today: Option<&str>) -> Result<NaiveDate, String> {
    match today {
        Some(date) => parse_date(date),
        None => Ok(Local::now().date_naive()),
    }
}

/// Summarize a user's trailing N-day window ending at the reference date
pub fn get_summary(
    db: &Database,
    user_id: i64,
    days: i64,
    today: Option<&str>,
) -> Result<SummaryResponse, String> {
    if !(1..=366).contains(&days) {
        return Err("days must be between 1 and 366".to_string());
    }

    let end = reference_date(today)?;
    let start = end - Duration::days(days - 1);
    let end_str = end.format("%Y-%m-%d").to_string();
    let start_str = start.format("%Y-%m-%d").to_string();

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let user = User::get_by_id(&conn, user_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("User {} not found", user_id))?;

    let entries = FoodLog::list_for_range(&conn, user_id, &start_str, &end_str)
        .map_err(|e| format!("Failed to fetch food logs: {}", e))?;

    let resolved: Vec<_> = entries.iter().map(|e| e.resolved()).collect();
    let breakdown = daily_breakdown(&resolved, &end_str);

    let goals = user.goals();
    let thresholds = ProgressThresholds::default();
    let today_progress =
        crate::nutrition::evaluate_progress(&breakdown.today.nutrition(), &goals, &thresholds);

    Ok(SummaryResponse {
        start_date: start_str,
        end_date: end_str,
        goals,
        daily_data: breakdown.days,
        today_summary: breakdown.today,
        today_progress,
    })
}

/// Summarize a single date for a user: entries, totals, and progress
pub fn get_day(db: &Database, user_id: i64, date: &str) -> Result<DaySummaryResponse, String> {
    parse_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let user = User::get_by_id(&conn, user_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("User {} not found", user_id))?;

    let entries = FoodLog::list_for_date(&conn, user_id, date)
        .map_err(|e| format!("Failed to fetch food logs: {}", e))?;

    let resolved: Vec<_> = entries.iter().map(|e| e.resolved()).collect();
    let total = sum_entries(&resolved);
    let totals = DayTotals {
        date: date.to_string(),
        calories: total.calories,
        protein: total.protein,
        carbs: total.carbs,
        fat: total.fat,
    };

    let thresholds = ProgressThresholds::default();
    let progress = crate::nutrition::evaluate_progress(&total, &user.goals(), &thresholds);

    Ok(DaySummaryResponse {
        date: date.to_string(),
        entries,
        totals,
        progress,
    })
}
