//! Nutrition totals and daily aggregation
//!
//! Pure functions that turn resolved food-log entries into per-day nutrition
//! totals. No I/O, no timezone handling: dates are opaque `YYYY-MM-DD`
//! strings supplied by the caller, already bucketed to the intended
//! calendar day.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::Nutrition;

/// A food-log entry resolved with its food item's per-serving nutrition
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    /// Calendar day the food was eaten (ISO date: "2025-01-09")
    pub date: String,
    /// Per-serving nutrient values of the logged food
    pub per_serving: Nutrition,
    /// Number of servings eaten
    pub quantity: f64,
}

/// Nutrition totals for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTotals {
    pub date: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl DayTotals {
    /// All-zero totals stamped with the given date
    pub fn zero(date: &str) -> Self {
        Self {
            date: date.to_string(),
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
        }
    }

    pub fn nutrition(&self) -> Nutrition {
        Nutrition {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }
}

/// Daily breakdown over a set of entries
#[derive(Debug, Clone, Serialize)]
pub struct DailyBreakdown {
    /// One totals record per distinct date, in ascending date order
    pub days: Vec<DayTotals>,
    /// Totals for the reference date (all zeros if nothing was logged)
    pub today: DayTotals,
}

/// Sum nutrition across (per-serving, quantity) pairs.
///
/// Calories are rounded to the nearest kcal; protein/carbs/fat keep their
/// fractional precision so downstream percentages stay accurate. Rounding
/// to whole grams happens at presentation time only. An empty slice sums
/// to all zeros.
pub fn sum_entries<'a, I>(entries: I) -> Nutrition
where
    I: IntoIterator<Item = &'a ResolvedEntry>,
{
    let total: Nutrition = entries
        .into_iter()
        .map(|e| e.per_serving.scale(e.quantity))
        .sum();

    Nutrition {
        calories: total.calories.round(),
        ..total
    }
}

/// Group entries by calendar date and total each day.
///
/// Entries for the same date and same food stay independent; nothing is
/// merged or deduplicated. `today` is the caller's reference date: its
/// record is returned separately, zero-filled when absent from the input.
pub fn daily_breakdown(entries: &[ResolvedEntry], today: &str) -> DailyBreakdown {
    let mut by_date: BTreeMap<&str, Vec<&ResolvedEntry>> = BTreeMap::new();
    for entry in entries {
        by_date.entry(entry.date.as_str()).or_default().push(entry);
    }

    let days: Vec<DayTotals> = by_date
        .iter()
        .map(|(date, group)| {
            let total = sum_entries(group.iter().copied());
            DayTotals {
                date: date.to_string(),
                calories: total.calories,
                protein: total.protein,
                carbs: total.carbs,
                fat: total.fat,
            }
        })
        .collect();

    let today_totals = days
        .iter()
        .find(|d| d.date == today)
        .cloned()
        .unwrap_or_else(|| DayTotals::zero(today));

    DailyBreakdown {
        days,
        today: today_totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str, calories: f64, protein: f64, carbs: f64, fat: f64, qty: f64) -> ResolvedEntry {
        ResolvedEntry {
            date: date.to_string(),
            per_serving: Nutrition {
                calories,
                protein,
                carbs,
                fat,
            },
            quantity: qty,
        }
    }

    #[test]
    fn test_sum_empty_is_zero() {
        let empty: Vec<ResolvedEntry> = Vec::new();
        let total = sum_entries(&empty);
        assert_eq!(total, Nutrition::zero());
    }

    #[test]
    fn test_sum_scales_by_quantity() {
        let total = sum_entries(&[
            entry("2025-01-09", 100.0, 10.0, 20.0, 5.0, 2.0),
            entry("2025-01-09", 50.0, 2.5, 7.5, 1.0, 1.0),
        ]);
        assert_eq!(total.calories, 250.0);
        assert_eq!(total.protein, 22.5);
        assert_eq!(total.carbs, 47.5);
        assert_eq!(total.fat, 11.0);
    }

    #[test]
    fn test_sum_rounds_calories_only() {
        let total = sum_entries(&[entry("2025-01-09", 33.4, 1.1, 2.2, 0.3, 1.0)]);
        assert_eq!(total.calories, 33.0);
        // Macros keep fractional precision
        assert!((total.protein - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_sum_linearity() {
        let base = vec![
            entry("2025-01-09", 120.0, 8.0, 15.0, 4.0, 1.0),
            entry("2025-01-09", 80.0, 4.0, 10.0, 2.0, 1.5),
        ];
        let scaled: Vec<ResolvedEntry> = base
            .iter()
            .map(|e| ResolvedEntry {
                quantity: e.quantity * 3.0,
                ..e.clone()
            })
            .collect();

        let t1 = sum_entries(&base);
        let t3 = sum_entries(&scaled);
        assert!((t3.protein - t1.protein * 3.0).abs() < 1e-9);
        assert!((t3.carbs - t1.carbs * 3.0).abs() < 1e-9);
        assert!((t3.fat - t1.fat * 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_sum_never_negative_from_nonnegative_input() {
        let total = sum_entries(&[entry("2025-01-09", 0.0, 0.0, 0.0, 0.0, 5.0)]);
        assert!(total.calories >= 0.0);
        assert!(total.protein >= 0.0);
    }

    #[test]
    fn test_breakdown_one_record_per_date() {
        let entries = vec![
            entry("2025-01-08", 100.0, 5.0, 10.0, 2.0, 1.0),
            entry("2025-01-09", 200.0, 10.0, 20.0, 4.0, 1.0),
            entry("2025-01-09", 300.0, 15.0, 30.0, 6.0, 1.0),
            entry("2025-01-10", 400.0, 20.0, 40.0, 8.0, 1.0),
        ];
        let breakdown = daily_breakdown(&entries, "2025-01-09");

        assert_eq!(breakdown.days.len(), 3);
        assert_eq!(breakdown.days[0].date, "2025-01-08");
        assert_eq!(breakdown.days[1].date, "2025-01-09");
        assert_eq!(breakdown.days[2].date, "2025-01-10");
        assert_eq!(breakdown.today.calories, 500.0);
    }

    #[test]
    fn test_breakdown_totals_match_single_pass() {
        let entries = vec![
            entry("2025-01-08", 100.0, 5.0, 10.0, 2.0, 2.0),
            entry("2025-01-09", 210.0, 10.5, 21.0, 4.5, 1.0),
            entry("2025-01-10", 400.0, 20.0, 40.0, 8.0, 0.5),
        ];
        let breakdown = daily_breakdown(&entries, "2025-01-09");
        let single_pass = sum_entries(&entries);

        let day_sum: Nutrition = breakdown.days.iter().map(|d| d.nutrition()).sum();
        assert!((day_sum.protein - single_pass.protein).abs() < 1e-9);
        assert!((day_sum.carbs - single_pass.carbs).abs() < 1e-9);
        assert!((day_sum.fat - single_pass.fat).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_today_absent_is_zero_record() {
        let entries = vec![entry("2025-01-08", 100.0, 5.0, 10.0, 2.0, 1.0)];
        let breakdown = daily_breakdown(&entries, "2025-01-09");

        assert_eq!(breakdown.today, DayTotals::zero("2025-01-09"));
        assert_eq!(breakdown.today.date, "2025-01-09");
    }

    #[test]
    fn test_breakdown_same_food_entries_stay_independent() {
        // Two identical entries contribute twice, not once
        let entries = vec![
            entry("2025-01-09", 100.0, 5.0, 10.0, 2.0, 1.0),
            entry("2025-01-09", 100.0, 5.0, 10.0, 2.0, 1.0),
        ];
        let breakdown = daily_breakdown(&entries, "2025-01-09");
        assert_eq!(breakdown.today.calories, 200.0);
    }

    #[test]
    fn test_breakdown_deterministic() {
        let entries = vec![
            entry("2025-01-09", 123.4, 5.6, 7.8, 0.9, 1.3),
            entry("2025-01-08", 99.9, 1.2, 3.4, 5.6, 2.0),
        ];
        let a = daily_breakdown(&entries, "2025-01-09");
        let b = daily_breakdown(&entries, "2025-01-09");
        assert_eq!(a.days, b.days);
        assert_eq!(a.today, b.today);
    }
}
