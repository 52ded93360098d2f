//! Energy balance estimation
//!
//! BMR via a selectable formula (Mifflin-St Jeor, revised Harris-Benedict,
//! Katch-McArdle), TDEE via an activity multiplier, target calories from a
//! fixed goal adjustment, and the weekly weight-change estimate derived
//! from a caloric delta (3500 kcal per pound).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Biological sex for the sex-dependent BMR formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            _ => None,
        }
    }
}

/// BMR formula selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmrFormula {
    /// Mifflin-St Jeor (1990)
    Mifflin,
    /// Revised Harris-Benedict (Roza & Shizgal, 1984)
    Harris,
    /// Katch-McArdle, lean-mass based; needs body fat percentage
    Katch,
}

impl BmrFormula {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mifflin" => Some(BmrFormula::Mifflin),
            "harris" => Some(BmrFormula::Harris),
            "katch" => Some(BmrFormula::Katch),
            _ => None,
        }
    }
}

/// Activity level, carrying its TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise (1.2)
    Sedentary,
    /// Light exercise 1-3 days per week (1.375)
    Light,
    /// Moderate exercise 3-5 days per week (1.55)
    Moderate,
    /// Heavy exercise 6-7 days per week (1.725)
    Active,
    /// Physical job or training twice a day (1.9)
    VeryActive,
}

impl ActivityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" => Some(ActivityLevel::Light),
            "moderate" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            "very_active" | "veryactive" => Some(ActivityLevel::VeryActive),
            _ => None,
        }
    }
}

/// Goal adjustment applied on top of TDEE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalAdjustment {
    /// 500 kcal deficit for weight loss
    Deficit,
    Maintain,
    /// 500 kcal surplus for weight gain
    Surplus,
}

impl GoalAdjustment {
    pub fn kcal(&self) -> i64 {
        match self {
            GoalAdjustment::Deficit => -500,
            GoalAdjustment::Maintain => 0,
            GoalAdjustment::Surplus => 500,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deficit" | "lose" => Some(GoalAdjustment::Deficit),
            "maintain" => Some(GoalAdjustment::Maintain),
            "surplus" | "gain" => Some(GoalAdjustment::Surplus),
            _ => None,
        }
    }
}

/// Body metrics and selections feeding the estimate
#[derive(Debug, Clone, Copy)]
pub struct EnergyInput {
    pub sex: Sex,
    pub age_years: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub formula: BmrFormula,
    pub activity: ActivityLevel,
    pub adjustment: GoalAdjustment,
    /// Required for Katch-McArdle only
    pub body_fat_percent: Option<f64>,
}

/// Invalid-input errors, signaled to the caller rather than coerced to zero
#[derive(Debug, Error, PartialEq)]
pub enum EnergyInputError {
    #[error("Age must be between 10 and 120 years")]
    AgeOutOfRange,

    #[error("Weight must be between 20 and 400 kg")]
    WeightOutOfRange,

    #[error("Height must be between 100 and 250 cm")]
    HeightOutOfRange,

    #[error("Body fat percentage is required for the Katch-McArdle formula")]
    MissingBodyFat,

    #[error("Body fat percentage must be between 1 and 70")]
    BodyFatOutOfRange,
}

/// Result of an energy estimate, all values in whole kcal
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EnergyEstimate {
    pub bmr: i64,
    pub tdee: i64,
    pub target_calories: i64,
    /// Stored calorie goal minus target (positive = eating over target)
    pub intake_delta: Option<i64>,
    /// Estimated pounds gained or lost per week at the intake delta
    pub weekly_weight_change_lbs: Option<f64>,
}

fn validate(input: &EnergyInput) -> Result<(), EnergyInputError> {
    if !(10..=120).contains(&input.age_years) {
        return Err(EnergyInputError::AgeOutOfRange);
    }
    if !input.weight_kg.is_finite() || !(20.0..=400.0).contains(&input.weight_kg) {
        return Err(EnergyInputError::WeightOutOfRange);
    }
    if !input.height_cm.is_finite() || !(100.0..=250.0).contains(&input.height_cm) {
        return Err(EnergyInputError::HeightOutOfRange);
    }
    if input.formula == BmrFormula::Katch {
        let bf = input.body_fat_percent.ok_or(EnergyInputError::MissingBodyFat)?;
        if !bf.is_finite() || !(1.0..=70.0).contains(&bf) {
            return Err(EnergyInputError::BodyFatOutOfRange);
        }
    }
    Ok(())
}

/// Basal metabolic rate in kcal, before rounding
fn bmr_raw(input: &EnergyInput) -> f64 {
    let w = input.weight_kg;
    let h = input.height_cm;
    let a = f64::from(input.age_years);

    match input.formula {
        BmrFormula::Mifflin => match input.sex {
            Sex::Male => 10.0 * w + 6.25 * h - 5.0 * a + 5.0,
            Sex::Female => 10.0 * w + 6.25 * h - 5.0 * a - 161.0,
        },
        BmrFormula::Harris => match input.sex {
            Sex::Male => 13.397 * w + 4.799 * h - 5.677 * a + 88.362,
            Sex::Female => 9.247 * w + 3.098 * h - 4.330 * a + 447.593,
        },
        BmrFormula::Katch => {
            // Validated upstream; Katch without body fat never reaches here
            let bf = input.body_fat_percent.unwrap_or(0.0);
            370.0 + 21.6 * (1.0 - bf / 100.0) * w
        }
    }
}

/// Estimated pounds of weight change per week for a daily caloric delta.
///
/// 3500 kcal corresponds to one pound; the magnitude is symmetric for
/// gain and loss, rounded to one decimal.
pub fn weekly_weight_change_lbs(caloric_delta: f64) -> f64 {
    let pounds_per_week = (caloric_delta * 7.0 / 3500.0).abs();
    (pounds_per_week * 10.0).round() / 10.0
}

/// Compute BMR, TDEE, and target calories for the given input.
///
/// When `daily_calorie_goal` is supplied, the estimate also carries the
/// delta between that goal and the target, plus the weekly weight-change
/// magnitude that delta implies. Stateless; invoked fresh on every input.
pub fn estimate_energy(
    input: &EnergyInput,
    daily_calorie_goal: Option<f64>,
) -> Result<EnergyEstimate, EnergyInputError> {
    validate(input)?;

    let bmr = bmr_raw(input).round() as i64;
    let tdee = (bmr as f64 * input.activity.multiplier()).round() as i64;
    let target_calories = tdee + input.adjustment.kcal();

    let intake_delta = daily_calorie_goal
        .filter(|g| g.is_finite() && *g > 0.0)
        .map(|g| (g - target_calories as f64).round() as i64);
    let weekly = intake_delta.map(|d| weekly_weight_change_lbs(d as f64));

    Ok(EnergyEstimate {
        bmr,
        tdee,
        target_calories,
        intake_delta,
        weekly_weight_change_lbs: weekly,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mifflin_male_input() -> EnergyInput {
        EnergyInput {
            sex: Sex::Male,
            age_years: 30,
            weight_kg: 70.0,
            height_cm: 175.0,
            formula: BmrFormula::Mifflin,
            activity: ActivityLevel::Moderate,
            adjustment: GoalAdjustment::Deficit,
            body_fat_percent: None,
        }
    }

    #[test]
    fn test_mifflin_male_reference_values() {
        // 10*70 + 6.25*175 - 5*30 + 5 = 1648.75 -> 1649
        let est = estimate_energy(&mifflin_male_input(), None).unwrap();
        assert_eq!(est.bmr, 1649);
        // round(1649 * 1.55) = 2556
        assert_eq!(est.tdee, 2556);
        assert_eq!(est.target_calories, 2056);
        assert_eq!(est.intake_delta, None);
        assert_eq!(est.weekly_weight_change_lbs, None);
    }

    #[test]
    fn test_mifflin_female_offset() {
        let input = EnergyInput {
            sex: Sex::Female,
            adjustment: GoalAdjustment::Maintain,
            ..mifflin_male_input()
        };
        let est = estimate_energy(&input, None).unwrap();
        // Same metrics, -161 instead of +5: 1482.75 -> 1483
        assert_eq!(est.bmr, 1483);
        assert_eq!(est.target_calories, est.tdee);
    }

    #[test]
    fn test_harris_male() {
        let input = EnergyInput {
            formula: BmrFormula::Harris,
            ..mifflin_male_input()
        };
        let est = estimate_energy(&input, None).unwrap();
        // 13.397*70 + 4.799*175 - 5.677*30 + 88.362 = 1695.667 -> 1696
        assert_eq!(est.bmr, 1696);
    }

    #[test]
    fn test_katch_uses_lean_mass() {
        let input = EnergyInput {
            formula: BmrFormula::Katch,
            body_fat_percent: Some(20.0),
            ..mifflin_male_input()
        };
        let est = estimate_energy(&input, None).unwrap();
        // 370 + 21.6 * 0.8 * 70 = 1579.6 -> 1580
        assert_eq!(est.bmr, 1580);

        // Sex does not enter the Katch formula
        let female = EnergyInput {
            sex: Sex::Female,
            ..input
        };
        assert_eq!(estimate_energy(&female, None).unwrap().bmr, 1580);
    }

    #[test]
    fn test_katch_requires_body_fat() {
        let input = EnergyInput {
            formula: BmrFormula::Katch,
            body_fat_percent: None,
            ..mifflin_male_input()
        };
        assert_eq!(
            estimate_energy(&input, None).unwrap_err(),
            EnergyInputError::MissingBodyFat
        );
    }

    #[test]
    fn test_out_of_range_metrics_rejected() {
        let input = EnergyInput {
            weight_kg: 0.0,
            ..mifflin_male_input()
        };
        assert_eq!(
            estimate_energy(&input, None).unwrap_err(),
            EnergyInputError::WeightOutOfRange
        );

        let input = EnergyInput {
            age_years: 5,
            ..mifflin_male_input()
        };
        assert_eq!(
            estimate_energy(&input, None).unwrap_err(),
            EnergyInputError::AgeOutOfRange
        );

        let input = EnergyInput {
            height_cm: 400.0,
            ..mifflin_male_input()
        };
        assert_eq!(
            estimate_energy(&input, None).unwrap_err(),
            EnergyInputError::HeightOutOfRange
        );
    }

    #[test]
    fn test_intake_delta_and_weekly_change() {
        // target = 2056; goal 2306 -> eating 250 over
        let est = estimate_energy(&mifflin_male_input(), Some(2306.0)).unwrap();
        assert_eq!(est.intake_delta, Some(250));
        // |250 * 7 / 3500| = 0.5
        assert_eq!(est.weekly_weight_change_lbs, Some(0.5));
    }

    #[test]
    fn test_weekly_change_symmetric() {
        assert_eq!(weekly_weight_change_lbs(500.0), 1.0);
        assert_eq!(weekly_weight_change_lbs(-500.0), 1.0);
        assert_eq!(weekly_weight_change_lbs(0.0), 0.0);
        // 250/day over a week is half a pound
        assert_eq!(weekly_weight_change_lbs(250.0), 0.5);
    }

    #[test]
    fn test_activity_multipliers_fixed_set() {
        assert_eq!(ActivityLevel::Sedentary.multiplier(), 1.2);
        assert_eq!(ActivityLevel::Light.multiplier(), 1.375);
        assert_eq!(ActivityLevel::Moderate.multiplier(), 1.55);
        assert_eq!(ActivityLevel::Active.multiplier(), 1.725);
        assert_eq!(ActivityLevel::VeryActive.multiplier(), 1.9);
    }
}
