//! Scenario description and its mapping into the 20-field model input.

use std::collections::BTreeMap;

use chrono::Weekday;
use polars::prelude::*;

use crate::categories::{ExamPhase, Level, MaintenanceSeverity, WeatherCondition};
use crate::config::ScenarioDefaults;
use crate::error::PulseError;
use crate::schema::features;

/// What a planner selects on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub weekday: Weekday,
    /// 1 = January.
    pub month: u32,
    pub population: i64,
    pub stress: Level,
    pub adoption: Level,
    pub exam_phase: ExamPhase,
    pub weather: WeatherCondition,
    pub maintenance: MaintenanceSeverity,
    pub is_vacation: bool,
    pub is_open: bool,
}

impl Scenario {
    /// Build from raw dashboard inputs, rejecting anything outside the vocabulary.
    #[allow(clippy::too_many_arguments)]
    pub fn from_inputs(
        day_of_week: u32,
        month: u32,
        population: i64,
        stress: i64,
        adoption: i64,
        exam_phase: &str,
        weather: &str,
        maintenance: &str,
        is_vacation: bool,
        is_open: bool,
    ) -> Result<Self, PulseError> {
        let weekday = weekday_from_index(day_of_week)?;
        if !(1..=12).contains(&month) {
            return Err(PulseError::Validation(format!("month {month} is not in 1-12")));
        }
        if population < 0 {
            return Err(PulseError::Validation(format!(
                "population {population} is negative"
            )));
        }
        Ok(Self {
            weekday,
            month,
            population,
            stress: Level::new("stress", stress)?,
            adoption: Level::new("adoption", adoption)?,
            exam_phase: exam_phase.parse()?,
            weather: weather.parse()?,
            maintenance: maintenance.parse()?,
            is_vacation,
            is_open,
        })
    }

    /// Same scenario on another weekday.
    pub fn on(&self, weekday: Weekday) -> Self {
        Self {
            weekday,
            ..self.clone()
        }
    }
}

pub fn weekday_from_index(day_of_week: u32) -> Result<Weekday, PulseError> {
    match day_of_week {
        0 => Ok(Weekday::Mon),
        1 => Ok(Weekday::Tue),
        2 => Ok(Weekday::Wed),
        3 => Ok(Weekday::Thu),
        4 => Ok(Weekday::Fri),
        5 => Ok(Weekday::Sat),
        6 => Ok(Weekday::Sun),
        _ => Err(PulseError::Validation(format!(
            "day of week {day_of_week} is not in 0-6"
        ))),
    }
}

/// Categories the model was never given a column for.
pub fn unrepresented_categories() -> Vec<&'static str> {
    vec![
        WeatherCondition::ColdMorning.label(),
        MaintenanceSeverity::High.label(),
    ]
}

/// Labels in `scenario` that collapse to all-zero one-hots.
pub fn unrepresented_in(scenario: &Scenario) -> Vec<&'static str> {
    let mut out = Vec::new();
    if scenario.weather == WeatherCondition::ColdMorning {
        out.push(scenario.weather.label());
    }
    if scenario.maintenance == MaintenanceSeverity::High {
        out.push(scenario.maintenance.label());
    }
    out
}

/// The exact model input, addressable by feature name.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; 20],
}

impl FeatureVector {
    pub fn from_scenario(scenario: &Scenario, defaults: &ScenarioDefaults) -> Self {
        let day = scenario.weekday.num_days_from_monday();
        let onehot = |b: bool| if b { 1.0 } else { 0.0 };
        let values = [
            f64::from(day),
            onehot(scenario.weekday == Weekday::Sun),
            f64::from(scenario.month),
            f64::from(defaults.year),
            onehot(scenario.is_vacation),
            1.0,
            scenario.population as f64,
            scenario.stress.academic_load(),
            onehot(defaults.interuni_event),
            defaults.event_boost_factor,
            scenario.adoption.adoption_ratio(),
            defaults.equipment_availability_ratio,
            onehot(scenario.exam_phase == ExamPhase::Midterm),
            onehot(scenario.exam_phase == ExamPhase::None),
            onehot(scenario.weather == WeatherCondition::ExtremeHeat),
            onehot(scenario.weather == WeatherCondition::HeavyRain),
            onehot(scenario.weather == WeatherCondition::Normal),
            onehot(scenario.maintenance == MaintenanceSeverity::Low),
            onehot(scenario.maintenance == MaintenanceSeverity::Medium),
            onehot(scenario.maintenance == MaintenanceSeverity::None),
        ];
        Self { values }
    }

    /// Build from named values; every feature must be present exactly once.
    pub fn from_named(named: &BTreeMap<String, f64>) -> Result<Self, PulseError> {
        if let Some(unknown) = named.keys().find(|k| !features::ALL.contains(&k.as_str())) {
            return Err(PulseError::MissingFeature(unknown.clone()));
        }
        let mut values = [0.0; 20];
        for (slot, name) in values.iter_mut().zip(features::ALL) {
            *slot = *named
                .get(name)
                .ok_or_else(|| PulseError::MissingFeature(name.to_string()))?;
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        features::ALL
            .iter()
            .position(|f| *f == name)
            .map(|i| self.values[i])
    }

    /// Values in model column order.
    pub fn values(&self) -> &[f64; 20] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        features::ALL.iter().copied().zip(self.values.iter().copied())
    }

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    /// A single-row frame with the model's column order.
    pub fn to_frame(&self) -> Result<DataFrame, PulseError> {
        let cols: Vec<Column> = self
            .iter()
            .map(|(name, v)| Column::new(name.into(), [v]))
            .collect();
        Ok(DataFrame::new(cols)?)
    }
}
