use std::path::PathBuf;

use chrono::{NaiveDate, Weekday};

use crate::categories::MaintenanceSeverity;
use crate::error::PulseError;

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar date"),
    }
}

/// First day of the reference dataset.
pub const DEFAULT_START_DATE: NaiveDate = ymd(2021, 1, 1);
/// Last day of the reference dataset, inclusive.
pub const DEFAULT_END_DATE: NaiveDate = ymd(2026, 1, 1);

/// Generator configuration. `Default` reproduces the reference dataset.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// First generated date.
    pub start_date: NaiveDate,
    /// Last generated date (inclusive).
    pub end_date: NaiveDate,
    pub seed: u64,
    /// 30 users x 6 hours.
    pub base_capacity: u32,
    pub vacation_months: Vec<u32>,
    pub closed_weekday: Weekday,
    /// Inclusive population bounds.
    pub population_range: (i64, i64),
    pub academic_load_mean: f64,
    pub academic_load_std: f64,
    pub academic_load_bounds: (f64, f64),
    /// Adoption ratio in the first year, growing by `adoption_yearly_growth`.
    pub adoption_base: f64,
    pub adoption_base_year: i32,
    pub adoption_yearly_growth: f64,
    pub adoption_noise_std: f64,
    pub adoption_bounds: (f64, f64),
    pub maintenance_probability: f64,
    /// Weights for low / medium / high when maintenance fires.
    pub severity_weights: [(MaintenanceSeverity, f64); 3],
    pub academic_load_penalty: f64,
    /// Demand noise standard deviation as a share of demand.
    pub demand_noise_ratio: f64,
    pub output_path: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_date: DEFAULT_START_DATE,
            end_date: DEFAULT_END_DATE,
            seed: 42,
            base_capacity: 180,
            vacation_months: vec![5, 6],
            closed_weekday: Weekday::Sun,
            population_range: (200, 250),
            academic_load_mean: 0.5,
            academic_load_std: 0.15,
            academic_load_bounds: (0.0, 1.0),
            adoption_base: 0.3,
            adoption_base_year: 2021,
            adoption_yearly_growth: 0.05,
            adoption_noise_std: 0.05,
            adoption_bounds: (0.25, 0.6),
            maintenance_probability: 0.08,
            severity_weights: [
                (MaintenanceSeverity::Low, 0.5),
                (MaintenanceSeverity::Medium, 0.3),
                (MaintenanceSeverity::High, 0.2),
            ],
            academic_load_penalty: 0.4,
            demand_noise_ratio: 0.10,
            output_path: PathBuf::from("gym_footfall_dataset.csv"),
        }
    }
}

impl GeneratorConfig {
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_base_capacity(mut self, capacity: u32) -> Self {
        self.base_capacity = capacity;
        self
    }

    pub fn with_vacation_months(mut self, months: Vec<u32>) -> Self {
        self.vacation_months = months;
        self
    }

    pub fn with_closed_weekday(mut self, weekday: Weekday) -> Self {
        self.closed_weekday = weekday;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Number of rows the configured range produces.
    pub fn row_count(&self) -> usize {
        let days = (self.end_date - self.start_date).num_days();
        if days < 0 {
            0
        } else {
            days as usize + 1
        }
    }

    pub fn validate(&self) -> Result<(), PulseError> {
        if self.end_date < self.start_date {
            return Err(PulseError::Config(format!(
                "end date {} precedes start date {}",
                self.end_date, self.start_date
            )));
        }
        if self.base_capacity == 0 {
            return Err(PulseError::Config("base capacity must be positive".into()));
        }
        if let Some(m) = self.vacation_months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(PulseError::Config(format!("vacation month {m} is not in 1-12")));
        }
        let (pop_min, pop_max) = self.population_range;
        if pop_min < 0 || pop_min > pop_max {
            return Err(PulseError::Config(format!(
                "population range [{pop_min}, {pop_max}] is invalid"
            )));
        }
        for (name, (lo, hi)) in [
            ("academic load", self.academic_load_bounds),
            ("adoption", self.adoption_bounds),
        ] {
            if !(lo <= hi) {
                return Err(PulseError::Config(format!(
                    "{name} bounds [{lo}, {hi}] are inverted"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.maintenance_probability) {
            return Err(PulseError::Config(format!(
                "maintenance probability {} is not in [0, 1]",
                self.maintenance_probability
            )));
        }
        if self.severity_weights.iter().any(|(_, w)| !(*w >= 0.0))
            || self.severity_weights.iter().map(|(_, w)| w).sum::<f64>() <= 0.0
        {
            return Err(PulseError::Config(
                "severity weights must be non-negative with a positive total".into(),
            ));
        }
        for (name, std) in [
            ("academic load std", self.academic_load_std),
            ("adoption noise std", self.adoption_noise_std),
            ("demand noise ratio", self.demand_noise_ratio),
        ] {
            if !(std >= 0.0) || !std.is_finite() {
                return Err(PulseError::Config(format!(
                    "{name} must be a finite non-negative number"
                )));
            }
        }
        Ok(())
    }
}

/// Fixed inputs the scenario mapper fills in for fields a dashboard user cannot set.
#[derive(Debug, Clone)]
pub struct ScenarioDefaults {
    pub year: i32,
    pub interuni_event: bool,
    pub event_boost_factor: f64,
    pub equipment_availability_ratio: f64,
}

impl Default for ScenarioDefaults {
    fn default() -> Self {
        Self {
            year: 2024,
            interuni_event: false,
            event_boost_factor: 1.0,
            equipment_availability_ratio: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_range_spans_five_years_inclusive() {
        let config = GeneratorConfig::default();
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(config.end_date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(config.row_count(), 1827);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_range() {
        let config = GeneratorConfig::default().with_date_range(
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        );
        assert_eq!(config.row_count(), 0);
        assert!(matches!(config.validate(), Err(PulseError::Config(_))));
    }

    #[test]
    fn rejects_bad_vacation_month_and_capacity() {
        let config = GeneratorConfig::default().with_vacation_months(vec![5, 13]);
        assert!(config.validate().is_err());
        let config = GeneratorConfig::default().with_base_capacity(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let config = GeneratorConfig {
            maintenance_probability: 1.5,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
