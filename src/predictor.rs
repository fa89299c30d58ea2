use std::fmt;
use std::path::Path;

use chrono::Weekday;
use polars::prelude::*;
use tracing::{debug, warn};

use crate::config::ScenarioDefaults;
use crate::error::PulseError;
use crate::features::{unrepresented_in, FeatureVector, Scenario};
use crate::model::{load_model, Regressor};
use crate::schema::forecast;

pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Scores scenarios against a loaded model.
pub struct ScenarioPredictor {
    model: Box<dyn Regressor>,
    defaults: ScenarioDefaults,
}

impl ScenarioPredictor {
    pub fn new(model: Box<dyn Regressor>) -> Self {
        Self {
            model,
            defaults: ScenarioDefaults::default(),
        }
    }

    /// Fails when the artifact is missing or matches neither shape.
    pub fn from_artifact(path: &Path) -> Result<Self, PulseError> {
        Ok(Self::new(load_model(path)?))
    }

    pub fn with_defaults(mut self, defaults: ScenarioDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn model_description(&self) -> String {
        self.model.describe()
    }

    pub fn features(&self, scenario: &Scenario) -> FeatureVector {
        FeatureVector::from_scenario(scenario, &self.defaults)
    }

    /// Expected footfall; a closed gym is 0 without consulting the model.
    pub fn predict(&self, scenario: &Scenario) -> Result<i64, PulseError> {
        if !scenario.is_open {
            return Ok(0);
        }
        let skew = unrepresented_in(scenario);
        if !skew.is_empty() {
            warn!(categories = ?skew, "scenario uses categories the model has no feature for");
        }
        let score = self.model.score(&self.features(scenario))?;
        if !score.is_finite() {
            return Err(PulseError::Validation(format!("model returned {score}")));
        }
        debug!(score, weekday = %scenario.weekday, "scored scenario");
        Ok((score.round() as i64).max(0))
    }

    /// Predict the scenario on every day of the week.
    pub fn weekly_forecast(&self, scenario: &Scenario) -> Result<WeeklyForecast, PulseError> {
        let days = WEEK
            .iter()
            .map(|&day| Ok((day, self.predict(&scenario.on(day))?)))
            .collect::<Result<Vec<_>, PulseError>>()?;
        Ok(WeeklyForecast {
            days,
            selected: scenario.weekday,
        })
    }
}

pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyForecast {
    pub days: Vec<(Weekday, i64)>,
    pub selected: Weekday,
}

impl WeeklyForecast {
    pub fn footfall_on(&self, day: Weekday) -> Option<i64> {
        self.days.iter().find(|(d, _)| *d == day).map(|(_, f)| *f)
    }

    pub fn peak(&self) -> Option<(Weekday, i64)> {
        self.days.iter().copied().max_by_key(|(_, f)| *f)
    }

    pub fn to_frame(&self) -> Result<DataFrame, PulseError> {
        let labels: Vec<&str> = self.days.iter().map(|(d, _)| weekday_label(*d)).collect();
        let values: Vec<i64> = self.days.iter().map(|(_, f)| *f).collect();
        Ok(DataFrame::new(vec![
            Column::new(forecast::DAY.into(), labels),
            Column::new(forecast::FOOTFALL.into(), values),
        ])?)
    }
}

/// Crowding band for a predicted footfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficLevel {
    Low,
    Moderate,
    High,
}

impl TrafficLevel {
    pub fn classify(footfall: i64) -> Self {
        if footfall > 100 {
            TrafficLevel::High
        } else if footfall > 50 {
            TrafficLevel::Moderate
        } else {
            TrafficLevel::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrafficLevel::Low => "Low",
            TrafficLevel::Moderate => "Moderate",
            TrafficLevel::High => "High",
        }
    }
}

impl fmt::Display for TrafficLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Traffic", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Linear in population and adoption, penalizes Sundays, counts calls.
    struct Probe {
        calls: Arc<AtomicUsize>,
    }

    impl Regressor for Probe {
        fn score(&self, fv: &FeatureVector) -> Result<f64, PulseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let pop = fv.get("active_student_population").unwrap_or(0.0);
            let adopt = fv.get("gym_adoption_ratio").unwrap_or(0.0);
            let sunday = fv.get("is_sunday").unwrap_or(0.0);
            Ok(pop * adopt - 200.0 - 150.0 * sunday + 0.4)
        }

        fn describe(&self) -> String {
            "probe".into()
        }
    }

    fn predictor() -> (ScenarioPredictor, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let model = Probe {
            calls: Arc::clone(&calls),
        };
        (ScenarioPredictor::new(Box::new(model)), calls)
    }

    fn scenario(open: bool) -> Scenario {
        Scenario::from_inputs(2, 5, 500, 2, 3, "None", "Normal", "None", false, open).unwrap()
    }

    #[test]
    fn closed_gym_short_circuits() {
        let (p, calls) = predictor();
        assert_eq!(p.predict(&scenario(false)).unwrap(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn open_gym_rounds_score() {
        let (p, calls) = predictor();
        // 500 * 0.6 - 200 + 0.4 = 100.4
        assert_eq!(p.predict(&scenario(true)).unwrap(), 100);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn negative_scores_clamp_to_zero() {
        let (p, _) = predictor();
        let small = Scenario {
            population: 100,
            ..scenario(true)
        };
        assert_eq!(p.predict(&small).unwrap(), 0);
    }

    #[test]
    fn weekly_forecast_covers_seven_days() {
        let (p, calls) = predictor();
        let week = p.weekly_forecast(&scenario(true)).unwrap();
        assert_eq!(week.days.len(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 7);
        assert_eq!(week.selected, Weekday::Wed);
        assert_eq!(week.footfall_on(Weekday::Mon), Some(100));
        assert_eq!(week.footfall_on(Weekday::Sun), Some(0));
        assert_eq!(week.peak().map(|(_, f)| f), Some(100));

        let frame = week.to_frame().unwrap();
        assert_eq!(frame.shape(), (7, 2));
        let days = frame.column(forecast::DAY).unwrap().str().unwrap();
        assert_eq!(days.get(0), Some("Mon"));
        assert_eq!(days.get(6), Some("Sun"));
    }

    #[test]
    fn closed_week_is_all_zero() {
        let (p, calls) = predictor();
        let week = p.weekly_forecast(&scenario(false)).unwrap();
        assert!(week.days.iter().all(|(_, f)| *f == 0));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn traffic_levels() {
        assert_eq!(TrafficLevel::classify(0), TrafficLevel::Low);
        assert_eq!(TrafficLevel::classify(50), TrafficLevel::Low);
        assert_eq!(TrafficLevel::classify(51), TrafficLevel::Moderate);
        assert_eq!(TrafficLevel::classify(100), TrafficLevel::Moderate);
        assert_eq!(TrafficLevel::classify(101), TrafficLevel::High);
        assert_eq!(TrafficLevel::High.to_string(), "High Traffic");
    }

    #[test]
    fn reference_scenario_through_json_artifact() {
        let artifact = r#"{
            "model": {
                "type": "linear",
                "intercept": -30.0,
                "coefficients": {
                    "active_student_population": 0.2,
                    "academic_load_index": -40.0,
                    "exam_phase_none": 15.0,
                    "weather_condition_normal": 5.0
                }
            }
        }"#;
        let p = ScenarioPredictor::new(crate::model::model_from_json(artifact).unwrap());
        // -30 + 100 - 12 + 15 + 5
        assert_eq!(p.predict(&scenario(true)).unwrap(), 78);
        assert_eq!(p.predict(&scenario(false)).unwrap(), 0);
        assert_eq!(TrafficLevel::classify(78), TrafficLevel::Moderate);
    }

    #[test]
    fn non_finite_scores_are_errors() {
        struct Broken;
        impl Regressor for Broken {
            fn score(&self, _: &FeatureVector) -> Result<f64, PulseError> {
                Ok(f64::NAN)
            }
            fn describe(&self) -> String {
                "broken".into()
            }
        }
        let p = ScenarioPredictor::new(Box::new(Broken));
        assert!(matches!(p.predict(&scenario(true)), Err(PulseError::Validation(_))));
    }
}
