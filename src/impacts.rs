use polars::prelude::*;

use crate::categories::{ExamPhase, WeatherCondition};
use crate::error::PulseError;
use crate::features::Scenario;
use crate::schema::impacts;

/// One bar of the contributing-factor chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Impact {
    pub factor: &'static str,
    pub value: i64,
}

/// Heuristic per-factor contributions for a scenario, smallest first.
/// Zero-valued factors are left out.
pub fn impact_breakdown(scenario: &Scenario) -> Vec<Impact> {
    let adopt = scenario.adoption.value();
    let stress = scenario.stress.value();
    let candidates = [
        ("Adoption", (adopt - 1) * 15),
        (
            "No Exams",
            if scenario.exam_phase == ExamPhase::None { 20 } else { 0 },
        ),
        (
            "Midterms",
            if scenario.exam_phase == ExamPhase::Midterm { 10 } else { 0 },
        ),
        ("Stress", -5 * stress),
        (
            "Bad Weather",
            if scenario.weather != WeatherCondition::Normal { -10 } else { 0 },
        ),
        ("Base", 20),
    ];
    let mut out: Vec<Impact> = candidates
        .into_iter()
        .filter(|(_, v)| *v != 0)
        .map(|(factor, value)| Impact { factor, value })
        .collect();
    out.sort_by_key(|i| i.value);
    out
}

pub fn impacts_frame(items: &[Impact]) -> Result<DataFrame, PulseError> {
    let factors: Vec<&str> = items.iter().map(|i| i.factor).collect();
    let values: Vec<i64> = items.iter().map(|i| i.value).collect();
    Ok(DataFrame::new(vec![
        Column::new(impacts::FACTOR.into(), factors),
        Column::new(impacts::VALUE.into(), values),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors(s: &Scenario) -> Vec<(&'static str, i64)> {
        impact_breakdown(s).into_iter().map(|i| (i.factor, i.value)).collect()
    }

    #[test]
    fn calm_scenario() {
        let s = Scenario::from_inputs(2, 5, 500, 2, 3, "None", "Normal", "None", false, true)
            .unwrap();
        assert_eq!(
            factors(&s),
            vec![("Stress", -10), ("No Exams", 20), ("Base", 20), ("Adoption", 30)]
        );
    }

    #[test]
    fn stressed_midterm_in_rain() {
        let s = Scenario::from_inputs(0, 7, 500, 5, 1, "Midterm", "Heavy Rain", "Low", false, true)
            .unwrap();
        let got = factors(&s);
        assert_eq!(got[0], ("Stress", -25));
        assert_eq!(got[1], ("Bad Weather", -10));
        assert!(got.contains(&("Midterms", 10)));
        assert!(!got.iter().any(|(f, _)| *f == "Adoption" || *f == "No Exams"));
        assert!(got.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn frame_shape() {
        let s = Scenario::from_inputs(2, 5, 500, 2, 3, "None", "Normal", "None", false, true)
            .unwrap();
        let df = impacts_frame(&impact_breakdown(&s)).unwrap();
        assert_eq!(df.shape(), (4, 2));
    }
}
