use crate::categories::{ExamPhase, MaintenanceSeverity, WeatherCondition};

/// Inputs that shape one day's demand.
#[derive(Debug, Clone, Copy)]
pub struct DemandInputs {
    pub population: i64,
    pub adoption_ratio: f64,
    pub exam_phase: ExamPhase,
    pub weather: WeatherCondition,
    pub event_boost: f64,
    pub academic_load: f64,
}

/// Combines multipliers into demand and caps it by capacity.
#[derive(Debug, Clone, Copy)]
pub struct DemandComposer {
    pub base_capacity: u32,
    pub academic_load_penalty: f64,
}

impl DemandComposer {
    pub fn new(base_capacity: u32, academic_load_penalty: f64) -> Self {
        Self {
            base_capacity,
            academic_load_penalty,
        }
    }

    pub fn base_demand(&self, inputs: &DemandInputs) -> f64 {
        inputs.population as f64 * inputs.adoption_ratio
    }

    /// Noise-free demand.
    pub fn raw_demand(&self, inputs: &DemandInputs) -> f64 {
        self.base_demand(inputs)
            * inputs.exam_phase.intensity()
            * inputs.weather.impact_factor()
            * inputs.event_boost
            * (1.0 - self.academic_load_penalty * inputs.academic_load)
    }

    /// Base capacity scaled by equipment availability, truncated.
    pub fn effective_capacity(&self, severity: MaintenanceSeverity) -> i64 {
        (f64::from(self.base_capacity) * severity.availability_ratio()) as i64
    }

    /// Closed days see nobody; open days see the smaller of demand and
    /// capacity, truncated and never negative.
    pub fn footfall(&self, is_open: bool, noisy_demand: f64, capacity: i64) -> i64 {
        if !is_open {
            return 0;
        }
        if noisy_demand.is_nan() {
            return 0;
        }
        (noisy_demand.min(capacity as f64) as i64).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> DemandInputs {
        DemandInputs {
            population: 200,
            adoption_ratio: 0.5,
            exam_phase: ExamPhase::None,
            weather: WeatherCondition::Normal,
            event_boost: 1.0,
            academic_load: 0.0,
        }
    }

    #[test]
    fn demand_is_product_of_multipliers() {
        let composer = DemandComposer::new(180, 0.4);
        assert_eq!(composer.raw_demand(&inputs()), 100.0);

        let busy = DemandInputs {
            exam_phase: ExamPhase::Endterm,
            weather: WeatherCondition::HeavyRain,
            academic_load: 0.5,
            ..inputs()
        };
        let expected = 100.0 * 0.55 * 0.80 * (1.0 - 0.2);
        assert!((composer.raw_demand(&busy) - expected).abs() < 1e-9);
    }

    #[test]
    fn capacity_follows_severity() {
        let composer = DemandComposer::new(180, 0.4);
        assert_eq!(composer.effective_capacity(MaintenanceSeverity::None), 180);
        assert_eq!(composer.effective_capacity(MaintenanceSeverity::Low), 162);
        assert_eq!(composer.effective_capacity(MaintenanceSeverity::Medium), 144);
        assert_eq!(composer.effective_capacity(MaintenanceSeverity::High), 117);
    }

    #[test]
    fn footfall_is_capped_floored_and_zero_when_closed() {
        let composer = DemandComposer::new(180, 0.4);
        assert_eq!(composer.footfall(false, 120.0, 180), 0);
        assert_eq!(composer.footfall(true, 120.7, 180), 120);
        assert_eq!(composer.footfall(true, 250.0, 144), 144);
        assert_eq!(composer.footfall(true, -3.2, 180), 0);
        assert_eq!(composer.footfall(true, f64::NAN, 180), 0);
    }
}
