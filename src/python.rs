use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use pyo3_polars::PyDataFrame;

use crate::audit::{audit_frame, AuditRules};
use crate::config::{GeneratorConfig, DEFAULT_END_DATE, DEFAULT_START_DATE};
use crate::features::{weekday_from_index, Scenario};
use crate::generator::{write_dataset, FootfallGenerator};
use crate::impacts::{impact_breakdown, impacts_frame};
use crate::predictor::{ScenarioPredictor, TrafficLevel};

#[pyclass(name = "FootfallGenerator")]
pub struct PyFootfallGenerator {
    inner: FootfallGenerator,
}

#[pymethods]
impl PyFootfallGenerator {
    #[new]
    #[pyo3(signature = (
        start_date = None,
        end_date = None,
        seed = 42,
        base_capacity = 180,
        vacation_months = None,
        closed_weekday = 6,
    ))]
    fn new(
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        seed: u64,
        base_capacity: u32,
        vacation_months: Option<Vec<u32>>,
        closed_weekday: u32,
    ) -> PyResult<Self> {
        let mut config = GeneratorConfig::default()
            .with_date_range(
                start_date.unwrap_or(DEFAULT_START_DATE),
                end_date.unwrap_or(DEFAULT_END_DATE),
            )
            .with_seed(seed)
            .with_base_capacity(base_capacity)
            .with_closed_weekday(weekday_from_index(closed_weekday)?);
        if let Some(months) = vacation_months {
            config = config.with_vacation_months(months);
        }
        Ok(Self {
            inner: FootfallGenerator::new(config)?,
        })
    }

    // ── Generation ──────────────────────────────────────────────────────────

    /// Generate the full daily table.
    fn generate(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.generate()?))
    }

    /// Generate and write to `path` (CSV, or Parquet for `.parquet`).
    fn write(&self, path: PathBuf) -> PyResult<PyDataFrame> {
        let mut df = self.inner.generate()?;
        write_dataset(&mut df, &path)?;
        Ok(PyDataFrame(df))
    }

    // ── Properties ──────────────────────────────────────────────────────────

    #[getter]
    fn row_count(&self) -> usize {
        self.inner.config().row_count()
    }

    #[getter]
    fn seed(&self) -> u64 {
        self.inner.config().seed
    }

    fn __repr__(&self) -> String {
        let c = self.inner.config();
        format!(
            "FootfallGenerator(start_date={}, end_date={}, seed={}, base_capacity={})",
            c.start_date, c.end_date, c.seed, c.base_capacity
        )
    }
}

/// A dashboard scenario, validated on construction.
#[derive(Clone)]
#[pyclass(name = "Scenario")]
pub struct PyScenario {
    inner: Scenario,
}

#[pymethods]
impl PyScenario {
    #[new]
    #[pyo3(signature = (
        day,
        month,
        population = 500,
        stress = 2,
        adoption = 3,
        exam_phase = "None",
        weather = "Normal",
        maintenance = "None",
        is_vacation = false,
        is_open = true,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        day: u32,
        month: u32,
        population: i64,
        stress: i64,
        adoption: i64,
        exam_phase: &str,
        weather: &str,
        maintenance: &str,
        is_vacation: bool,
        is_open: bool,
    ) -> PyResult<Self> {
        let inner = Scenario::from_inputs(
            day,
            month,
            population,
            stress,
            adoption,
            exam_phase,
            weather,
            maintenance,
            is_vacation,
            is_open,
        )?;
        Ok(Self { inner })
    }

    fn __repr__(&self) -> String {
        let s = &self.inner;
        format!(
            "Scenario(day={}, month={}, population={}, stress={}, adoption={}, exam_phase={}, \
             weather={}, maintenance={}, is_vacation={}, is_open={})",
            s.weekday,
            s.month,
            s.population,
            s.stress.value(),
            s.adoption.value(),
            s.exam_phase,
            s.weather,
            s.maintenance,
            s.is_vacation,
            s.is_open
        )
    }
}

#[pyclass(name = "ScenarioPredictor")]
pub struct PyScenarioPredictor {
    inner: ScenarioPredictor,
}

#[pymethods]
impl PyScenarioPredictor {
    /// Load a model artifact; a missing or unrecognized file raises.
    #[new]
    fn new(model_path: PathBuf) -> PyResult<Self> {
        Ok(Self {
            inner: ScenarioPredictor::from_artifact(&model_path)?,
        })
    }

    /// Predicted footfall for one day.
    fn predict(&self, scenario: &PyScenario) -> PyResult<i64> {
        Ok(self.inner.predict(&scenario.inner)?)
    }

    /// Prediction for each weekday, Mon..Sun, as a `Day, Footfall` frame.
    fn weekly_forecast(&self, scenario: &PyScenario) -> PyResult<PyDataFrame> {
        let forecast = self.inner.weekly_forecast(&scenario.inner)?;
        Ok(PyDataFrame(forecast.to_frame()?))
    }

    /// The named model inputs the scenario maps to.
    fn feature_vector(&self, scenario: &PyScenario) -> BTreeMap<String, f64> {
        self.inner.features(&scenario.inner).to_map()
    }

    /// Heuristic contributing-factor breakdown as a `Factor, Value` frame.
    #[staticmethod]
    fn impacts(scenario: &PyScenario) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(impacts_frame(&impact_breakdown(&scenario.inner))?))
    }

    #[staticmethod]
    fn traffic_level(footfall: i64) -> &'static str {
        TrafficLevel::classify(footfall).label()
    }

    #[getter]
    fn model(&self) -> String {
        self.inner.model_description()
    }
}

/// Check a footfall table against the generator's invariants.
///
/// `vacation_months` and `closed_weekday` (0 = Monday .. 6 = Sunday) must
/// match the generator settings; they default to the stock ones.
/// Returns a dict mapping each check name to its violation count.
#[pyfunction]
#[pyo3(signature = (df, vacation_months = None, closed_weekday = None))]
pub fn audit_dataset(
    py: Python<'_>,
    df: PyDataFrame,
    vacation_months: Option<Vec<u32>>,
    closed_weekday: Option<u32>,
) -> PyResult<Py<PyDict>> {
    let mut rules = AuditRules::default();
    if let Some(months) = vacation_months {
        rules.vacation_months = months;
    }
    if let Some(day) = closed_weekday {
        rules.closed_weekday = weekday_from_index(day)?;
    }
    let report = audit_frame(&df.0, &rules)?;
    let dict = PyDict::new(py);
    for check in &report.checks {
        dict.set_item(check.name, check.violations)?;
    }
    Ok(dict.unbind())
}
