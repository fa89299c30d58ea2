#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::PyModule;

pub mod audit;
pub mod calendar;
pub mod categories;
pub mod config;
pub mod demand;
pub mod error;
pub mod features;
pub mod generator;
pub mod impacts;
pub mod model;
pub mod predictor;
pub mod sampler;
pub mod schema;

#[cfg(feature = "python")]
mod pickle;
#[cfg(feature = "python")]
mod python;

pub use error::PulseError;

/// Export schema constants as Python submodules
#[cfg(feature = "python")]
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Dataset columns
    let columns = PyModule::new(m.py(), "columns")?;
    for name in schema::columns::ALL {
        columns.add(name.to_ascii_uppercase(), name)?;
    }
    columns.add("ALL", schema::columns::ALL.to_vec())?;
    m.add_submodule(&columns)?;

    // Model features
    let features = PyModule::new(m.py(), "features")?;
    for name in schema::features::ALL {
        features.add(name.to_ascii_uppercase(), name)?;
    }
    features.add("ALL", schema::features::ALL.to_vec())?;
    features.add(
        "UNREPRESENTED_CATEGORIES",
        crate::features::unrepresented_categories(),
    )?;
    m.add_submodule(&features)?;

    Ok(())
}

#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyFootfallGenerator>()?;
    m.add_class::<python::PyScenario>()?;
    m.add_class::<python::PyScenarioPredictor>()?;
    m.add_function(wrap_pyfunction!(python::audit_dataset, m)?)?;
    add_schema_exports(m)?;
    Ok(())
}
