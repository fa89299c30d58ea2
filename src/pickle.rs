//! joblib-pickled estimators, scored through the embedded interpreter.

use std::path::Path;

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use tracing::warn;

use crate::error::PulseError;
use crate::features::FeatureVector;
use crate::model::{Regressor, WRAPPED_MODEL_KEY};
use crate::schema::features;

pub struct PickledModel {
    estimator: PyObject,
    class_name: String,
}

impl PickledModel {
    pub fn load(path: &Path) -> Result<Self, PulseError> {
        let path_str = path.display().to_string();
        // No-op inside an extension module; starts the interpreter for the CLI.
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let loaded = py
                .import("joblib")
                .and_then(|joblib| joblib.call_method1("load", (path_str.as_str(),)))
                .map_err(|e| PulseError::ModelUnavailable {
                    path: path_str.clone(),
                    reason: e.to_string(),
                })?;
            let estimator = normalize(&loaded)?;
            let class_name = estimator.get_type().name()?.to_string();
            Ok(Self {
                estimator: estimator.unbind(),
                class_name,
            })
        })
    }
}

/// Accept a bare estimator or a dict holding one under `"model"`.
fn normalize<'py>(loaded: &Bound<'py, PyAny>) -> Result<Bound<'py, PyAny>, PulseError> {
    if let Ok(dict) = loaded.downcast::<PyDict>() {
        return match dict.get_item(WRAPPED_MODEL_KEY)? {
            Some(inner) if inner.hasattr("predict")? => {
                warn!("model artifact is wrapped; using its '{WRAPPED_MODEL_KEY}' entry");
                Ok(inner)
            }
            _ => Err(PulseError::UnrecognizedArtifact(format!(
                "dict artifact has no '{WRAPPED_MODEL_KEY}' entry with a predict method"
            ))),
        };
    }
    if loaded.hasattr("predict")? {
        return Ok(loaded.clone());
    }
    Err(PulseError::UnrecognizedArtifact(format!(
        "{} object has no predict method",
        loaded.get_type().name()?
    )))
}

impl Regressor for PickledModel {
    fn score(&self, fv: &FeatureVector) -> Result<f64, PulseError> {
        Python::with_gil(|py| {
            let row = PyDict::new(py);
            for (name, value) in fv.iter() {
                row.set_item(name, value)?;
            }
            // Named columns in fitted order, so estimators that check names accept it.
            let frame = py
                .import("pandas")?
                .call_method1("DataFrame", (PyList::new(py, [row])?,))?
                .get_item(PyList::new(py, features::ALL)?)?;
            let prediction = self.estimator.bind(py).call_method1("predict", (frame,))?;
            Ok(prediction.get_item(0)?.extract::<f64>()?)
        })
    }

    fn describe(&self) -> String {
        format!("pickled {}", self.class_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::load_model;

    #[test]
    fn unreadable_pickle_is_unavailable_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final_gym_footfall_model.pkl");
        std::fs::write(&path, b"not really a pickle").unwrap();
        assert!(matches!(
            PickledModel::load(&path),
            Err(PulseError::ModelUnavailable { .. })
        ));
        assert!(matches!(load_model(&path), Err(PulseError::ModelUnavailable { .. })));
    }
}
