//! Pre-trained model artifacts behind one scoring interface.
//!
//! An artifact is either the estimator itself or a wrapper holding it
//! under `"model"`. Both shapes normalize to a `Box<dyn Regressor>`;
//! anything else fails at load time.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::PulseError;
use crate::features::FeatureVector;
use crate::schema::features;

/// Key a wrapped artifact stores its estimator under.
pub const WRAPPED_MODEL_KEY: &str = "model";

pub trait Regressor: Send + Sync {
    fn score(&self, features: &FeatureVector) -> Result<f64, PulseError>;

    fn describe(&self) -> String;
}

fn feature_index(name: &str) -> Result<usize, PulseError> {
    features::ALL
        .iter()
        .position(|f| *f == name)
        .ok_or_else(|| PulseError::MissingFeature(name.to_string()))
}

// ── Linear ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct LinearSpec {
    intercept: f64,
    coefficients: BTreeMap<String, f64>,
}

/// `intercept + sum(coef * feature)`; features without a coefficient weigh 0.
#[derive(Debug, Clone)]
pub struct LinearModel {
    intercept: f64,
    weights: [f64; 20],
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: &BTreeMap<String, f64>) -> Result<Self, PulseError> {
        let mut weights = [0.0; 20];
        for (name, coef) in coefficients {
            weights[feature_index(name)?] = *coef;
        }
        Ok(Self { intercept, weights })
    }
}

impl Regressor for LinearModel {
    fn score(&self, features: &FeatureVector) -> Result<f64, PulseError> {
        Ok(self.intercept
            + features
                .values()
                .iter()
                .zip(&self.weights)
                .map(|(x, w)| x * w)
                .sum::<f64>())
    }

    fn describe(&self) -> String {
        let used = self.weights.iter().filter(|w| **w != 0.0).count();
        format!("linear model ({used} weighted features)")
    }
}

// ── Tree ensemble ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NodeSpec {
    Split {
        feature: String,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct TreeSpec {
    nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
struct EnsembleSpec {
    trees: Vec<TreeSpec>,
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// Regression tree; node 0 is the root. Samples go left when `x <= threshold`.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    fn from_spec(spec: &TreeSpec) -> Result<Self, PulseError> {
        if spec.nodes.is_empty() {
            return Err(PulseError::UnrecognizedArtifact("tree has no nodes".into()));
        }
        let n = spec.nodes.len();
        let nodes = spec
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| match node {
                NodeSpec::Leaf { value } => Ok(Node::Leaf(*value)),
                NodeSpec::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // Children must point forward so evaluation always terminates.
                    if *left <= i || *right <= i || *left >= n || *right >= n {
                        return Err(PulseError::UnrecognizedArtifact(format!(
                            "node {i} has invalid children ({left}, {right})"
                        )));
                    }
                    Ok(Node::Split {
                        feature: feature_index(feature)?,
                        threshold: *threshold,
                        left: *left,
                        right: *right,
                    })
                }
            })
            .collect::<Result<Vec<_>, PulseError>>()?;
        Ok(Self { nodes })
    }

    fn predict(&self, x: &[f64; 20]) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                Node::Leaf(v) => return v,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    i = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Mean of its trees, as a random-forest regressor scores.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<RegressionTree>,
}

impl TreeEnsemble {
    fn from_spec(spec: &EnsembleSpec) -> Result<Self, PulseError> {
        if spec.trees.is_empty() {
            return Err(PulseError::UnrecognizedArtifact("ensemble has no trees".into()));
        }
        let trees = spec
            .trees
            .iter()
            .map(RegressionTree::from_spec)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { trees })
    }
}

impl Regressor for TreeEnsemble {
    fn score(&self, features: &FeatureVector) -> Result<f64, PulseError> {
        let x = features.values();
        let total: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        Ok(total / self.trees.len() as f64)
    }

    fn describe(&self) -> String {
        format!("tree ensemble ({} trees)", self.trees.len())
    }
}

// ── Loading ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ModelSpec {
    Linear(LinearSpec),
    TreeEnsemble(EnsembleSpec),
}

impl ModelSpec {
    fn build(self) -> Result<Box<dyn Regressor>, PulseError> {
        Ok(match self {
            ModelSpec::Linear(spec) => {
                Box::new(LinearModel::new(spec.intercept, &spec.coefficients)?)
            }
            ModelSpec::TreeEnsemble(spec) => Box::new(TreeEnsemble::from_spec(&spec)?),
        })
    }
}

/// Pick the estimator out of either artifact shape.
fn unwrap_artifact(value: Value) -> Result<Value, PulseError> {
    match value {
        Value::Object(mut map) => {
            if let Some(inner) = map.remove(WRAPPED_MODEL_KEY) {
                warn!("model artifact is wrapped; using its '{WRAPPED_MODEL_KEY}' entry");
                Ok(inner)
            } else if map.contains_key("type") {
                Ok(Value::Object(map))
            } else {
                Err(PulseError::UnrecognizedArtifact(format!(
                    "object has neither a '{WRAPPED_MODEL_KEY}' entry nor a model 'type'"
                )))
            }
        }
        other => Err(PulseError::UnrecognizedArtifact(format!(
            "expected a JSON object, found {}",
            match other {
                Value::Null => "null",
                Value::Bool(_) => "a boolean",
                Value::Number(_) => "a number",
                Value::String(_) => "a string",
                Value::Array(_) => "an array",
                Value::Object(_) => "an object",
            }
        ))),
    }
}

/// Parse a JSON artifact, bare or wrapped.
pub fn model_from_json(text: &str) -> Result<Box<dyn Regressor>, PulseError> {
    let value: Value = serde_json::from_str(text)?;
    let estimator = unwrap_artifact(value)?;
    let spec: ModelSpec = serde_json::from_value(estimator)
        .map_err(|e| PulseError::UnrecognizedArtifact(e.to_string()))?;
    spec.build()
}

fn is_pickle(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "pkl" | "pickle" | "joblib"))
}

/// Load an artifact from disk. Pickles need the `python` feature.
pub fn load_model(path: &Path) -> Result<Box<dyn Regressor>, PulseError> {
    let unavailable = |reason: String| PulseError::ModelUnavailable {
        path: path.display().to_string(),
        reason,
    };
    if !path.is_file() {
        return Err(unavailable("file not found".into()));
    }

    let model: Box<dyn Regressor> = if is_pickle(path) {
        load_pickle(path)?
    } else {
        let text = fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
        model_from_json(&text)?
    };
    info!(path = %path.display(), model = %model.describe(), "model loaded");
    Ok(model)
}

#[cfg(feature = "python")]
fn load_pickle(path: &Path) -> Result<Box<dyn Regressor>, PulseError> {
    Ok(Box::new(crate::pickle::PickledModel::load(path)?))
}

#[cfg(not(feature = "python"))]
fn load_pickle(path: &Path) -> Result<Box<dyn Regressor>, PulseError> {
    Err(PulseError::ModelUnavailable {
        path: path.display().to_string(),
        reason: "pickled artifacts require the `python` feature".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioDefaults;
    use crate::features::Scenario;

    fn vector() -> FeatureVector {
        let scenario =
            Scenario::from_inputs(2, 5, 500, 2, 3, "None", "Normal", "None", false, true).unwrap();
        FeatureVector::from_scenario(&scenario, &ScenarioDefaults::default())
    }

    const LINEAR: &str = r#"{
        "type": "linear",
        "intercept": 10.0,
        "coefficients": { "active_student_population": 0.1, "academic_load_index": -20.0 }
    }"#;

    #[test]
    fn linear_scores_weighted_sum() {
        let model = model_from_json(LINEAR).unwrap();
        let score = model.score(&vector()).unwrap();
        assert!((score - (10.0 + 50.0 - 6.0)).abs() < 1e-9);
    }

    #[test]
    fn wrapped_and_bare_artifacts_agree() {
        let wrapped = format!(r#"{{ "model": {LINEAR}, "features": [] }}"#);
        let a = model_from_json(LINEAR).unwrap().score(&vector()).unwrap();
        let b = model_from_json(&wrapped).unwrap().score(&vector()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_unrecognized_shapes() {
        for text in [r#"{"weights": [1, 2]}"#, "[1, 2, 3]", "42", r#"{"type": "svm"}"#] {
            assert!(
                matches!(model_from_json(text), Err(PulseError::UnrecognizedArtifact(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn rejects_unknown_feature_names() {
        let text = r#"{"type": "linear", "intercept": 0.0,
                       "coefficients": {"weather_condition_cold_morning": 1.0}}"#;
        assert!(matches!(model_from_json(text), Err(PulseError::MissingFeature(_))));
    }

    #[test]
    fn tree_ensemble_averages_trees() {
        let text = r#"{
            "type": "tree_ensemble",
            "trees": [
                { "nodes": [
                    { "feature": "month", "threshold": 6.5, "left": 1, "right": 2 },
                    { "value": 40.0 },
                    { "value": 80.0 }
                ]},
                { "nodes": [ { "value": 60.0 } ] }
            ]
        }"#;
        let model = model_from_json(text).unwrap();
        // month = 5 goes left: (40 + 60) / 2
        assert_eq!(model.score(&vector()).unwrap(), 50.0);
        assert!(model.describe().contains("2 trees"));
    }

    #[test]
    fn rejects_backward_tree_links() {
        let text = r#"{"type": "tree_ensemble", "trees": [{ "nodes": [
            { "feature": "month", "threshold": 1.0, "left": 0, "right": 1 },
            { "value": 1.0 }
        ]}]}"#;
        assert!(matches!(model_from_json(text), Err(PulseError::UnrecognizedArtifact(_))));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model(&dir.path().join("final_gym_footfall_model.json"))
            .err()
            .unwrap();
        assert!(matches!(err, PulseError::ModelUnavailable { .. }));
    }

    #[test]
    fn loads_artifact_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, LINEAR).unwrap();
        let model = load_model(&path).unwrap();
        assert!(model.describe().starts_with("linear"));
    }

    #[cfg(not(feature = "python"))]
    #[test]
    fn pickles_need_python() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final_gym_footfall_model.pkl");
        fs::write(&path, b"not really a pickle").unwrap();
        assert!(matches!(load_model(&path), Err(PulseError::ModelUnavailable { .. })));
    }
}
