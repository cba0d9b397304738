//! Fitted Risk Classifiers

use crate::tree::{DecisionTree, TreeParams};
use crate::Row;
use feature_schema::FEATURE_DIMENSION;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Binary classifier producing `[p_negative, p_positive]`
pub trait Classifier: Debug + Send + Sync {
    /// Class probabilities for a scaled row
    fn predict_probability(&self, row: &Row) -> [f64; 2];

    /// Artifact kind, as written in the interchange document
    fn kind(&self) -> &'static str;
}

/// Tree ensemble flavour, recorded for reporting only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsembleKind {
    ExtraTrees,
    RandomForest,
}

/// Exported ensemble parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsembleParams {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<TreeParams>,
}

/// Averaging ensemble of decision trees
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    kind: EnsembleKind,
    trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    /// Validate exported parameters and build every tree
    pub fn from_params(kind: EnsembleKind, params: &TreeEnsembleParams) -> Result<Self, String> {
        if params.n_features != FEATURE_DIMENSION {
            return Err(format!(
                "model expects {} features, schema defines {FEATURE_DIMENSION}",
                params.n_features
            ));
        }
        if params.n_classes != 2 {
            return Err(format!(
                "model has {} classes, binary risk needs 2",
                params.n_classes
            ));
        }
        if params.trees.is_empty() {
            return Err("ensemble has no trees".to_string());
        }

        let trees = params
            .trees
            .iter()
            .enumerate()
            .map(|(i, t)| DecisionTree::from_params(t).map_err(|e| format!("tree {i}: {e}")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { kind, trees })
    }

    pub fn ensemble_kind(&self) -> EnsembleKind {
        self.kind
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for TreeEnsemble {
    fn predict_probability(&self, row: &Row) -> [f64; 2] {
        let mut sum = [0.0; 2];
        for tree in &self.trees {
            let [neg, pos] = tree.predict_proba(row);
            sum[0] += neg;
            sum[1] += pos;
        }
        let n = self.trees.len() as f64;
        [sum[0] / n, sum[1] / n]
    }

    fn kind(&self) -> &'static str {
        match self.kind {
            EnsembleKind::ExtraTrees => "extra_trees",
            EnsembleKind::RandomForest => "random_forest",
        }
    }
}

/// Linear model with logistic link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, String> {
        if coefficients.len() != FEATURE_DIMENSION {
            return Err(format!(
                "model has {} coefficients, schema defines {FEATURE_DIMENSION} features",
                coefficients.len()
            ));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err("model parameters must be finite".to_string());
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }
}

impl Classifier for LogisticRegression {
    fn predict_probability(&self, row: &Row) -> [f64; 2] {
        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(row.iter())
                .map(|(w, x)| w * x)
                .sum::<f64>();
        let pos = 1.0 / (1.0 + (-z).exp());
        [1.0 - pos, pos]
    }

    fn kind(&self) -> &'static str {
        "logistic_regression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::LEAF;
    use proptest::prelude::*;

    fn leaf(neg: f64, pos: f64) -> TreeParams {
        TreeParams {
            children_left: vec![LEAF],
            children_right: vec![LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![vec![neg, pos]],
        }
    }

    fn ensemble(trees: Vec<TreeParams>) -> TreeEnsembleParams {
        TreeEnsembleParams {
            n_features: FEATURE_DIMENSION,
            n_classes: 2,
            trees,
        }
    }

    #[test]
    fn test_ensemble_averages_trees() {
        let model = TreeEnsemble::from_params(
            EnsembleKind::ExtraTrees,
            &ensemble(vec![leaf(1.0, 3.0), leaf(3.0, 1.0), leaf(0.0, 2.0)]),
        )
        .unwrap();
        let [neg, pos] = model.predict_probability(&[0.0; FEATURE_DIMENSION]);
        assert!((pos - 2.0 / 3.0).abs() < 1e-12);
        assert!((neg - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(model.kind(), "extra_trees");
        assert_eq!(model.n_trees(), 3);
    }

    #[test]
    fn test_ensemble_rejects_wrong_dimension() {
        let mut params = ensemble(vec![leaf(1.0, 1.0)]);
        params.n_features = 30;
        let err = TreeEnsemble::from_params(EnsembleKind::RandomForest, &params).unwrap_err();
        assert!(err.contains("30 features"));
    }

    #[test]
    fn test_ensemble_rejects_multiclass() {
        let mut params = ensemble(vec![leaf(1.0, 1.0)]);
        params.n_classes = 3;
        assert!(TreeEnsemble::from_params(EnsembleKind::ExtraTrees, &params).is_err());
    }

    #[test]
    fn test_ensemble_reports_bad_tree_index() {
        let params = ensemble(vec![leaf(1.0, 1.0), leaf(0.0, 0.0)]);
        let err = TreeEnsemble::from_params(EnsembleKind::ExtraTrees, &params).unwrap_err();
        assert!(err.starts_with("tree 1:"));
    }

    #[test]
    fn test_logistic_at_zero_is_half() {
        let model = LogisticRegression::new(vec![0.3; FEATURE_DIMENSION], 0.0).unwrap();
        let [neg, pos] = model.predict_probability(&[0.0; FEATURE_DIMENSION]);
        assert_eq!(pos, 0.5);
        assert_eq!(neg, 0.5);
    }

    #[test]
    fn test_logistic_rejects_short_coefficients() {
        assert!(LogisticRegression::new(vec![0.1; 10], 0.0).is_err());
    }

    proptest! {
        #[test]
        fn prop_logistic_probability_in_unit_interval(
            x in proptest::collection::vec(-50.0f64..50.0, FEATURE_DIMENSION),
            intercept in -10.0f64..10.0,
        ) {
            let model = LogisticRegression::new(vec![0.25; FEATURE_DIMENSION], intercept).unwrap();
            let mut row = [0.0; FEATURE_DIMENSION];
            row.copy_from_slice(&x);
            let [neg, pos] = model.predict_probability(&row);
            prop_assert!((0.0..=1.0).contains(&pos));
            prop_assert!((0.0..=1.0).contains(&neg));
        }
    }
}
