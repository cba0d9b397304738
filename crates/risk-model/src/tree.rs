//! Decision Tree Evaluation
//!
//! Trees are exported as parallel node arrays. Node `i` is a leaf when
//! `children_left[i] == -1`; otherwise a row goes left when
//! `row[feature[i]] <= threshold[i]`.
//!
//! Split values are compared after rounding to `f32`, the precision the
//! trees were fitted and are evaluated at, so inputs within `f32` rounding of
//! a threshold take the same branch as in the fitted model.

use crate::Row;
use feature_schema::FEATURE_DIMENSION;
use serde::{Deserialize, Serialize};

/// Sentinel child index marking a leaf
pub const LEAF: i64 = -1;

/// Exported tree in parallel-array form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights `[negative, positive]`
    pub value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        proba: [f64; 2],
    },
}

/// Validated binary decision tree
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Validate exported arrays and build the tree
    pub fn from_params(params: &TreeParams) -> Result<Self, String> {
        let n = params.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if params.children_right.len() != n
            || params.feature.len() != n
            || params.threshold.len() != n
            || params.value.len() != n
        {
            return Err(format!("tree node arrays disagree in length (expected {n})"));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let left = params.children_left[i];
            let right = params.children_right[i];

            if left == LEAF {
                if right != LEAF {
                    return Err(format!("node {i} has only one child"));
                }
                nodes.push(Node::Leaf {
                    proba: normalize_leaf(i, &params.value[i])?,
                });
                continue;
            }

            // children always follow their parent, so traversal terminates
            let child = |c: i64| -> Result<usize, String> {
                match usize::try_from(c) {
                    Ok(c) if c > i && c < n => Ok(c),
                    _ => Err(format!("node {i} has invalid child index {c}")),
                }
            };
            let feature = match usize::try_from(params.feature[i]) {
                Ok(f) if f < FEATURE_DIMENSION => f,
                _ => {
                    return Err(format!(
                        "node {i} splits on feature {} outside 0..{FEATURE_DIMENSION}",
                        params.feature[i]
                    ))
                }
            };
            let threshold = params.threshold[i];
            if !threshold.is_finite() {
                return Err(format!("node {i} has a non-finite threshold"));
            }

            nodes.push(Node::Split {
                feature,
                threshold,
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    /// Class probabilities of the leaf `row` falls into
    pub fn predict_proba(&self, row: &Row) -> [f64; 2] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { proba } => return *proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if f64::from(row[*feature] as f32) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

fn normalize_leaf(node: usize, value: &[f64]) -> Result<[f64; 2], String> {
    let [neg, pos] = match value {
        [neg, pos] => [*neg, *pos],
        _ => {
            return Err(format!(
                "leaf {node} has {} class weights, expected 2",
                value.len()
            ))
        }
    };
    let total = neg + pos;
    if !(neg >= 0.0 && pos >= 0.0 && total > 0.0 && total.is_finite()) {
        return Err(format!("leaf {node} has invalid class weights [{neg}, {pos}]"));
    }
    Ok([neg / total, pos / total])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: i64, threshold: f64) -> TreeParams {
        TreeParams {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![vec![10.0, 10.0], vec![8.0, 2.0], vec![1.0, 3.0]],
        }
    }

    #[test]
    fn test_stump_routes_by_threshold() {
        let tree = DecisionTree::from_params(&stump(26, 0.5)).unwrap();
        let mut row = [0.0; FEATURE_DIMENSION];

        row[26] = 0.5;
        assert_eq!(tree.predict_proba(&row), [0.8, 0.2]);

        row[26] = 0.51;
        assert_eq!(tree.predict_proba(&row), [0.25, 0.75]);
    }

    #[test]
    fn test_split_compares_at_f32_precision() {
        let tree = DecisionTree::from_params(&stump(0, 0.5)).unwrap();
        let mut row = [0.0; FEATURE_DIMENSION];

        // rounds onto the threshold in f32
        row[0] = 0.500_000_01;
        assert_eq!(f64::from(row[0] as f32), 0.5);
        assert_eq!(tree.predict_proba(&row), [0.8, 0.2]);

        // stays above the threshold in f32
        row[0] = 0.500_000_1;
        assert!(f64::from(row[0] as f32) > 0.5);
        assert_eq!(tree.predict_proba(&row), [0.25, 0.75]);
    }

    #[test]
    fn test_single_leaf_tree() {
        let params = TreeParams {
            children_left: vec![LEAF],
            children_right: vec![LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![vec![0.6, 0.4]],
        };
        let tree = DecisionTree::from_params(&params).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_proba(&[0.0; FEATURE_DIMENSION]), [0.6, 0.4]);
    }

    #[test]
    fn test_rejects_feature_out_of_range() {
        let err = DecisionTree::from_params(&stump(28, 0.0)).unwrap_err();
        assert!(err.contains("feature 28"));
    }

    #[test]
    fn test_rejects_backward_child() {
        let mut params = stump(0, 0.0);
        params.children_left[0] = 0;
        assert!(DecisionTree::from_params(&params).is_err());
    }

    #[test]
    fn test_rejects_empty_leaf() {
        let mut params = stump(0, 0.0);
        params.value[1] = vec![0.0, 0.0];
        let err = DecisionTree::from_params(&params).unwrap_err();
        assert!(err.contains("leaf 1"));
    }

    #[test]
    fn test_rejects_multiclass_leaf() {
        let mut params = stump(0, 0.0);
        params.value[2] = vec![1.0, 1.0, 1.0];
        assert!(DecisionTree::from_params(&params).is_err());
    }

    #[test]
    fn test_rejects_ragged_arrays() {
        let mut params = stump(0, 0.0);
        params.threshold.pop();
        assert!(DecisionTree::from_params(&params).is_err());
    }
}
