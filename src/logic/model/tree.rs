//! Isolation Tree - arena of nodes addressed by index
//!
//! Nodes are stored in pre-order: every child index is greater than its
//! parent's. `validate` relies on that to reject cyclic snapshots.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Euler–Mascheroni constant (harmonic number approximation)
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Expected path length of an unsuccessful BST search over `n` points, c(n)
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Depth ceiling ⌈log2 ψ⌉ for a subsample of size ψ
pub fn depth_ceiling(sample_size: usize) -> usize {
    if sample_size <= 1 {
        0
    } else {
        (sample_size as f64).log2().ceil() as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        split: f64,
        left: u32,
        right: u32,
    },
    Leaf {
        size: u32,
        depth: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    /// Build a tree over `rows` (indices into `data`)
    pub fn build<R: Rng>(
        data: &[Vec<f64>],
        mut rows: Vec<usize>,
        ceiling: usize,
        rng: &mut R,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(data, &mut rows, 0, ceiling, rng);
        tree
    }

    fn grow<R: Rng>(
        &mut self,
        data: &[Vec<f64>],
        rows: &mut [usize],
        depth: usize,
        ceiling: usize,
        rng: &mut R,
    ) -> u32 {
        let index = self.nodes.len() as u32;
        let leaf = Node::Leaf {
            size: rows.len() as u32,
            depth: depth as u32,
        };

        if rows.len() <= 1 || depth >= ceiling {
            self.nodes.push(leaf);
            return index;
        }

        // Only features with spread in this node can split it
        let dims = data[rows[0]].len();
        let mut candidates: Vec<(usize, f64, f64)> = Vec::with_capacity(dims);
        for feature in 0..dims {
            let (min, max) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                let v = data[r][feature];
                (lo.min(v), hi.max(v))
            });
            if max > min {
                candidates.push((feature, min, max));
            }
        }

        if candidates.is_empty() {
            self.nodes.push(leaf);
            return index;
        }

        let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
        let split = rng.gen_range(min..max);

        // split ∈ [min, max): both sides non-empty
        let mut mid = 0;
        for i in 0..rows.len() {
            if data[rows[i]][feature] <= split {
                rows.swap(i, mid);
                mid += 1;
            }
        }

        self.nodes.push(leaf); // placeholder, replaced below
        let (left_rows, right_rows) = rows.split_at_mut(mid);
        let left = self.grow(data, left_rows, depth + 1, ceiling, rng);
        let right = self.grow(data, right_rows, depth + 1, ceiling, rng);

        self.nodes[index as usize] = Node::Split {
            feature,
            split,
            left,
            right,
        };
        index
    }

    /// Path length h(x): edges to the leaf plus c(size) for unresolved leaves
    pub fn path_length(&self, x: &[f64]) -> f64 {
        let mut index = 0usize;
        loop {
            match self.nodes[index] {
                Node::Split {
                    feature,
                    split,
                    left,
                    right,
                } => {
                    let next = if x[feature] <= split { left } else { right };
                    index = next as usize;
                }
                Node::Leaf { size, depth } => {
                    return depth as f64 + average_path_length(size as usize);
                }
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Structural self-check used when loading snapshots
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        let len = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    feature,
                    split,
                    left,
                    right,
                } => {
                    if feature >= feature_count {
                        return Err(format!("node {} splits on feature {} (>= {})", i, feature, feature_count));
                    }
                    if !split.is_finite() {
                        return Err(format!("node {} has a non-finite split", i));
                    }
                    for child in [left as usize, right as usize] {
                        if child <= i || child >= len {
                            return Err(format!("node {} has invalid child {}", i, child));
                        }
                    }
                }
                Node::Leaf { .. } => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grid() -> Vec<Vec<f64>> {
        (0..64).map(|i| vec![(i % 8) as f64, (i / 8) as f64]).collect()
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // c(256) ≈ 10.24
        assert!((average_path_length(256) - 10.244).abs() < 0.01);
    }

    #[test]
    fn test_depth_ceiling() {
        assert_eq!(depth_ceiling(256), 8);
        assert_eq!(depth_ceiling(50), 6);
        assert_eq!(depth_ceiling(1), 0);
    }

    #[test]
    fn test_build_is_valid_and_preorder() {
        let data = grid();
        let mut rng = StdRng::seed_from_u64(7);
        let tree = IsolationTree::build(&data, (0..64).collect(), depth_ceiling(64), &mut rng);

        assert!(tree.validate(2).is_ok());
        assert!(tree.leaf_count() >= 2);

        let total: u32 = tree
            .nodes()
            .iter()
            .filter_map(|n| match n {
                Node::Leaf { size, .. } => Some(*size),
                _ => None,
            })
            .sum();
        assert_eq!(total, 64);
    }

    #[test]
    fn test_identical_points_make_single_leaf() {
        let data = vec![vec![1.0, 1.0]; 10];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = IsolationTree::build(&data, (0..10).collect(), 4, &mut rng);

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.path_length(&[1.0, 1.0]), average_path_length(10));
    }

    #[test]
    fn test_validate_rejects_bad_children() {
        let tree = IsolationTree {
            nodes: vec![Node::Split { feature: 0, split: 0.5, left: 0, right: 1 }, Node::Leaf { size: 1, depth: 1 }],
        };
        assert!(tree.validate(1).is_err());

        let tree = IsolationTree {
            nodes: vec![Node::Split { feature: 3, split: 0.5, left: 1, right: 2 }, Node::Leaf { size: 1, depth: 1 }, Node::Leaf { size: 1, depth: 1 }],
        };
        assert!(tree.validate(2).is_err());
    }
}
