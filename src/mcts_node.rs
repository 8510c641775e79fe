use crate::board::Move;

/// Statistics kept for a single node of the search tree.
///
/// A node stands for the position reached by playing `prev_move` from its parent. Its value
/// `q` is the running mean of every result backpropagated through it, scored from the point
/// of view of the player who made `prev_move`.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsNode {
    /// The move that led to this node from its parent. `None` for the root node.
    pub prev_move: Option<Move>,
    /// The number of playouts that passed through this node.
    pub visits: u32,
    /// Mean backpropagated value, in `[-1, 1]` for inputs in `[-1, 1]`.
    pub q: f64,
    /// Prior probability of `prev_move`, supplied at expansion time.
    pub prior: f64,
}

impl Default for MctsNode {
    fn default() -> Self {
        MctsNode::root()
    }
}

impl MctsNode {
    /// A fresh root: no move, no visits, prior 1.
    pub fn root() -> Self {
        Self {
            prev_move: None,
            visits: 0,
            q: 0.0,
            prior: 1.0,
        }
    }

    pub fn child(prev_move: Move, prior: f64) -> Self {
        Self {
            prev_move: Some(prev_move),
            visits: 0,
            q: 0.0,
            prior,
        }
    }

    /// Folds one playout result into the running mean.
    pub fn update(&mut self, value: f64) {
        self.visits += 1;
        self.q += (value - self.q) / f64::from(self.visits);
    }

    /// Selection score: `Q + c * P * sqrt(N_parent) / (1 + N)`.
    ///
    /// Takes the parent's `sqrt(N)` precomputed since every sibling shares it.
    #[inline]
    pub fn ucb_value(&self, parent_visits_sqrt: f64, exploration_weight: f64) -> f64 {
        self.q
            + exploration_weight * self.prior * parent_visits_sqrt / (1.0 + f64::from(self.visits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn update_keeps_running_mean() {
        let mut node = MctsNode::root();
        node.update(1.0);
        node.update(-1.0);
        node.update(1.0);
        node.update(1.0);
        assert_eq!(node.visits, 4);
        assert!((node.q - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ucb_blends_value_and_prior() {
        let mut node = MctsNode::child(3, 0.5);
        node.visits = 9;
        node.q = -0.2;

        // -0.2 + 2 * 0.5 * 10 / 10
        let score = node.ucb_value(100f64.sqrt(), 2.0);
        assert!((score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn unvisited_child_scores_full_bonus() {
        let node = MctsNode::child(0, 0.25);
        let score = node.ucb_value(4.0, 5.0);
        assert!((score - 5.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn q_stays_within_result_bounds(values in prop::collection::vec(-1i8..=1, 1..200)) {
            let mut node = MctsNode::child(0, 0.5);
            for &v in &values {
                node.update(f64::from(v));
                prop_assert!((-1.0..=1.0).contains(&node.q));
            }
            let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64;
            prop_assert!((node.q - mean).abs() < 1e-9);
            prop_assert_eq!(node.visits as usize, values.len());
        }
    }
}
