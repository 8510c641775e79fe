use crate::board::Move;
use crate::mcts_node::MctsNode;
use ego_tree::{NodeId, NodeRef, Tree};
use std::collections::HashSet;

/// The persistent search tree of an engine.
///
/// Nodes live in an `ego_tree` arena; children are owned through the arena and the parent
/// link is a plain [`NodeId`], so no reference cycles exist. Sibling order is insertion order,
/// which is what makes selection ties deterministic.
#[derive(Debug, Clone)]
pub struct SearchTree {
    tree: Tree<MctsNode>,
}

impl Default for SearchTree {
    fn default() -> Self {
        SearchTree::new()
    }
}

impl SearchTree {
    /// A tree holding a single fresh root.
    pub fn new() -> Self {
        Self {
            tree: Tree::new(MctsNode::root()),
        }
    }

    /// The node for the position the search starts from.
    pub fn root(&self) -> NodeRef<'_, MctsNode> {
        self.tree.root()
    }

    /// The arena id of [`root`](Self::root).
    pub fn root_id(&self) -> NodeId {
        self.tree.root().id()
    }

    /// Looks up a node by id.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, MctsNode>> {
        self.tree.get(id)
    }

    /// Number of nodes reachable from the root, the root included.
    pub fn node_count(&self) -> usize {
        self.tree.root().descendants().count()
    }

    /// True when `id` has no expanded children, or is not in the tree.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.tree.get(id).is_none_or(|node| !node.has_children())
    }

    /// The child of `id` reached by `mv`, if it has been expanded.
    pub fn child(&self, id: NodeId, mv: Move) -> Option<NodeId> {
        self.tree
            .get(id)?
            .children()
            .find(|child| child.value().prev_move == Some(mv))
            .map(|child| child.id())
    }

    /// Children of the root with their statistics, in insertion order.
    pub fn root_children(&self) -> impl Iterator<Item = (Move, &MctsNode)> + '_ {
        self.tree
            .root()
            .children()
            .filter_map(|child| child.value().prev_move.map(|mv| (mv, child.value())))
    }

    /// The root child with the most visits; the earliest inserted one wins ties.
    pub fn most_visited_root_move(&self) -> Option<Move> {
        let mut best: Option<(u32, Move)> = None;
        for (mv, node) in self.root_children() {
            if best.is_none_or(|(visits, _)| node.visits > visits) {
                best = Some((node.visits, mv));
            }
        }
        best.map(|(_, mv)| mv)
    }

    /// Adds a child for every move in `priors` that `id` does not have yet.
    /// Moves that are already children keep their statistics.
    pub fn expand(&mut self, id: NodeId, priors: &[(Move, f64)]) {
        let mut existing: HashSet<Move> = match self.tree.get(id) {
            Some(node) => node
                .children()
                .filter_map(|child| child.value().prev_move)
                .collect(),
            None => return,
        };
        let Some(mut node) = self.tree.get_mut(id) else {
            return;
        };
        for &(mv, prior) in priors {
            if existing.insert(mv) {
                node.append(MctsNode::child(mv, prior));
            }
        }
    }

    /// Picks the child of `id` with the highest UCB score.
    /// Returns `None` when `id` is a leaf.
    pub fn select(&self, id: NodeId, exploration_weight: f64) -> Option<(Move, NodeId)> {
        let node = self.tree.get(id)?;
        let parent_visits_sqrt = f64::from(node.value().visits).sqrt();
        let mut best: Option<(f64, Move, NodeId)> = None;
        for child in node.children() {
            let Some(mv) = child.value().prev_move else {
                continue;
            };
            let score = child.value().ucb_value(parent_visits_sqrt, exploration_weight);
            if best.is_none_or(|(best_score, _, _)| score > best_score) {
                best = Some((score, mv, child.id()));
            }
        }
        best.map(|(_, mv, child_id)| (mv, child_id))
    }

    /// Updates `id` with `value` and every ancestor with the value negated once per level.
    pub fn backpropagate(&mut self, id: NodeId, value: f64) {
        let mut current = Some(id);
        let mut value = value;
        while let Some(node_id) = current {
            let Some(mut node) = self.tree.get_mut(node_id) else {
                break;
            };
            node.value().update(value);
            current = node.parent().map(|parent| parent.id());
            value = -value;
        }
    }

    /// Makes the root's child for `mv` the new root, dropping every sibling subtree.
    ///
    /// When `mv` was never expanded the whole tree is replaced by a fresh root.
    /// Returns whether the existing subtree was kept.
    pub fn advance(&mut self, mv: Move) -> bool {
        let kept = self
            .child(self.root_id(), mv)
            .and_then(|child_id| self.tree.get(child_id))
            .map(SearchTree::detach_subtree);
        match kept {
            Some(subtree) => {
                self.tree = subtree;
                true
            }
            None => {
                self.reset();
                false
            }
        }
    }

    /// Discards the whole tree.
    pub fn reset(&mut self) {
        self.tree = Tree::new(MctsNode::root());
    }

    /// Copies the subtree under `source` into a new, compact arena rooted at `source`.
    fn detach_subtree(source: NodeRef<'_, MctsNode>) -> Tree<MctsNode> {
        let mut subtree = Tree::new(source.value().clone());
        let mut pending = vec![(source, subtree.root().id())];
        while let Some((from, to)) = pending.pop() {
            let Some(mut target) = subtree.get_mut(to) else {
                continue;
            };
            for child in from.children() {
                let copied = target.append(child.value().clone()).id();
                pending.push((child, copied));
            }
        }
        subtree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// (depth, move, visits, q bits, prior bits) for every node in pre-order.
    fn snapshot(node: NodeRef<'_, MctsNode>) -> Vec<(usize, Option<Move>, u32, u64, u64)> {
        let base = node.ancestors().count();
        node.descendants()
            .map(|n| {
                let v = n.value();
                (
                    n.ancestors().count() - base,
                    v.prev_move,
                    v.visits,
                    v.q.to_bits(),
                    v.prior.to_bits(),
                )
            })
            .collect()
    }

    #[test]
    fn fresh_tree_is_single_leaf_root() {
        let tree = SearchTree::new();
        assert_eq!(tree.node_count(), 1);
        assert!(tree.is_leaf(tree.root_id()));
        assert_eq!(tree.root().value(), &MctsNode::root());
        assert!(tree.root().parent().is_none());
    }

    #[test]
    fn expand_is_idempotent() {
        // arrange
        let mut tree = SearchTree::new();
        let root = tree.root_id();
        tree.expand(root, &[(0, 0.5), (1, 0.5)]);
        let first = tree.child(root, 0).unwrap();
        tree.backpropagate(first, 1.0);

        // act
        tree.expand(root, &[(0, 0.9), (1, 0.9), (2, 0.1)]);

        // assert
        let moves: Vec<Move> = tree.root_children().map(|(mv, _)| mv).collect();
        assert_eq!(moves, vec![0, 1, 2]);
        let kept = tree.get(first).unwrap().value();
        assert_eq!(kept.prior, 0.5);
        assert_eq!(kept.visits, 1);
    }

    #[test]
    fn select_breaks_ties_by_insertion_order() {
        let mut tree = SearchTree::new();
        let root = tree.root_id();
        tree.expand(root, &[(7, 0.25), (3, 0.25), (5, 0.25)]);
        assert_eq!(tree.select(root, 5.0).map(|(mv, _)| mv), Some(7));
    }

    #[test]
    fn select_prefers_highest_score() {
        // arrange
        let mut tree = SearchTree::new();
        let root = tree.root_id();
        tree.expand(root, &[(0, 0.1), (1, 0.8), (2, 0.1)]);

        // act
        tree.backpropagate(root, 0.0);

        // assert
        assert_eq!(tree.select(root, 1.0).map(|(mv, _)| mv), Some(1));
        assert_eq!(tree.select(tree.child(root, 1).unwrap(), 1.0), None);
    }

    #[test]
    fn backpropagation_flips_sign_every_level() {
        // arrange
        let mut tree = SearchTree::new();
        let root = tree.root_id();
        tree.expand(root, &[(0, 1.0)]);
        let a = tree.child(root, 0).unwrap();
        tree.expand(a, &[(1, 1.0)]);
        let b = tree.child(a, 1).unwrap();

        // act
        tree.backpropagate(b, 1.0);

        // assert
        assert_eq!(tree.get(b).unwrap().value().q, 1.0);
        assert_eq!(tree.get(a).unwrap().value().q, -1.0);
        assert_eq!(tree.root().value().q, 1.0);
        assert_eq!(tree.root().value().visits, 1);
    }

    #[test]
    fn advance_keeps_chosen_subtree() {
        // arrange
        let mut tree = SearchTree::new();
        let root = tree.root_id();
        tree.expand(root, &[(0, 0.5), (1, 0.5)]);
        let kept = tree.child(root, 1).unwrap();
        tree.expand(kept, &[(2, 0.3), (3, 0.7)]);
        let grandchild = tree.child(kept, 3).unwrap();
        tree.expand(grandchild, &[(4, 1.0)]);
        tree.backpropagate(tree.child(grandchild, 4).unwrap(), -1.0);
        tree.backpropagate(tree.child(kept, 2).unwrap(), 1.0);
        tree.backpropagate(tree.child(root, 0).unwrap(), 0.0);
        let expected = snapshot(tree.get(kept).unwrap());

        // act
        let reused = tree.advance(1);

        // assert
        assert!(reused);
        assert!(tree.root().parent().is_none());
        assert_eq!(snapshot(tree.root()), expected);
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn advance_to_unseen_move_resets() {
        let mut tree = SearchTree::new();
        let root = tree.root_id();
        tree.expand(root, &[(0, 1.0)]);
        tree.backpropagate(tree.child(root, 0).unwrap(), 1.0);

        assert!(!tree.advance(9));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.root().value().visits, 0);
        assert!(tree.is_leaf(tree.root_id()));
    }

    #[test]
    fn most_visited_move_prefers_first_on_ties() {
        let mut tree = SearchTree::new();
        let root = tree.root_id();
        assert_eq!(tree.most_visited_root_move(), None);
        tree.expand(root, &[(4, 0.5), (2, 0.5), (6, 0.5)]);
        tree.backpropagate(tree.child(root, 2).unwrap(), 1.0);
        tree.backpropagate(tree.child(root, 6).unwrap(), 1.0);
        assert_eq!(tree.most_visited_root_move(), Some(2));
    }
}
