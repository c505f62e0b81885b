use crate::{
    base::{ActionKind, ActionStyle},
    bounds::EnvironmentBounds,
};
use log::debug;

/// Tracks the outcome of the actions taken during an episode.
///
/// For every node within the bounds it records whether an action was applied to it
/// (the explored-node bitmap) and how many actions of each kind succeeded
/// (positive reward) or failed. It also counts actions per [`ActionStyle`].
#[derive(Debug, Clone)]
pub struct ActionTrackingStateAugmentation {
    explored_nodes: Vec<bool>,
    success_action_count: Vec<[usize; 3]>,
    failed_action_count: Vec<[usize; 3]>,
    style_count: [usize; 3],
    last_style: Option<ActionStyle>,
    discovered_node_count: usize,
    maximum_node_count: usize,
}

impl ActionTrackingStateAugmentation {
    /// Constructs the tracker for the given bounds.
    pub fn new(bounds: &EnvironmentBounds) -> Self {
        let n = bounds.maximum_node_count;
        Self {
            explored_nodes: vec![false; n],
            success_action_count: vec![[0; 3]; n],
            failed_action_count: vec![[0; 3]; n],
            style_count: [0; 3],
            last_style: None,
            discovered_node_count: 0,
            maximum_node_count: n,
        }
    }

    /// Clears the bookkeeping at the start of an episode.
    pub fn on_reset(&mut self, discovered_node_count: usize) {
        let n = self.maximum_node_count;
        self.explored_nodes = vec![false; n];
        self.success_action_count = vec![[0; 3]; n];
        self.failed_action_count = vec![[0; 3]; n];
        self.style_count = [0; 3];
        self.last_style = None;
        self.discovered_node_count = discovered_node_count.min(n);
    }

    /// Records the outcome of a step.
    pub fn on_step(
        &mut self,
        style: ActionStyle,
        kind: ActionKind,
        node: usize,
        reward: f32,
        discovered_node_count: usize,
    ) {
        self.style_count[style.index()] += 1;
        self.last_style = Some(style);
        self.discovered_node_count = discovered_node_count.min(self.maximum_node_count);

        if node >= self.maximum_node_count {
            debug!(
                "node {} is out of bounds (maximum_node_count={})",
                node, self.maximum_node_count
            );
            return;
        }

        self.explored_nodes[node] = true;
        if reward > 0.0 {
            self.success_action_count[node][kind.index()] += 1;
        } else {
            self.failed_action_count[node][kind.index()] += 1;
        }
    }

    /// Nodes an action was applied to in the current episode.
    pub fn explored_nodes(&self) -> &[bool] {
        &self.explored_nodes
    }

    /// Explored-node bitmap as `0`/`1` values.
    pub fn explored_nodes_bitmap(&self) -> Vec<u8> {
        self.explored_nodes.iter().map(|&b| b as u8).collect()
    }

    /// Number of discovered nodes, clipped to the bounds.
    pub fn discovered_node_count(&self) -> usize {
        self.discovered_node_count
    }

    /// Number of actions of the given kind on `node` that yielded a positive reward.
    pub fn success_count(&self, node: usize, kind: ActionKind) -> usize {
        self.success_action_count
            .get(node)
            .map_or(0, |c| c[kind.index()])
    }

    /// Number of actions of the given kind on `node` that did not yield a positive reward.
    pub fn failure_count(&self, node: usize, kind: ActionKind) -> usize {
        self.failed_action_count
            .get(node)
            .map_or(0, |c| c[kind.index()])
    }

    /// Number of actions taken with the given style.
    pub fn style_count(&self, style: ActionStyle) -> usize {
        self.style_count[style.index()]
    }

    /// Style of the last action.
    pub fn last_style(&self) -> Option<ActionStyle> {
        self.last_style
    }
}
