//! Render plan: the node evaluation order for one topology.
//!
//! The plan is rebuilt lazily after any add, remove or connect,
//! then reused for every block until the topology changes again. Each step
//! refers to its inputs by step index, and Kahn ordering guarantees those
//! steps were evaluated earlier in the same sample.

use std::collections::BTreeMap;

use super::node::{Destination, NodeData, NodeId};
use crate::param::ParamKind;

#[derive(Debug, Clone)]
pub(crate) struct PlanStep {
    pub(crate) id: NodeId,
    pub(crate) audio_inputs: Vec<usize>,
    pub(crate) param_inputs: Vec<(ParamKind, usize)>,
    pub(crate) to_output: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RenderPlan {
    pub(crate) steps: Vec<PlanStep>,
}

impl RenderPlan {
    /// Build a plan over every node reachable in topological order.
    ///
    /// Connections are cycle-checked when made, so every node normally lands
    /// in the plan; anything left over is skipped rather than rendered.
    pub(crate) fn build(nodes: &BTreeMap<NodeId, NodeData>) -> Self {
        let order = kahn_sort(nodes);

        let position: BTreeMap<NodeId, usize> =
            order.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let mut steps: Vec<PlanStep> = order
            .iter()
            .map(|&id| PlanStep {
                id,
                audio_inputs: Vec::new(),
                param_inputs: Vec::new(),
                to_output: false,
            })
            .collect();

        for (from_idx, id) in order.iter().enumerate() {
            let Some(node) = nodes.get(id) else { continue };
            for dest in &node.outputs {
                match *dest {
                    Destination::Output => steps[from_idx].to_output = true,
                    Destination::Node(to) => {
                        if let Some(&to_idx) = position.get(&to) {
                            steps[to_idx].audio_inputs.push(from_idx);
                        }
                    }
                    Destination::Param(to, kind) => {
                        if let Some(&to_idx) = position.get(&to) {
                            steps[to_idx].param_inputs.push((kind, from_idx));
                        }
                    }
                }
            }
        }

        #[cfg(feature = "tracing")]
        if steps.len() != nodes.len() {
            tracing::debug!(
                planned = steps.len(),
                total = nodes.len(),
                "render plan skipped nodes caught in a cycle"
            );
        }

        Self { steps }
    }
}

/// Kahn's algorithm over audio and parameter edges.
fn kahn_sort(nodes: &BTreeMap<NodeId, NodeData>) -> Vec<NodeId> {
    let mut in_degree: BTreeMap<NodeId, u32> = nodes.keys().map(|&id| (id, 0)).collect();

    for node in nodes.values() {
        for dest in &node.outputs {
            if let Some(to) = dest.node()
                && let Some(degree) = in_degree.get_mut(&to)
            {
                *degree += 1;
            }
        }
    }

    // Seed in id order; the stack is reversed so lower ids pop first.
    let mut queue: Vec<NodeId> = in_degree
        .iter()
        .filter(|&(_, &d)| d == 0)
        .map(|(&id, _)| id)
        .rev()
        .collect();

    let mut sorted = Vec::with_capacity(nodes.len());

    while let Some(id) = queue.pop() {
        sorted.push(id);
        let Some(node) = nodes.get(&id) else { continue };
        for dest in &node.outputs {
            if let Some(to) = dest.node()
                && let Some(degree) = in_degree.get_mut(&to)
            {
                *degree -= 1;
                if *degree == 0 {
                    queue.push(to);
                }
            }
        }
    }

    sorted
}
