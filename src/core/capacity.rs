//! Guaranteed CPU capacity of each node, derived from the scheduler weights of the hierarchy

use std::collections::HashMap;

use log::debug;

use crate::core::hierarchy::Hierarchy;
use crate::core::Error;

/// Weight reserved by each node for its own processes, which is the default scheduler weight
pub const BASELINE_WEIGHT: u64 = 1024;

/// Share of the root of a hierarchy, before it distributes its capacity to its children
pub const ROOT_SHARE: f64 = 100.;

/// Percentage of the total CPU capacity of the system guaranteed to each node
#[derive(PartialEq, Debug, Clone, Default)]
pub struct CapacityShare {
    shares: HashMap<String, f64>,
}

impl CapacityShare {
    /// Returns the share of the given node, if it belongs to the propagated hierarchy
    pub fn get(&self, identifier: &str) -> Option<f64> {
        self.shares.get(identifier).copied()
    }
}

/// Computes the share of CPU capacity guaranteed to each node of the hierarchy.
///
/// Nodes are processed from the root down. Each node splits its share between its children and
/// its own baseline weight, proportionally to their weights, then keeps the part of the baseline.
///
/// If the weight of any node cannot be obtained, the whole computation is aborted.
///
/// # Arguments
///  * `hierarchy`: The tree of nodes
///  * `weight_of`: Returns the scheduler weight of a node, given its identifier
pub fn propagate<F>(hierarchy: &Hierarchy, mut weight_of: F) -> Result<CapacityShare, Error>
where
    F: FnMut(&str) -> Result<u64, Error>,
{
    let mut shares: HashMap<String, f64> = hierarchy
        .roots()
        .filter(|r| r.depth() == 0)
        .map(|r| (r.identifier().to_string(), ROOT_SHARE))
        .collect();

    for parent in hierarchy.by_depth() {
        let Some(parent_share) = shares.get(parent.identifier()).copied() else {
            debug!("Node '{}' is not reachable from a root, skipping it", parent.identifier());
            continue;
        };

        let children = hierarchy.children(parent.identifier());
        let weights = children
            .iter()
            .map(|c| weight_of(c).map_err(|e| Error::PropagationAborted(c.clone(), Box::new(e))))
            .collect::<Result<Vec<u64>, Error>>()?;

        let total_weight = BASELINE_WEIGHT as f64 + weights.iter().map(|w| *w as f64).sum::<f64>();

        for (child, weight) in children.iter().zip(weights) {
            shares.insert(child.clone(), parent_share / (total_weight / weight as f64));
        }

        shares.insert(
            parent.identifier().to_string(),
            parent_share / (total_weight / BASELINE_WEIGHT as f64),
        );
    }

    Ok(CapacityShare { shares })
}
