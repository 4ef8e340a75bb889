//! Link-graph construction: topology -> edge set, collapsed by key so one
//! physical edge can be shared by multiple networks.

use arenasim_core::enums::Topology;
use arenasim_core::EntityId;
use std::collections::BTreeSet;

pub type EdgeKey = (EntityId, EntityId);

pub fn edge_key(a: &EntityId, b: &EntityId) -> EdgeKey {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// A logical network: a set of nodes wired per a topology.
#[derive(Debug, Clone)]
pub struct NetworkSpec {
    pub id: String,
    pub topology: Topology,
    pub node_ids: Vec<EntityId>,
    /// Required for `Topology::Star`: the hub node.
    pub hub: Option<EntityId>,
    /// Required for `Topology::Custom`: explicit edge list.
    pub custom_edges: Vec<(EntityId, EntityId)>,
}

/// All edges this network instantiates, keyed by unordered pair.
pub fn edges_for(network: &NetworkSpec) -> Vec<EdgeKey> {
    match network.topology {
        Topology::Mesh => {
            let mut out = Vec::new();
            for i in 0..network.node_ids.len() {
                for j in (i + 1)..network.node_ids.len() {
                    out.push(edge_key(&network.node_ids[i], &network.node_ids[j]));
                }
            }
            out
        }
        Topology::Star => {
            let Some(hub) = &network.hub else { return Vec::new() };
            network
                .node_ids
                .iter()
                .filter(|n| *n != hub)
                .map(|n| edge_key(hub, n))
                .collect()
        }
        Topology::Multihop => network
            .node_ids
            .windows(2)
            .map(|pair| edge_key(&pair[0], &pair[1]))
            .collect(),
        Topology::Custom => network
            .custom_edges
            .iter()
            .map(|(a, b)| edge_key(a, b))
            .collect(),
    }
}

/// Union of edges across all networks, collapsed by key: one physical
/// link may serve several networks at once.
pub fn collapse_edges(networks: &[NetworkSpec]) -> BTreeSet<EdgeKey> {
    let mut set = BTreeSet::new();
    for net in networks {
        for edge in edges_for(net) {
            set.insert(edge);
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(topology: Topology, nodes: &[&str]) -> NetworkSpec {
        NetworkSpec {
            id: "n".to_string(),
            topology,
            node_ids: nodes.iter().map(|s| s.to_string()).collect(),
            hub: nodes.first().map(|s| s.to_string()),
            custom_edges: Vec::new(),
        }
    }

    #[test]
    fn mesh_is_all_pairs() {
        let n = net(Topology::Mesh, &["a", "b", "c"]);
        assert_eq!(edges_for(&n).len(), 3);
    }

    #[test]
    fn star_is_hub_to_each_other_node() {
        let n = net(Topology::Star, &["hub", "b", "c"]);
        let edges = edges_for(&n);
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|(a, b)| a == "hub" || b == "hub"));
    }

    #[test]
    fn multihop_is_consecutive_pairs() {
        let n = net(Topology::Multihop, &["a", "b", "c", "d"]);
        assert_eq!(edges_for(&n).len(), 3);
    }

    #[test]
    fn edges_collapse_across_networks() {
        let a = net(Topology::Mesh, &["x", "y"]);
        let b = net(Topology::Mesh, &["x", "y"]);
        assert_eq!(collapse_edges(&[a, b]).len(), 1);
    }
}
