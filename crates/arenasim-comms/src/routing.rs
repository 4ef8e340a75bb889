//! Dijkstra routing over the alive, non-LOST link graph. Uses a
//! linear-scan priority queue: adequate for the ≲1000-node networks
//! this engine targets, and avoids pulling in a binary-heap dependency
//! for a hot path this small.

use arenasim_core::EntityId;
use std::collections::HashMap;

/// Routing-cost edge weight: `latency_s * (1/quality_factor) * (1 +
/// packet_loss) * (1 + 2*utilization)`.
pub fn edge_cost(latency_s: f64, quality_factor: f64, packet_loss: f64, utilization: f64) -> f64 {
    latency_s * (1.0 / quality_factor.max(1e-6)) * (1.0 + packet_loss) * (1.0 + 2.0 * utilization)
}

#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub cost: f64,
    pub latency_s: f64,
}

pub struct RouteResult {
    pub path: Vec<EntityId>,
    pub total_cost: f64,
    pub total_latency_s: f64,
}

/// Adjacency list: node -> (neighbor, edge).
pub type Adjacency = HashMap<EntityId, Vec<(EntityId, Edge)>>;

/// Dijkstra shortest path from `source` to `destination`. Returns `None`
/// if no path exists.
pub fn shortest_path(adjacency: &Adjacency, source: &str, destination: &str) -> Option<RouteResult> {
    let mut dist: HashMap<EntityId, f64> = HashMap::new();
    let mut latency: HashMap<EntityId, f64> = HashMap::new();
    let mut prev: HashMap<EntityId, EntityId> = HashMap::new();
    let mut visited: HashMap<EntityId, bool> = HashMap::new();

    dist.insert(source.to_string(), 0.0);
    latency.insert(source.to_string(), 0.0);

    loop {
        // Linear scan for the closest unvisited node.
        let next = dist
            .iter()
            .filter(|(node, _)| !visited.get(*node).copied().unwrap_or(false))
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(node, cost)| (node.clone(), *cost));

        let Some((node, cost)) = next else { break };
        if node == destination {
            break;
        }
        visited.insert(node.clone(), true);

        let Some(neighbors) = adjacency.get(&node) else { continue };
        for (neighbor, edge) in neighbors {
            if visited.get(neighbor).copied().unwrap_or(false) {
                continue;
            }
            let candidate = cost + edge.cost;
            let better = dist.get(neighbor).map(|d| candidate < *d).unwrap_or(true);
            if better {
                dist.insert(neighbor.clone(), candidate);
                let base_latency = latency.get(&node).copied().unwrap_or(0.0);
                latency.insert(neighbor.clone(), base_latency + edge.latency_s);
                prev.insert(neighbor.clone(), node.clone());
            }
        }
    }

    if !dist.contains_key(destination) {
        return None;
    }

    let mut path = vec![destination.to_string()];
    let mut cur = destination.to_string();
    while let Some(p) = prev.get(&cur) {
        path.push(p.clone());
        cur = p.clone();
    }
    path.reverse();

    Some(RouteResult {
        path,
        total_cost: dist[destination],
        total_latency_s: latency[destination],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_adjacency() -> Adjacency {
        let mut adj: Adjacency = HashMap::new();
        adj.insert(
            "a".to_string(),
            vec![("b".to_string(), Edge { cost: 1.0, latency_s: 0.01 }), ("c".to_string(), Edge { cost: 5.0, latency_s: 0.05 })],
        );
        adj.insert(
            "b".to_string(),
            vec![("a".to_string(), Edge { cost: 1.0, latency_s: 0.01 }), ("c".to_string(), Edge { cost: 1.0, latency_s: 0.01 })],
        );
        adj.insert(
            "c".to_string(),
            vec![("a".to_string(), Edge { cost: 5.0, latency_s: 0.05 }), ("b".to_string(), Edge { cost: 1.0, latency_s: 0.01 })],
        );
        adj
    }

    #[test]
    fn finds_cheaper_two_hop_path_over_direct_edge() {
        let adj = build_adjacency();
        let route = shortest_path(&adj, "a", "c").unwrap();
        assert_eq!(route.path, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        assert!((route.total_cost - 2.0).abs() < 1e-9);
    }

    #[test]
    fn cost_equals_sum_of_edge_costs_along_path() {
        let adj = build_adjacency();
        let route = shortest_path(&adj, "a", "c").unwrap();
        let mut sum = 0.0;
        for pair in route.path.windows(2) {
            let edges = &adj[&pair[0]];
            let (_, edge) = edges.iter().find(|(n, _)| n == &pair[1]).unwrap();
            sum += edge.cost;
        }
        assert!((sum - route.total_cost).abs() < 1e-9);
    }

    #[test]
    fn returns_none_when_unreachable() {
        let mut adj: Adjacency = HashMap::new();
        adj.insert("a".to_string(), Vec::new());
        adj.insert("b".to_string(), Vec::new());
        assert!(shortest_path(&adj, "a", "b").is_none());
    }
}
