use std::collections::{BTreeMap, VecDeque};
use warpspace_common::{Coordinate, CoreError, CoreResult, RouteConfig};

use crate::graph::GateGraph;

/// A path through the active gate network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Systems in travel order, both endpoints included.
    pub systems: Vec<Coordinate>,
    pub hops: usize,
    pub cost: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Found(Route),
    Unreachable,
}

impl RouteOutcome {
    pub fn route(&self) -> Option<&Route> {
        match self {
            Self::Found(route) => Some(route),
            Self::Unreachable => None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Fewest-hop routing over active gates.
///
/// Breadth-first, visiting each system's neighbours in ascending coordinate
/// order; the first discovery of a system fixes its predecessor. Among
/// equal-length paths the result is therefore the one whose earliest
/// diverging hop goes to the smaller coordinate.
#[derive(Debug, Clone, Default)]
pub struct WarpRoutePathfinder {
    config: RouteConfig,
}

impl WarpRoutePathfinder {
    pub fn new(config: RouteConfig) -> Self {
        Self { config }
    }

    pub fn cost_per_hop(&self) -> u64 {
        self.config.cost_per_hop
    }

    /// Route from `from` to `to`. Both must be gated; an unknown endpoint is
    /// a validation error, a missing path is [`RouteOutcome::Unreachable`].
    pub fn route(
        &self,
        graph: &GateGraph,
        from: Coordinate,
        to: Coordinate,
    ) -> CoreResult<RouteOutcome> {
        for end in [from, to] {
            if !graph.contains(end) {
                return Err(CoreError::NotGated(end));
            }
        }
        if from == to {
            return Ok(RouteOutcome::Found(self.finish(vec![from])));
        }

        let mut previous: BTreeMap<Coordinate, Coordinate> = BTreeMap::new();
        let mut queue = VecDeque::from([from]);
        previous.insert(from, from);

        while let Some(current) = queue.pop_front() {
            for next in graph.active_neighbors(current) {
                if previous.contains_key(&next) {
                    continue;
                }
                previous.insert(next, current);
                if next == to {
                    let route = self.finish(walk_back(&previous, from, to));
                    tracing::debug!(%from, %to, hops = route.hops, "route found");
                    return Ok(RouteOutcome::Found(route));
                }
                queue.push_back(next);
            }
        }
        tracing::debug!(%from, %to, explored = previous.len(), "route unreachable");
        Ok(RouteOutcome::Unreachable)
    }

    fn finish(&self, systems: Vec<Coordinate>) -> Route {
        let hops = systems.len().saturating_sub(1);
        Route {
            systems,
            hops,
            cost: hops as u64 * self.config.cost_per_hop,
        }
    }
}

fn walk_back(
    previous: &BTreeMap<Coordinate, Coordinate>,
    from: Coordinate,
    to: Coordinate,
) -> Vec<Coordinate> {
    let mut path = vec![to];
    let mut cursor = to;
    while cursor != from {
        match previous.get(&cursor) {
            Some(prev) => {
                cursor = *prev;
                path.push(cursor);
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::TopologyTxn;
    use warpspace_common::CoordinateDomain;
    use warpspace_kernel::Universe;

    fn c(x: i32, y: i32, z: i32) -> Coordinate {
        Coordinate::new(x, y, z)
    }

    fn build(systems: &[Coordinate]) -> GateGraph {
        let mut u = Universe::new("abc", CoordinateDomain::default());
        for s in systems {
            u.realize(*s).unwrap();
        }
        let mut graph = GateGraph::new();
        for s in systems {
            let mut txn = TopologyTxn::begin(&mut graph);
            txn.insert(&u, *s).unwrap();
            txn.commit();
        }
        graph
    }

    fn pathfinder() -> WarpRoutePathfinder {
        WarpRoutePathfinder::new(RouteConfig { cost_per_hop: 7 })
    }

    #[test]
    fn chain_route_goes_through_middle() {
        let (a, b, c3) = (c(0, 0, 0), c(4, 0, 0), c(8, 0, 0));
        let graph = build(&[a, b, c3]);
        let outcome = pathfinder().route(&graph, a, c3).unwrap();
        let route = outcome.route().unwrap();
        assert_eq!(route.systems, vec![a, b, c3]);
        assert_eq!(route.hops, 2);
        assert_eq!(route.cost, 14);
    }

    #[test]
    fn same_system_is_zero_hops() {
        let a = c(0, 0, 0);
        let graph = build(&[a]);
        let outcome = pathfinder().route(&graph, a, a).unwrap();
        assert_eq!(
            outcome,
            RouteOutcome::Found(Route {
                systems: vec![a],
                hops: 0,
                cost: 0,
            })
        );
    }

    #[test]
    fn inactive_gate_splits_network() {
        let (a, b, c3) = (c(0, 0, 0), c(4, 0, 0), c(8, 0, 0));
        let mut graph = build(&[a, b, c3]);
        let mut txn = TopologyTxn::begin(&mut graph);
        txn.set_gate_active(b, c3, false).unwrap();
        txn.commit();

        let outcome = pathfinder().route(&graph, a, c3).unwrap();
        assert_eq!(outcome, RouteOutcome::Unreachable);
        assert!(!outcome.is_reachable());
        assert!(pathfinder().route(&graph, a, b).unwrap().is_reachable());
    }

    #[test]
    fn disconnected_components_are_unreachable() {
        let mut graph = build(&[c(0, 0, 0), c(4, 0, 0)]);
        let mut other = GateGraph::new();
        let mut u = Universe::new("abc", CoordinateDomain::default());
        u.realize(c(50, 50, 50)).unwrap();
        let mut txn = TopologyTxn::begin(&mut other);
        txn.link(&u, c(50, 50, 50)).unwrap();
        txn.commit();
        // a lone gated system with no gates
        graph = GateGraph::replay(&[graph.events(), other.events()].concat());

        let outcome = pathfinder().route(&graph, c(0, 0, 0), c(50, 50, 50));
        assert_eq!(outcome, Ok(RouteOutcome::Unreachable));
    }

    #[test]
    fn ungated_endpoint_is_rejected() {
        let graph = build(&[c(0, 0, 0)]);
        let outcome = pathfinder().route(&graph, c(0, 0, 0), c(1, 1, 1));
        assert_eq!(outcome, Err(CoreError::NotGated(c(1, 1, 1))));
    }

    #[test]
    fn equal_length_paths_prefer_smaller_coordinates() {
        // a square: two 2-hop routes from the origin to the far corner
        let corners = [c(0, 0, 0), c(5, 0, 0), c(0, 5, 0), c(5, 5, 0)];
        let graph = build(&corners);
        assert!(graph.has_gate(c(0, 0, 0), c(5, 0, 0)));
        assert!(graph.has_gate(c(0, 0, 0), c(0, 5, 0)));
        let route = pathfinder()
            .route(&graph, c(0, 0, 0), c(5, 5, 0))
            .unwrap()
            .route()
            .cloned()
            .unwrap();
        assert_eq!(route.hops, 2);
        // (0,5,0) sorts before (5,0,0)
        assert_eq!(route.systems[1], c(0, 5, 0));
    }
}
