//! Least-cost searches over a subset of the network's edges

use petgraph::algo::astar;
use petgraph::visit::{EdgeFiltered, EdgeRef};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap};

use super::error::GameResult;
use super::rail_network::RailNetwork;
use super::types::{EdgeKey, TilePosition};

/// A way to a tile and what it costs to get there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Tiles from the origin to the destination, both included
    pub tiles: Vec<TilePosition>,
    pub cost: u32,
}

impl Route {
    pub fn destination(&self) -> Option<TilePosition> {
        self.tiles.last().copied()
    }
}

/// Finds the cheapest path between two tiles using only `allowed` edges
///
/// `edge_cost` receives the tile a step starts on and the tile it ends on.
/// Returns the edges in travel order, or an empty path when `to` cannot be
/// reached (or equals `from`). Equal-cost alternatives resolve the same way on
/// every call because the graph is built in a fixed order. The first error
/// from `edge_cost` aborts the search.
pub fn find_path<F>(
    network: &RailNetwork,
    from: TilePosition,
    to: TilePosition,
    allowed: &BTreeSet<EdgeKey>,
    mut edge_cost: F,
) -> GameResult<Vec<EdgeKey>>
where
    F: FnMut(TilePosition, TilePosition) -> GameResult<u32>,
{
    if from == to {
        return Ok(Vec::new());
    }
    let (Some(start), Some(goal)) = (network.node(&from), network.node(&to)) else {
        return Ok(Vec::new());
    };

    let graph = network.graph();
    let filtered = EdgeFiltered::from_fn(graph, |edge| allowed.contains(&edge.weight().key));

    let mut failure = None;
    let result = astar(
        &filtered,
        start,
        |node| node == goal,
        |edge| {
            match edge_cost(graph[edge.source()].position, graph[edge.target()].position) {
                Ok(cost) => cost,
                Err(err) => {
                    failure.get_or_insert(err);
                    0
                }
            }
        },
        |_| 0, // Null heuristic = Dijkstra
    );
    if let Some(err) = failure {
        return Err(err);
    }

    let Some((_, nodes)) = result else {
        return Ok(Vec::new());
    };

    Ok(nodes
        .windows(2)
        .map(|pair| EdgeKey::new(graph[pair[0]].position, graph[pair[1]].position))
        .collect())
}

/// Total cost of walking `path` from `from`, stepping edge by edge
pub fn path_cost<F>(from: TilePosition, path: &[EdgeKey], mut edge_cost: F) -> GameResult<u32>
where
    F: FnMut(TilePosition, TilePosition) -> GameResult<u32>,
{
    path_tiles(from, path)
        .windows(2)
        .map(|step| edge_cost(step[0], step[1]))
        .sum()
}

/// The tile sequence visited when walking `path` from `from`
///
/// Stops early if the edges do not chain.
pub fn path_tiles(from: TilePosition, path: &[EdgeKey]) -> Vec<TilePosition> {
    let mut tiles = vec![from];
    let mut current = from;
    for edge in path {
        match edge.other_end(&current) {
            Some(next) => {
                tiles.push(next);
                current = next;
            }
            None => break,
        }
    }
    tiles
}

/// Tiles a train at `from` can reach with `budget` driving points
///
/// Expansion follows `allowed` edges by cheapest driving cost. If `target` is
/// reachable within budget, it is the only tile returned. Otherwise a train
/// has to use the whole roll: tiles cheaper than `budget` are only passed
/// through, and the tiles costing exactly `budget` are returned. The origin
/// itself is never part of the result.
pub fn reachable_tiles(
    network: &RailNetwork,
    from: TilePosition,
    allowed: &BTreeSet<EdgeKey>,
    budget: u32,
    target: Option<TilePosition>,
) -> GameResult<BTreeMap<TilePosition, Route>> {
    let mut best_cost: HashMap<TilePosition, u32> = HashMap::from([(from, 0)]);
    let mut came_from: HashMap<TilePosition, TilePosition> = HashMap::new();
    let mut settled: BTreeSet<TilePosition> = BTreeSet::new();
    let mut frontier = BinaryHeap::new();
    frontier.push(Reverse((0u32, from)));

    while let Some(Reverse((cost, position))) = frontier.pop() {
        if !settled.insert(position) {
            continue;
        }

        if position != from && target == Some(position) {
            let route = Route {
                tiles: trace_back(&came_from, from, position),
                cost,
            };
            return Ok(BTreeMap::from([(position, route)]));
        }

        if cost >= budget {
            continue;
        }

        for next in network.connected_neighbours(&position, allowed) {
            let step = network.driving_cost(&EdgeKey::new(position, next), &position)?;
            let next_cost = cost + step;
            if next_cost > budget {
                continue;
            }
            let improves = best_cost
                .get(&next)
                .map_or(true, |known| next_cost < *known);
            if improves {
                best_cost.insert(next, next_cost);
                came_from.insert(next, position);
                frontier.push(Reverse((next_cost, next)));
            }
        }
    }

    Ok(settled
        .into_iter()
        .filter(|position| *position != from && best_cost[position] == budget)
        .map(|position| {
            let route = Route {
                tiles: trace_back(&came_from, from, position),
                cost: best_cost[&position],
            };
            (position, route)
        })
        .collect())
}

fn trace_back(
    came_from: &HashMap<TilePosition, TilePosition>,
    from: TilePosition,
    to: TilePosition,
) -> Vec<TilePosition> {
    let mut tiles = vec![to];
    let mut current = to;
    while current != from {
        match came_from.get(&current) {
            Some(previous) => {
                tiles.push(*previous);
                current = *previous;
            }
            None => break,
        }
    }
    tiles.reverse();
    tiles
}
