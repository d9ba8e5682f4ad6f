//! Hex rail network
//!
//! Tiles are graph nodes, edges between adjacent tiles are graph edges. The
//! topology is fixed once the map is assembled; only rail ownership changes
//! during a game.

use log::debug;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use super::config::GameConfig;
use super::error::{GameError, GameResult};
use super::types::{City, EdgeKey, PlayerId, TerrainPair, TilePosition, TileType};

/// A single hex tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub position: TilePosition,
    pub kind: TileType,
}

/// Edge data for the network graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RailEdge {
    pub key: EdgeKey,
    /// Players with a rail on this edge, in build order
    owners: Vec<PlayerId>,
}

impl RailEdge {
    fn new(key: EdgeKey) -> Self {
        Self {
            key,
            owners: Vec::new(),
        }
    }

    pub fn owners(&self) -> &[PlayerId] {
        &self.owners
    }

    pub fn has_rail(&self) -> bool {
        !self.owners.is_empty()
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owners.contains(&player)
    }
}

/// The authoritative game map: tiles, edges, cities and rail ownership
#[derive(Debug, Clone)]
pub struct RailNetwork {
    /// Undirected graph, one node per tile
    graph: UnGraph<Tile, RailEdge>,

    /// Maps tile positions to their node indices in the graph
    tile_to_node: HashMap<TilePosition, NodeIndex>,

    /// Maps edge keys to graph edges, ordered for stable iteration
    edge_index: BTreeMap<EdgeKey, EdgeIndex>,

    cities: BTreeMap<TilePosition, City>,

    config: Arc<GameConfig>,
}

impl RailNetwork {
    pub(crate) fn new(config: Arc<GameConfig>) -> Self {
        Self {
            graph: UnGraph::default(),
            tile_to_node: HashMap::new(),
            edge_index: BTreeMap::new(),
            cities: BTreeMap::new(),
            config,
        }
    }

    /// Adds a tile, replacing the terrain if the position already exists
    pub(crate) fn add_tile(&mut self, position: TilePosition, kind: TileType) {
        if let Some(node) = self.tile_to_node.get(&position) {
            self.graph[*node].kind = kind;
            return;
        }
        let node = self.graph.add_node(Tile { position, kind });
        self.tile_to_node.insert(position, node);
    }

    /// Creates an edge between every pair of adjacent tiles that lacks one
    pub(crate) fn connect_adjacent_tiles(&mut self) {
        let positions: Vec<TilePosition> = self.graph.node_weights().map(|t| t.position).collect();
        for position in positions {
            for neighbour in position.neighbours() {
                let Some(&to) = self.tile_to_node.get(&neighbour) else {
                    continue;
                };
                let key = EdgeKey::new(position, neighbour);
                if self.edge_index.contains_key(&key) {
                    continue;
                }
                let from = self.tile_to_node[&position];
                let index = self.graph.add_edge(from, to, RailEdge::new(key));
                self.edge_index.insert(key, index);
            }
        }
    }

    pub(crate) fn add_city(&mut self, city: City) -> GameResult<()> {
        if !self.tile_to_node.contains_key(&city.position) {
            return Err(GameError::UnknownTile(city.position));
        }
        if self.cities.contains_key(&city.position) {
            return Err(GameError::Configuration(format!(
                "two cities at {}",
                city.position
            )));
        }
        self.cities.insert(city.position, city);
        Ok(())
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub(crate) fn shared_config(&self) -> Arc<GameConfig> {
        Arc::clone(&self.config)
    }

    pub(crate) fn graph(&self) -> &UnGraph<Tile, RailEdge> {
        &self.graph
    }

    pub(crate) fn node(&self, position: &TilePosition) -> Option<NodeIndex> {
        self.tile_to_node.get(position).copied()
    }

    // Tiles

    pub fn tile(&self, position: &TilePosition) -> Option<&Tile> {
        self.node(position).map(|node| &self.graph[node])
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.graph.node_weights()
    }

    pub fn tile_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Neighbouring tiles reachable through one of `connecting` edges
    pub fn connected_neighbours(
        &self,
        position: &TilePosition,
        connecting: &BTreeSet<EdgeKey>,
    ) -> Vec<TilePosition> {
        self.edges_at(position)
            .into_iter()
            .filter(|key| connecting.contains(key))
            .filter_map(|key| key.other_end(position))
            .collect()
    }

    // Edges

    pub fn edge(&self, key: &EdgeKey) -> Option<&RailEdge> {
        self.edge_index.get(key).map(|index| &self.graph[*index])
    }

    fn require_edge(&self, key: &EdgeKey) -> GameResult<&RailEdge> {
        self.edge(key).ok_or(GameError::UnknownEdge(*key))
    }

    pub fn edges(&self) -> impl Iterator<Item = &RailEdge> {
        self.edge_index.values().map(|index| &self.graph[*index])
    }

    pub fn edge_count(&self) -> usize {
        self.edge_index.len()
    }

    /// All edges incident to a tile
    pub fn edges_at(&self, position: &TilePosition) -> Vec<EdgeKey> {
        match self.node(position) {
            Some(node) => self.graph.edges(node).map(|e| e.weight().key).collect(),
            None => Vec::new(),
        }
    }

    /// All edges sharing a tile with `key`, excluding `key` itself
    pub fn connected_edges(&self, key: &EdgeKey) -> BTreeSet<EdgeKey> {
        key.positions()
            .iter()
            .flat_map(|position| self.edges_at(position))
            .filter(|other| other != key)
            .collect()
    }

    /// Every edge the player has a rail on
    pub fn rails(&self, player: PlayerId) -> BTreeSet<EdgeKey> {
        self.edges()
            .filter(|edge| edge.is_owned_by(player))
            .map(|edge| edge.key)
            .collect()
    }

    pub fn has_rails(&self, player: PlayerId) -> bool {
        self.edges().any(|edge| edge.is_owned_by(player))
    }

    // Cities

    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.cities.values()
    }

    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    pub fn city_at(&self, position: &TilePosition) -> Option<&City> {
        self.cities.get(position)
    }

    pub fn has_city(&self, position: &TilePosition) -> bool {
        self.cities.contains_key(position)
    }

    pub fn starting_cities(&self) -> impl Iterator<Item = &City> {
        self.cities.values().filter(|city| city.is_starting_city)
    }

    pub fn city_with_roll_number(&self, roll_number: u32) -> Option<&City> {
        self.cities
            .values()
            .find(|city| city.roll_numbers.contains(&roll_number))
    }

    /// A city is connected once any rail touches its tile
    pub fn is_city_connected(&self, position: &TilePosition) -> bool {
        self.edges_at(position)
            .iter()
            .any(|key| self.edge(key).is_some_and(RailEdge::has_rail))
    }

    pub fn connected_cities(&self) -> Vec<&City> {
        self.cities
            .values()
            .filter(|city| self.is_city_connected(&city.position))
            .collect()
    }

    pub fn unconnected_cities(&self) -> Vec<&City> {
        self.cities
            .values()
            .filter(|city| !self.is_city_connected(&city.position))
            .collect()
    }

    // Costs

    fn terrain_pair(&self, key: &EdgeKey) -> GameResult<TerrainPair> {
        let [a, b] = key.positions();
        let first = self.tile(&a).ok_or(GameError::UnknownTile(a))?;
        let second = self.tile(&b).ok_or(GameError::UnknownTile(b))?;
        Ok(TerrainPair::new(first.kind, second.kind))
    }

    /// Cost of laying track on the edge, independent of who builds it
    pub fn building_cost(&self, key: &EdgeKey) -> GameResult<u32> {
        self.require_edge(key)?;
        self.config.building_cost(self.terrain_pair(key)?)
    }

    /// Cost of moving a train across the edge starting at `from`
    pub fn driving_cost(&self, key: &EdgeKey, from: &TilePosition) -> GameResult<u32> {
        self.require_edge(key)?;
        if !key.touches(from) {
            return Err(GameError::illegal(format!(
                "{} is not an endpoint of edge {}",
                from, key
            )));
        }
        self.config.driving_cost(self.terrain_pair(key)?)
    }

    /// Fees `player` owes other rail owners for building on `key`
    ///
    /// Owners of the edge itself get the through fee (reduced next to a city).
    /// Owners of other rails meeting at a non-city endpoint get the junction
    /// toll, unless `player` already has a rail at that tile. An owner
    /// qualifying for both is paid the larger amount once.
    pub fn parallel_cost(
        &self,
        key: &EdgeKey,
        player: PlayerId,
    ) -> GameResult<BTreeMap<PlayerId, u32>> {
        let edge = self.require_edge(key)?;
        let mut fees = BTreeMap::new();

        if matches!(edge.owners(), [only] if *only == player) {
            return Ok(fees);
        }

        let touches_city = key.positions().iter().any(|p| self.has_city(p));
        let through_fee = if touches_city {
            self.config.parallel_fee_at_city
        } else {
            self.config.parallel_fee
        };
        for owner in edge.owners().iter().filter(|owner| **owner != player) {
            fees.insert(*owner, through_fee);
        }

        for position in key.positions() {
            if self.has_city(&position) {
                continue;
            }
            let junction_owners: BTreeSet<PlayerId> = self
                .edges_at(&position)
                .iter()
                .filter(|other| *other != key)
                .filter_map(|other| self.edge(other))
                .flat_map(|other| other.owners().iter().copied())
                .collect();
            if junction_owners.contains(&player) {
                continue;
            }
            for owner in junction_owners {
                let fee = fees.entry(owner).or_insert(0);
                *fee = (*fee).max(self.config.junction_toll);
            }
        }

        Ok(fees)
    }

    pub fn total_parallel_cost(&self, key: &EdgeKey, player: PlayerId) -> GameResult<u32> {
        Ok(self.parallel_cost(key, player)?.values().sum())
    }

    pub fn total_building_cost(&self, key: &EdgeKey, player: PlayerId) -> GameResult<u32> {
        Ok(self.building_cost(key)? + self.total_parallel_cost(key, player)?)
    }

    /// Rent `player` owes for driving over someone else's edge
    pub fn renting_cost(
        &self,
        key: &EdgeKey,
        player: PlayerId,
    ) -> GameResult<BTreeMap<PlayerId, u32>> {
        let edge = self.require_edge(key)?;
        if edge.is_owned_by(player) {
            return Ok(BTreeMap::new());
        }
        Ok(edge
            .owners()
            .iter()
            .map(|owner| (*owner, self.config.rent_per_owner))
            .collect())
    }

    // Ownership

    /// Lays a rail for `player` if the connection rules allow it
    ///
    /// The first rail must touch a starting city; every later rail must share
    /// a tile with one of the player's rails. Returns false without mutating
    /// otherwise, or when the player already owns the edge.
    pub fn add_rail(&mut self, key: &EdgeKey, player: PlayerId) -> bool {
        let Some(&index) = self.edge_index.get(key) else {
            return false;
        };
        if self.graph[index].is_owned_by(player) {
            return false;
        }

        let allowed = if self.has_rails(player) {
            self.connected_edges(key)
                .iter()
                .any(|other| self.edge(other).is_some_and(|e| e.is_owned_by(player)))
        } else {
            key.positions()
                .iter()
                .any(|p| self.city_at(p).is_some_and(|city| city.is_starting_city))
        };
        if !allowed {
            return false;
        }

        debug!("{} builds rail on {}", player, key);
        self.graph[index].owners.push(player);
        true
    }

    pub fn remove_rail(&mut self, key: &EdgeKey, player: PlayerId) -> bool {
        let Some(&index) = self.edge_index.get(key) else {
            return false;
        };
        let owners = &mut self.graph[index].owners;
        let before = owners.len();
        owners.retain(|owner| *owner != player);
        owners.len() != before
    }

    /// Edges `player` could extend the network with, before affordability
    ///
    /// Without rails these are the edges around starting cities, otherwise
    /// every edge touching the player's rails that the player does not own.
    pub fn candidate_edges(&self, player: PlayerId) -> BTreeSet<EdgeKey> {
        let owned = self.rails(player);
        if owned.is_empty() {
            return self
                .starting_cities()
                .flat_map(|city| self.edges_at(&city.position))
                .collect();
        }
        owned
            .iter()
            .flat_map(|rail| self.connected_edges(rail))
            .filter(|key| !owned.contains(key))
            .collect()
    }

    /// Candidate edges filtered by the caller's affordability rule
    pub fn buildable_edges<F>(&self, player: PlayerId, mut can_afford: F) -> BTreeSet<EdgeKey>
    where
        F: FnMut(&EdgeKey) -> bool,
    {
        self.candidate_edges(player)
            .into_iter()
            .filter(|key| can_afford(key))
            .collect()
    }

    /// Verifies every edge has building and driving costs configured
    pub(crate) fn check_cost_tables(&self) -> GameResult<()> {
        for key in self.edge_index.keys() {
            let pair = self.terrain_pair(key)?;
            self.config.building_cost(pair)?;
            self.config.driving_cost(pair)?;
        }
        Ok(())
    }
}
