//! Shared state of one running game
//!
//! Owned by the game controller and only mutated from the game-logic thread.
//! Presentation code sees it through [`GameView`] snapshots.

use std::collections::{BTreeMap, BTreeSet};

use super::error::{GameError, GameResult};
use super::player::Player;
use super::rail_network::RailNetwork;
use super::types::{City, PlayerId, TilePosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    #[default]
    Building,
    Driving,
}

/// Game state that tracks the board, the players and the current round
#[derive(Debug, Clone)]
pub struct GameState {
    pub grid: RailNetwork,

    /// Players in seat order
    players: Vec<Player>,

    /// Train positions during the driving phase
    player_positions: BTreeMap<PlayerId, TilePosition>,

    /// Cities already used as start or target
    chosen_cities: BTreeSet<TilePosition>,

    /// Start and target city of the current race
    chosen_pair: Option<(TilePosition, TilePosition)>,

    pub phase: GamePhase,

    /// Players racing this round, in the order they confirmed
    driving_players: Vec<PlayerId>,

    /// Unused dice points banked when reaching the target, minus catch-up penalties
    point_surplus: BTreeMap<PlayerId, i32>,

    pub round: u32,

    pub dice_roll: u32,

    pub winner: Option<PlayerId>,
}

impl GameState {
    pub fn new(grid: RailNetwork, players: Vec<Player>) -> Self {
        Self {
            grid,
            players,
            player_positions: BTreeMap::new(),
            chosen_cities: BTreeSet::new(),
            chosen_pair: None,
            phase: GamePhase::Building,
            driving_players: Vec::new(),
            point_surplus: BTreeMap::new(),
            round: 0,
            dice_roll: 0,
            winner: None,
        }
    }

    // Players

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub(crate) fn players_mut(&mut self) -> &mut Vec<Player> {
        &mut self.players
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn player(&self, id: PlayerId) -> GameResult<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| GameError::illegal(format!("unknown player {}", id)))
    }

    pub fn player_mut(&mut self, id: PlayerId) -> GameResult<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GameError::illegal(format!("unknown player {}", id)))
    }

    pub fn credits(&self, id: PlayerId) -> i32 {
        self.player(id).map(Player::credits).unwrap_or(0)
    }

    // Positions

    pub fn player_position(&self, id: PlayerId) -> Option<TilePosition> {
        self.player_positions.get(&id).copied()
    }

    pub fn set_player_position(&mut self, id: PlayerId, position: TilePosition) {
        self.player_positions.insert(id, position);
    }

    pub fn reset_player_positions(&mut self) {
        self.player_positions.clear();
    }

    // Chosen cities

    pub fn chosen_cities(&self) -> &BTreeSet<TilePosition> {
        &self.chosen_cities
    }

    pub fn add_chosen_city(&mut self, position: TilePosition) {
        self.chosen_cities.insert(position);
    }

    pub fn chosen_pair(&self) -> Option<(TilePosition, TilePosition)> {
        self.chosen_pair
    }

    pub fn set_chosen_pair(&mut self, start: TilePosition, target: TilePosition) {
        self.chosen_pair = Some((start, target));
    }

    pub fn starting_city(&self) -> Option<&City> {
        self.chosen_pair
            .and_then(|(start, _)| self.grid.city_at(&start))
    }

    pub fn target_city(&self) -> Option<&City> {
        self.chosen_pair
            .and_then(|(_, target)| self.grid.city_at(&target))
    }

    /// Cities that have not been start or target yet
    pub fn unchosen_cities(&self) -> Vec<&City> {
        self.grid
            .cities()
            .filter(|city| !self.chosen_cities.contains(&city.position))
            .collect()
    }

    // Racing

    pub fn driving_players(&self) -> &[PlayerId] {
        &self.driving_players
    }

    pub fn is_driving(&self, id: PlayerId) -> bool {
        self.driving_players.contains(&id)
    }

    pub fn add_driving_player(&mut self, id: PlayerId) {
        if !self.driving_players.contains(&id) {
            self.driving_players.push(id);
        }
    }

    pub fn reset_driving_players(&mut self) {
        self.driving_players.clear();
    }

    pub fn is_at_target(&self, id: PlayerId) -> bool {
        match (self.chosen_pair, self.player_position(id)) {
            (Some((_, target)), Some(position)) => position == target,
            _ => false,
        }
    }

    pub fn point_surplus(&self, id: PlayerId) -> i32 {
        self.point_surplus.get(&id).copied().unwrap_or(0)
    }

    pub fn add_point_surplus(&mut self, id: PlayerId, amount: i32) {
        *self.point_surplus.entry(id).or_insert(0) += amount;
    }

    pub fn reset_point_surplus(&mut self) {
        self.point_surplus.clear();
    }

    /// Get a summary string for display
    pub fn summary(&self) -> String {
        let credits: Vec<String> = self
            .players
            .iter()
            .map(|p| format!("{}: {}", p.name, p.credits()))
            .collect();
        format!(
            "Phase: {:?} | Round: {} | Unconnected cities: {} | Chosen cities: {}/{} | Credits: [{}]",
            self.phase,
            self.round,
            self.grid.unconnected_cities().len(),
            self.chosen_cities.len(),
            self.grid.city_count(),
            credits.join(", ")
        )
    }

    /// Read-only snapshot for observers
    pub fn view(&self, active_player: Option<PlayerId>) -> GameView {
        GameView {
            phase: self.phase,
            round: self.round,
            dice_roll: self.dice_roll,
            chosen_pair: self.chosen_pair,
            active_player,
            credits: self.players.iter().map(|p| (p.id, p.credits())).collect(),
            positions: self.player_positions.clone(),
            driving_players: self.driving_players.clone(),
            winner: self.winner,
        }
    }
}

/// Immutable snapshot of the public game state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameView {
    pub phase: GamePhase,
    pub round: u32,
    pub dice_roll: u32,
    pub chosen_pair: Option<(TilePosition, TilePosition)>,
    pub active_player: Option<PlayerId>,
    pub credits: BTreeMap<PlayerId, i32>,
    pub positions: BTreeMap<PlayerId, TilePosition>,
    pub driving_players: Vec<PlayerId>,
    pub winner: Option<PlayerId>,
}
