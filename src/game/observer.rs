//! Snapshots and the notification interface for presentation layers

use std::collections::{BTreeMap, BTreeSet};

use super::game_state::GameView;
use super::objective::PlayerObjective;
use super::pathfinding::Route;
use super::types::{EdgeKey, PlayerId, TilePosition};

/// What one player may do right now, recomputed after every action
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerState {
    pub player: PlayerId,
    pub objective: PlayerObjective,
    /// True only on the snapshot sent right before the controller blocks
    pub awaiting_action: bool,
    pub credits: i32,
    pub building_budget: u32,
    pub buildable_edges: BTreeSet<EdgeKey>,
    pub choosable_edges: BTreeSet<EdgeKey>,
    pub rented_edges: BTreeSet<EdgeKey>,
    /// Rent charged for `rented_edges` when the path is confirmed
    pub rent_due: u32,
    pub has_path: bool,
    /// Tiles of the start-to-target path found for this round
    pub planned_route: Vec<TilePosition>,
    pub position: Option<TilePosition>,
    pub drivable_tiles: BTreeMap<TilePosition, Route>,
}

/// Receives snapshots from the game-logic thread
///
/// All methods run on the game-logic thread and must not block; forward the
/// data elsewhere if it needs slow handling.
pub trait GameObserver: Send + Sync {
    fn player_state_changed(&self, _state: &PlayerState) {}

    fn game_state_changed(&self, _view: &GameView) {}

    fn active_player_changed(&self, _player: Option<PlayerId>) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl GameObserver for NoopObserver {}
