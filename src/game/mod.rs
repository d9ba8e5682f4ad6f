//! Rail race game engine
//!
//! Players build rails on a hex map, then race trains between chosen cities.
//! The engine runs on a single game-logic thread; humans and bots feed it
//! actions through per-player queues and watch it through [`GameObserver`].

mod config;
mod dice;
mod error;
mod game_controller;
mod game_state;
mod map_builder;
mod objective;
mod observer;
pub mod pathfinding;
mod player;
mod player_controller;
mod rail_network;
mod types;

pub use config::{
    default_building_costs, default_driving_costs, GameConfig, BUILDING_ROUND_LIMIT,
    CITY_CONNECTION_BONUS, DICE_SIDES, DRIVING_PHASE_BUILD_INTERVAL, JUNCTION_TOLL,
    MAX_BUILDING_BUDGET_DRIVING_PHASE, MAX_PLAYERS, MAX_RENTABLE_DISTANCE, MIN_PLAYERS,
    PARALLEL_FEE, PARALLEL_FEE_AT_CITY, RENT_PER_OWNER, STARTING_CREDITS,
    UNCONNECTED_CITIES_START_THRESHOLD, WINNING_CREDITS,
};
pub use dice::{Dice, RandomDice};
pub use error::{GameError, GameResult};
pub use game_controller::{choose_cities, GameController, GameOutcome, StopHandle};
pub use game_state::{GamePhase, GameState, GameView};
pub use map_builder::{HexagonLayout, RailNetworkBuilder};
pub use objective::{ActionKind, PlayerAction, PlayerObjective};
pub use observer::{GameObserver, NoopObserver, PlayerState};
pub use pathfinding::Route;
pub use player::Player;
pub use player_controller::{driving_cost_fn, ActionSender, PlayerController, TurnContext};
pub use rail_network::{RailEdge, RailNetwork, Tile};
pub use types::{
    roll_number_sequence, City, EdgeDirection, EdgeKey, PlayerId, TerrainPair, TilePosition,
    TileType,
};
