//! Game configuration
//!
//! Every tunable number of the rules lives in [`GameConfig`], which is built
//! once, validated, and handed to the network and the controllers.

use std::collections::HashMap;

use super::error::{GameError, GameResult};
use super::types::{TerrainPair, TileType};

/// Number of sides on each die. Roll numbers use one digit per die, so at most 9.
pub const DICE_SIDES: u32 = 6;

/// Player count limits
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

/// Credits each player starts with
pub const STARTING_CREDITS: i32 = 20;

/// Credits for being the first to connect a (non-starting) city
pub const CITY_CONNECTION_BONUS: i32 = 6;

/// Building phase ends once this many cities or fewer are unconnected
pub const UNCONNECTED_CITIES_START_THRESHOLD: usize = 3;

/// Hard stop for the building phase on maps where nobody can build anymore
pub const BUILDING_ROUND_LIMIT: u32 = 200;

/// Budget of the building sub-round held during the driving phase
pub const MAX_BUILDING_BUDGET_DRIVING_PHASE: u32 = 10;

/// Every n-th driving round starts with a building sub-round
pub const DRIVING_PHASE_BUILD_INTERVAL: u32 = 3;

/// Maximum number of foreign edges a player may rent in one round
pub const MAX_RENTABLE_DISTANCE: usize = 10;

/// Fee per existing owner when building alongside their rail
pub const PARALLEL_FEE: u32 = 5;
/// Reduced fee when the shared edge touches a city
pub const PARALLEL_FEE_AT_CITY: u32 = 3;
/// Fee per owner of a rail meeting the new one at a non-city tile
pub const JUNCTION_TOLL: u32 = 1;

/// Rent per owner of a rented edge
pub const RENT_PER_OWNER: u32 = 1;

/// Payouts for the first, second and third train to arrive
pub const WINNING_CREDITS: [i32; 3] = [20, 10, 5];

/// Immutable rule set for one game
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub dice_sides: u32,
    pub min_players: usize,
    pub max_players: usize,
    pub starting_credits: i32,
    pub city_connection_bonus: i32,
    pub unconnected_cities_threshold: usize,
    pub building_round_limit: u32,
    pub driving_phase_building_budget: u32,
    pub driving_phase_build_interval: u32,
    pub max_rentable_distance: usize,
    pub parallel_fee: u32,
    pub parallel_fee_at_city: u32,
    pub junction_toll: u32,
    pub rent_per_owner: u32,
    /// Payout by finishing rank; its length is the number of payout slots
    pub winning_credits: Vec<i32>,
    pub building_costs: HashMap<TerrainPair, u32>,
    pub driving_costs: HashMap<TerrainPair, u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            dice_sides: DICE_SIDES,
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
            starting_credits: STARTING_CREDITS,
            city_connection_bonus: CITY_CONNECTION_BONUS,
            unconnected_cities_threshold: UNCONNECTED_CITIES_START_THRESHOLD,
            building_round_limit: BUILDING_ROUND_LIMIT,
            driving_phase_building_budget: MAX_BUILDING_BUDGET_DRIVING_PHASE,
            driving_phase_build_interval: DRIVING_PHASE_BUILD_INTERVAL,
            max_rentable_distance: MAX_RENTABLE_DISTANCE,
            parallel_fee: PARALLEL_FEE,
            parallel_fee_at_city: PARALLEL_FEE_AT_CITY,
            junction_toll: JUNCTION_TOLL,
            rent_per_owner: RENT_PER_OWNER,
            winning_credits: WINNING_CREDITS.to_vec(),
            building_costs: default_building_costs(),
            driving_costs: default_driving_costs(),
        }
    }
}

/// Plain-Plain 1, Plain-Mountain 3, Mountain-Mountain 5
pub fn default_building_costs() -> HashMap<TerrainPair, u32> {
    HashMap::from([
        (TerrainPair::new(TileType::Plain, TileType::Plain), 1),
        (TerrainPair::new(TileType::Plain, TileType::Mountain), 3),
        (TerrainPair::new(TileType::Mountain, TileType::Mountain), 5),
    ])
}

/// Plain-Plain 1, Plain-Mountain 2, Mountain-Mountain 3
pub fn default_driving_costs() -> HashMap<TerrainPair, u32> {
    HashMap::from([
        (TerrainPair::new(TileType::Plain, TileType::Plain), 1),
        (TerrainPair::new(TileType::Plain, TileType::Mountain), 2),
        (TerrainPair::new(TileType::Mountain, TileType::Mountain), 3),
    ])
}

impl GameConfig {
    /// Check the rule set for values the game loops cannot work with
    pub fn validate(&self) -> GameResult<()> {
        if !(1..=9).contains(&self.dice_sides) {
            return Err(GameError::Configuration(format!(
                "dice must have between 1 and 9 sides, got {}",
                self.dice_sides
            )));
        }
        if self.min_players == 0 || self.min_players > self.max_players {
            return Err(GameError::Configuration(format!(
                "invalid player limits {}..={}",
                self.min_players, self.max_players
            )));
        }
        if self.winning_credits.is_empty() {
            return Err(GameError::Configuration(
                "at least one payout slot is required".to_string(),
            ));
        }
        if self.driving_phase_build_interval == 0 {
            return Err(GameError::Configuration(
                "driving phase build interval must be positive".to_string(),
            ));
        }
        for (pair, cost) in &self.building_costs {
            if *cost == 0 {
                return Err(GameError::Configuration(format!(
                    "building cost for {:?} must be positive",
                    pair
                )));
            }
        }
        for (pair, cost) in &self.driving_costs {
            // A train that can never roll high enough would stall the race
            if *cost == 0 || *cost > self.dice_sides {
                return Err(GameError::Configuration(format!(
                    "driving cost {} for {:?} must be within 1..={}",
                    cost, pair, self.dice_sides
                )));
            }
        }
        Ok(())
    }

    pub fn building_cost(&self, pair: TerrainPair) -> GameResult<u32> {
        self.building_costs.get(&pair).copied().ok_or_else(|| {
            GameError::Configuration(format!("no building cost configured for {:?}", pair))
        })
    }

    pub fn driving_cost(&self, pair: TerrainPair) -> GameResult<u32> {
        self.driving_costs.get(&pair).copied().ok_or_else(|| {
            GameError::Configuration(format!("no driving cost configured for {:?}", pair))
        })
    }

    pub fn payout_slots(&self) -> usize {
        self.winning_credits.len()
    }
}
