//! Assembling rail networks
//!
//! [`RailNetworkBuilder`] turns explicit tiles and cities into a checked
//! [`RailNetwork`]. [`HexagonLayout`] produces a simple random board for the
//! headless binary.

use anyhow::{ensure, Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::config::GameConfig;
use super::error::GameResult;
use super::rail_network::RailNetwork;
use super::types::{roll_number_sequence, City, TilePosition, TileType};

const CITY_NAMES: &[&str] = &[
    "Ashford", "Brackwater", "Coldharbour", "Dunmore", "Eastwick", "Fairhaven", "Glenrock",
    "Highbridge", "Ironvale", "Kingsmoor", "Larkfield", "Millbrook", "Northgate", "Oakhurst",
    "Pinecrest", "Queensferry", "Redcliff", "Stonebury", "Thornbury", "Underhill", "Westmarch",
    "Yarrow",
];

/// Collects tiles and cities, then builds and checks the network
#[derive(Debug, Clone, Default)]
pub struct RailNetworkBuilder {
    tiles: BTreeMap<TilePosition, TileType>,
    cities: Vec<City>,
}

impl RailNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tile(mut self, position: TilePosition, kind: TileType) -> Self {
        self.tiles.insert(position, kind);
        self
    }

    pub fn tiles(mut self, positions: impl IntoIterator<Item = TilePosition>, kind: TileType) -> Self {
        for position in positions {
            self.tiles.insert(position, kind);
        }
        self
    }

    pub fn city(mut self, city: City) -> Self {
        self.cities.push(city);
        self
    }

    /// Build with the given configuration
    ///
    /// Edges are created between every pair of adjacent tiles. Fails if the
    /// configuration is invalid, a city sits outside the map, two cities
    /// share a tile, or an edge has no price in the cost tables.
    pub fn build(self, config: GameConfig) -> GameResult<RailNetwork> {
        self.build_shared(Arc::new(config))
    }

    pub fn build_shared(self, config: Arc<GameConfig>) -> GameResult<RailNetwork> {
        config.validate()?;
        let mut network = RailNetwork::new(config);
        for (position, kind) in self.tiles {
            network.add_tile(position, kind);
        }
        network.connect_adjacent_tiles();
        for city in self.cities {
            network.add_city(city)?;
        }
        network.check_cost_tables()?;
        Ok(network)
    }
}

/// Hexagonal board with randomly placed mountains and cities
#[derive(Debug, Clone)]
pub struct HexagonLayout {
    pub radius: u32,
    pub cities: usize,
    pub starting_cities: usize,
    /// Chance for a non-city tile to be a mountain
    pub mountain_ratio: f64,
    pub seed: u64,
}

impl Default for HexagonLayout {
    fn default() -> Self {
        Self {
            radius: 4,
            cities: 10,
            starting_cities: 3,
            mountain_ratio: 0.2,
            seed: 0,
        }
    }
}

impl HexagonLayout {
    pub fn build(&self, config: GameConfig) -> Result<RailNetwork> {
        let positions = TilePosition::ORIGIN.spiral(self.radius);
        ensure!(
            self.cities <= positions.len(),
            "{} cities do not fit on {} tiles",
            self.cities,
            positions.len()
        );
        ensure!(
            self.starting_cities <= self.cities,
            "more starting cities ({}) than cities ({})",
            self.starting_cities,
            self.cities
        );
        ensure!(
            (0.0..=1.0).contains(&self.mountain_ratio),
            "mountain ratio {} is not a probability",
            self.mountain_ratio
        );

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut city_sites = positions.clone();
        city_sites.shuffle(&mut rng);
        city_sites.truncate(self.cities);

        let mut builder = RailNetworkBuilder::new();
        for position in &positions {
            let kind = if !city_sites.contains(position) && rng.random_bool(self.mountain_ratio) {
                TileType::Mountain
            } else {
                TileType::Plain
            };
            builder = builder.tile(*position, kind);
        }

        let mut roll_numbers = roll_number_sequence(config.dice_sides);
        for (i, position) in city_sites.iter().enumerate() {
            let name = match CITY_NAMES.get(i) {
                Some(name) => name.to_string(),
                None => format!("Town {}", i + 1),
            };
            let is_starting = i < self.starting_cities;
            let mut city = City::new(*position, name, is_starting);
            if let Some(number) = roll_numbers.next() {
                city = city.with_roll_numbers([number]);
            }
            builder = builder.city(city);
        }

        builder
            .build(config)
            .with_context(|| format!("failed to assemble hexagon board of radius {}", self.radius))
    }
}
