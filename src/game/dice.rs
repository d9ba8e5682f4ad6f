//! Dice used by the game controller

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of dice rolls; swap in a fixed sequence for tests
pub trait Dice: Send {
    fn roll(&mut self) -> u32;
}

/// Any closure producing numbers works as dice
impl<F> Dice for F
where
    F: FnMut() -> u32 + Send,
{
    fn roll(&mut self) -> u32 {
        self()
    }
}

/// A fair die with a configurable number of sides
pub struct RandomDice {
    sides: u32,
    rng: StdRng,
}

impl RandomDice {
    pub fn new(sides: u32) -> Self {
        Self {
            sides,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a die with a seeded RNG for reproducible games
    pub fn new_with_seed(sides: u32, seed: u64) -> Self {
        Self {
            sides,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Dice for RandomDice {
    fn roll(&mut self) -> u32 {
        self.rng.random_range(1..=self.sides.max(1))
    }
}
