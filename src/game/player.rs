//! Players and their credit balance

use super::error::{GameError, GameResult};
use super::types::PlayerId;

/// A seated player
///
/// The rails a player owns are not stored here; ask the network with
/// [`RailNetwork::rails`](super::RailNetwork::rails).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Display color as a hex string, e.g. `#d04040`
    pub color: String,
    pub is_ai: bool,
    credits: i32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, color: impl Into<String>, is_ai: bool) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            is_ai,
            credits: 0,
        }
    }

    pub fn with_credits(mut self, credits: i32) -> Self {
        self.credits = credits;
        self
    }

    pub fn credits(&self) -> i32 {
        self.credits
    }

    /// Check if the player can pay an amount
    pub fn can_afford(&self, amount: i32) -> bool {
        self.credits >= amount
    }

    pub fn add_credits(&mut self, amount: i32) {
        self.credits += amount;
    }

    /// Deduct credits; a payment that would leave a negative balance is
    /// rejected and the balance stays unchanged
    pub fn remove_credits(&mut self, amount: i32) -> GameResult<()> {
        if amount < 0 {
            return Err(GameError::illegal(format!(
                "cannot remove a negative amount ({})",
                amount
            )));
        }
        if !self.can_afford(amount) {
            return Err(GameError::InsufficientCredits {
                player: self.id,
                amount,
                balance: self.credits,
            });
        }
        self.credits -= amount;
        Ok(())
    }
}
