//! A basic bot player
//!
//! Each bot runs on its own thread, reads the snapshots of its player and
//! answers every wait with one allowed action. It is meant for demos and
//! headless runs, not for playing well.

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use crate::game::{
    ActionSender, GameObserver, PlayerAction, PlayerId, PlayerObjective, PlayerState,
};

/// Forwards each player's snapshots to the bot playing that seat
#[derive(Default)]
pub struct BotObserver {
    channels: Mutex<BTreeMap<PlayerId, Sender<PlayerState>>>,
}

impl BotObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start forwarding snapshots of `player`
    pub fn register(&self, player: PlayerId) -> Receiver<PlayerState> {
        let (sender, receiver) = mpsc::channel();
        if let Ok(mut channels) = self.channels.lock() {
            channels.insert(player, sender);
        }
        receiver
    }

    /// Close every channel so bot threads run out of snapshots
    pub fn close(&self) {
        if let Ok(mut channels) = self.channels.lock() {
            channels.clear();
        }
    }
}

impl GameObserver for BotObserver {
    fn player_state_changed(&self, state: &PlayerState) {
        let Ok(channels) = self.channels.lock() else {
            return;
        };
        if let Some(sender) = channels.get(&state.player) {
            // The bot may already be gone
            let _ = sender.send(state.clone());
        }
    }
}

pub struct BasicBot {
    sender: ActionSender,
    rng: StdRng,
    max_rentable: usize,

    /// A rail choice was sent and no confirm request followed yet
    rails_sent: bool,

    /// Ask for no foreign rails until the next race
    rent_nothing: bool,
}

impl BasicBot {
    pub fn new(sender: ActionSender, seed: u64, max_rentable: usize) -> Self {
        Self {
            sender,
            rng: StdRng::seed_from_u64(seed),
            max_rentable,
            rails_sent: false,
            rent_nothing: false,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.sender.player()
    }

    /// Answer snapshots until the game hangs up
    pub fn run(mut self, snapshots: Receiver<PlayerState>) {
        for state in snapshots {
            if !state.awaiting_action {
                continue;
            }
            let Some(action) = self.decide(&state) else {
                continue;
            };
            trace!("{} bot sends {}", self.player(), action);
            if !self.sender.trigger_action(action) {
                break;
            }
        }
        debug!("{} bot finished", self.player());
    }

    /// Pick an action for the objective in `state`
    pub fn decide(&mut self, state: &PlayerState) -> Option<PlayerAction> {
        match state.objective {
            PlayerObjective::ChooseRails | PlayerObjective::ConfirmPath => {}
            _ => {
                self.rails_sent = false;
                self.rent_nothing = false;
            }
        }

        match state.objective {
            PlayerObjective::RollDice => Some(PlayerAction::RollDice),
            PlayerObjective::PlaceRail => Some(
                match state.buildable_edges.iter().choose(&mut self.rng) {
                    Some(edge) => PlayerAction::BuildRail(vec![*edge]),
                    None => PlayerAction::ConfirmBuild,
                },
            ),
            PlayerObjective::ChooseCities => Some(PlayerAction::ChooseCities),
            PlayerObjective::ChooseRails => {
                if self.rails_sent {
                    // the last choice was rejected
                    self.rent_nothing = true;
                }
                self.rails_sent = true;
                let edges: BTreeSet<_> = if self.rent_nothing {
                    BTreeSet::new()
                } else {
                    state
                        .choosable_edges
                        .iter()
                        .take(self.max_rentable)
                        .copied()
                        .collect()
                };
                Some(PlayerAction::ChooseRails(edges))
            }
            PlayerObjective::ConfirmPath => {
                self.rails_sent = false;
                let affordable = state.rent_due as i32 <= state.credits;
                if state.has_path && !affordable {
                    self.rent_nothing = true;
                    Some(PlayerAction::ConfirmDrive(false))
                } else {
                    Some(PlayerAction::ConfirmDrive(true))
                }
            }
            PlayerObjective::Drive => Self::pick_drive_target(state).map(PlayerAction::Drive),
            PlayerObjective::Idle => None,
        }
    }

    /// The drivable tile furthest along the planned route, or the one
    /// closest to the route's end
    fn pick_drive_target(state: &PlayerState) -> Option<crate::game::TilePosition> {
        let on_route = state
            .drivable_tiles
            .keys()
            .filter_map(|tile| {
                state
                    .planned_route
                    .iter()
                    .position(|step| step == tile)
                    .map(|index| (index, *tile))
            })
            .max_by_key(|(index, _)| *index)
            .map(|(_, tile)| tile);
        if on_route.is_some() {
            return on_route;
        }

        match state.planned_route.last() {
            Some(target) => state
                .drivable_tiles
                .keys()
                .min_by_key(|tile| tile.distance_to(target))
                .copied(),
            None => state.drivable_tiles.keys().next().copied(),
        }
    }
}
