//! Turn orchestration
//!
//! The [`GameController`] owns the game state and runs both phases on the
//! calling thread. Exactly one player is active at a time; the controller
//! sets that player's objective and blocks until an allowed action arrives
//! through the player's queue.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::config::GameConfig;
use super::dice::Dice;
use super::error::{GameError, GameResult};
use super::game_state::{GamePhase, GameState};
use super::objective::{PlayerAction, PlayerObjective};
use super::observer::GameObserver;
use super::player_controller::{ActionSender, PlayerController, TurnContext};
use super::types::{PlayerId, TilePosition};

/// Result of a finished game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    pub winner: Option<PlayerId>,
    /// Final credits in seat order
    pub standings: Vec<(PlayerId, i32)>,
    /// Rounds played in the driving phase
    pub rounds: u32,
}

/// Stops a running game from another thread
#[derive(Debug, Clone)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
    senders: Vec<ActionSender>,
}

impl StopHandle {
    /// Fail every later turn and wake up the player currently waited on
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
        for sender in &self.senders {
            sender.send_stop();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

pub struct GameController {
    state: GameState,
    config: Arc<GameConfig>,

    /// One controller per player, in seat order
    controllers: Vec<PlayerController>,

    dice: Box<dyn Dice>,
    rng: StdRng,
    observer: Arc<dyn GameObserver>,
    stopped: Arc<AtomicBool>,
    active_player: Option<PlayerId>,
}

impl GameController {
    /// Set up a game for the players in `state`
    ///
    /// Fails if the configuration is invalid or the seat count is out of range.
    pub fn new(
        state: GameState,
        dice: impl Dice + 'static,
        observer: Arc<dyn GameObserver>,
    ) -> GameResult<Self> {
        let config = state.grid.shared_config();
        config.validate()?;

        let seats = state.players().len();
        if seats < config.min_players {
            return Err(GameError::InsufficientPlayers {
                required: config.min_players,
                actual: seats,
            });
        }
        if seats > config.max_players {
            return Err(GameError::Configuration(format!(
                "at most {} players allowed, got {}",
                config.max_players, seats
            )));
        }
        let mut ids = state.player_ids();
        ids.sort();
        ids.dedup();
        if ids.len() != seats {
            return Err(GameError::Configuration("duplicate player ids".to_string()));
        }

        let controllers = state
            .player_ids()
            .into_iter()
            .map(PlayerController::new)
            .collect();

        Ok(Self {
            state,
            config,
            controllers,
            dice: Box::new(dice),
            rng: StdRng::from_os_rng(),
            observer,
            stopped: Arc::new(AtomicBool::new(false)),
            active_player: None,
        })
    }

    /// Seed the RNG used for city selection
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn active_player(&self) -> Option<PlayerId> {
        self.active_player
    }

    pub fn controller(&self, player: PlayerId) -> GameResult<&PlayerController> {
        self.controllers
            .iter()
            .find(|pc| pc.player() == player)
            .ok_or_else(|| GameError::illegal(format!("unknown player {}", player)))
    }

    fn controller_mut(&mut self, player: PlayerId) -> GameResult<&mut PlayerController> {
        self.controllers
            .iter_mut()
            .find(|pc| pc.player() == player)
            .ok_or_else(|| GameError::illegal(format!("unknown player {}", player)))
    }

    pub fn action_sender(&self, player: PlayerId) -> GameResult<ActionSender> {
        Ok(self.controller(player)?.action_sender())
    }

    pub fn action_senders(&self) -> Vec<ActionSender> {
        self.controllers.iter().map(PlayerController::action_sender).collect()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            flag: Arc::clone(&self.stopped),
            senders: self.action_senders(),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Run one step with `player` as the active player
    ///
    /// The player's objective is reset to `Idle` and the active marker is
    /// cleared afterwards, whatever the step returned.
    pub fn with_active_player<T, F>(&mut self, player: PlayerId, step: F) -> GameResult<T>
    where
        F: FnOnce(&mut PlayerController, &mut TurnContext<'_>) -> GameResult<T>,
    {
        if self.is_stopped() {
            return Err(GameError::Stopped);
        }
        let seat = self
            .controllers
            .iter()
            .position(|pc| pc.player() == player)
            .ok_or_else(|| GameError::illegal(format!("unknown player {}", player)))?;

        self.active_player = Some(player);
        self.observer.active_player_changed(Some(player));

        let controller = &mut self.controllers[seat];
        let mut ctx = TurnContext {
            state: &mut self.state,
            dice: self.dice.as_mut(),
            rng: &mut self.rng,
            observer: self.observer.as_ref(),
        };
        let result = step(controller, &mut ctx);

        controller.set_objective(PlayerObjective::Idle);
        self.active_player = None;
        self.observer.active_player_changed(None);
        result
    }

    fn publish_state(&self) {
        self.observer
            .game_state_changed(&self.state.view(self.active_player));
    }

    /// Play a whole game: building phase, driving phase, then the winner
    pub fn run(&mut self) -> GameResult<GameOutcome> {
        info!(
            "Starting game with {} players on {} tiles and {} cities",
            self.controllers.len(),
            self.state.grid.tile_count(),
            self.state.grid.city_count()
        );

        self.state.phase = GamePhase::Building;
        self.publish_state();
        self.execute_building_phase()?;

        self.state.phase = GamePhase::Driving;
        self.state.round = 0;
        self.publish_state();
        self.execute_driving_phase()?;

        let winner = self
            .state
            .players()
            .iter()
            .min_by_key(|p| Reverse(p.credits()))
            .map(|p| p.id);
        self.state.winner = winner;
        self.publish_state();

        let standings = self
            .state
            .players()
            .iter()
            .map(|p| (p.id, p.credits()))
            .collect();
        if let Some(winner) = winner {
            info!("{} wins with {} credits", winner, self.state.credits(winner));
        }

        Ok(GameOutcome {
            winner,
            standings,
            rounds: self.state.round,
        })
    }

    // Building phase

    /// Roll and build in turns until few enough cities are unconnected
    pub fn execute_building_phase(&mut self) -> GameResult<()> {
        let threshold = self.config.unconnected_cities_threshold;
        let limit = self.config.building_round_limit;

        while self.state.grid.unconnected_cities().len() > threshold {
            if self.state.round >= limit {
                warn!(
                    "Building phase stopped after {} rounds with {} unconnected cities",
                    self.state.round,
                    self.state.grid.unconnected_cities().len()
                );
                break;
            }
            self.state.round += 1;

            let players = self.state.player_ids();
            let roller_seat = (self.state.round as usize - 1) % players.len();
            self.with_active_player(players[roller_seat], |pc, ctx| {
                pc.wait_for_next_action(PlayerObjective::RollDice, ctx)
            })?;

            let budget = self.state.dice_roll;
            for i in 0..players.len() {
                let player = players[(i + roller_seat) % players.len()];
                self.wait_for_build(player, budget)?;
            }

            debug!("{}", self.state.summary());
        }

        info!(
            "Building phase over after {} rounds, {} cities unconnected",
            self.state.round,
            self.state.grid.unconnected_cities().len()
        );
        Ok(())
    }

    /// Let `player` build until they confirm
    fn wait_for_build(&mut self, player: PlayerId, budget: u32) -> GameResult<()> {
        self.with_active_player(player, |pc, ctx| {
            pc.set_building_budget(budget);
            let mut action = pc.wait_for_next_action(PlayerObjective::PlaceRail, ctx)?;
            while action != PlayerAction::ConfirmBuild {
                action = pc.wait_for_allowed_action(ctx)?;
            }
            Ok(())
        })
    }

    /// Building sub-round of the driving phase, poorest player first
    fn building_during_driving_phase(&mut self) -> GameResult<()> {
        let mut order: Vec<(PlayerId, i32)> = self
            .state
            .players()
            .iter()
            .map(|p| (p.id, p.credits()))
            .collect();
        order.sort_by_key(|(_, credits)| *credits);

        let budget = self.config.driving_phase_building_budget;
        for (player, _) in order {
            self.wait_for_build(player, budget)?;
        }
        Ok(())
    }

    // Driving phase

    /// Race rounds until fewer than two cities are left to choose
    pub fn execute_driving_phase(&mut self) -> GameResult<()> {
        while self.state.unchosen_cities().len() >= 2 {
            self.state.round += 1;
            self.state.reset_driving_players();
            self.state.reset_player_positions();
            self.state.reset_point_surplus();

            if self.state.round % self.config.driving_phase_build_interval == 0 {
                self.building_during_driving_phase()?;
            }

            let players = self.state.player_ids();
            let chooser = players[(self.state.round as usize - 1) % players.len()];
            self.with_active_player(chooser, |pc, ctx| {
                pc.wait_for_next_action(PlayerObjective::ChooseCities, ctx)
            })?;

            self.let_players_choose_path()?;
            self.handle_driving()?;

            let winners = self.winners();
            for (winner, prize) in winners.iter().zip(&self.config.winning_credits) {
                self.state.player_mut(*winner)?.add_credits(*prize);
                info!("{} wins {} credits in round {}", winner, prize, self.state.round);
            }
            if winners.is_empty() {
                info!("Nobody reached the target in round {}", self.state.round);
            }

            self.publish_state();
            debug!("{}", self.state.summary());
        }
        Ok(())
    }

    /// Every player picks rails to rent and confirms or declines the race
    fn let_players_choose_path(&mut self) -> GameResult<()> {
        let (start, _) = self
            .state
            .chosen_pair()
            .ok_or_else(|| GameError::illegal("no cities chosen yet"))?;

        for player in self.state.player_ids() {
            self.controller_mut(player)?.reset_driving_phase();
            self.state.set_player_position(player, start);
            self.with_active_player(player, |pc, ctx| {
                while !pc.has_confirmed_path() {
                    pc.wait_for_next_action(PlayerObjective::ChooseRails, ctx)?;
                    pc.wait_for_next_action(PlayerObjective::ConfirmPath, ctx)?;
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    /// Race the confirmed drivers to the target
    fn handle_driving(&mut self) -> GameResult<()> {
        let Some((_, target)) = self.state.chosen_pair() else {
            return Ok(());
        };
        let drivers = self.state.driving_players().to_vec();

        match drivers.as_slice() {
            [] => return Ok(()),
            [only] => {
                self.state.set_player_position(*only, target);
                info!("{} is the only driver and reaches {} directly", only, target);
                return Ok(());
            }
            _ => {}
        }

        let slots = self.config.payout_slots();
        let penalty = self.config.dice_sides as i32;
        loop {
            let arrived = self.arrived_players(target).len();
            let mut pending: Vec<PlayerId> = drivers
                .iter()
                .copied()
                .filter(|p| self.state.player_position(*p) != Some(target))
                .collect();
            if arrived >= slots || pending.is_empty() {
                break;
            }

            if arrived > 0 {
                for player in &pending {
                    self.state.add_point_surplus(*player, -penalty);
                }
            }

            pending.sort_by_key(|p| Reverse(self.state.credits(*p)));
            for player in pending {
                self.with_active_player(player, |pc, ctx| {
                    pc.wait_for_next_action(PlayerObjective::RollDice, ctx)?;
                    if pc.drivable_tiles(ctx.state)?.is_empty() {
                        info!("{} cannot move with a {}", pc.player(), ctx.state.dice_roll);
                        return Ok(());
                    }
                    pc.wait_for_next_action(PlayerObjective::Drive, ctx)?;
                    Ok(())
                })?;
            }
        }
        Ok(())
    }

    fn arrived_players(&self, target: TilePosition) -> Vec<PlayerId> {
        self.state
            .player_ids()
            .into_iter()
            .filter(|p| self.state.player_position(*p) == Some(target))
            .collect()
    }

    /// Players at the target ranked by surplus, one per payout slot
    ///
    /// Equal surplus keeps seat order.
    pub fn winners(&self) -> Vec<PlayerId> {
        let Some((_, target)) = self.state.chosen_pair() else {
            return Vec::new();
        };
        let mut arrived = self.arrived_players(target);
        arrived.sort_by_key(|p| Reverse(self.state.point_surplus(*p)));
        arrived.truncate(self.config.payout_slots());
        arrived
    }
}

/// Pick a random start and target among the cities not chosen before
pub fn choose_cities(state: &mut GameState, rng: &mut StdRng) -> GameResult<()> {
    let mut candidates: Vec<TilePosition> = state
        .unchosen_cities()
        .iter()
        .map(|city| city.position)
        .collect();
    if candidates.len() < 2 {
        return Err(GameError::illegal("fewer than two cities left to choose"));
    }

    let start = candidates.remove(rng.random_range(0..candidates.len()));
    let target = *candidates
        .choose(rng)
        .ok_or_else(|| GameError::illegal("no target city left"))?;

    state.add_chosen_city(start);
    state.add_chosen_city(target);
    state.set_chosen_pair(start, target);
    if let (Some(from), Some(to)) = (state.starting_city(), state.target_city()) {
        info!("Race from {} {} to {} {}", from.name, start, to.name, target);
    }
    Ok(())
}
