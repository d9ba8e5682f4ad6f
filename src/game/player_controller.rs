//! Per-player action queue and rule checks
//!
//! A [`PlayerController`] is driven from the game-logic thread: the game
//! controller sets an objective and blocks in
//! [`wait_for_next_action`](PlayerController::wait_for_next_action) until a
//! UI or bot thread pushes an allowed action through an [`ActionSender`].
//! Actions of the wrong kind, and actions failing a rule check, are dropped
//! and the wait continues.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::mpsc::{self, Receiver, Sender};

use super::dice::Dice;
use super::error::{GameError, GameResult};
use super::game_controller::choose_cities;
use super::game_state::{GamePhase, GameState};
use super::objective::{PlayerAction, PlayerObjective};
use super::observer::{GameObserver, PlayerState};
use super::pathfinding::{self, Route};
use super::player::Player;
use super::rail_network::RailNetwork;
use super::types::{EdgeKey, PlayerId, TilePosition};

/// What travels through a player's queue
#[derive(Debug, Clone)]
pub(crate) enum Envelope {
    Action(PlayerAction),
    Stop,
}

/// Cloneable handle for pushing actions into one player's queue
///
/// Never blocks; safe to use from any thread.
#[derive(Debug, Clone)]
pub struct ActionSender {
    player: PlayerId,
    sender: Sender<Envelope>,
}

impl ActionSender {
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Queue an action. Returns false once the controller is gone.
    pub fn trigger_action(&self, action: PlayerAction) -> bool {
        self.sender.send(Envelope::Action(action)).is_ok()
    }

    pub(crate) fn send_stop(&self) {
        // A dropped controller has nothing left to interrupt
        let _ = self.sender.send(Envelope::Stop);
    }
}

/// Everything an action may touch besides the controller itself
pub struct TurnContext<'a> {
    pub state: &'a mut GameState,
    pub dice: &'a mut dyn Dice,
    pub rng: &'a mut StdRng,
    pub observer: &'a dyn GameObserver,
}

/// Controller for one seated player
pub struct PlayerController {
    player: PlayerId,
    sender: Sender<Envelope>,
    receiver: Receiver<Envelope>,
    objective: PlayerObjective,

    /// Remaining building budget for the current building turn
    building_budget: u32,

    /// Foreign edges on the planned path this round
    rented_edges: BTreeSet<EdgeKey>,

    /// Start-to-target path found by the last rail choice
    planned_path: Vec<EdgeKey>,

    has_path: bool,
    has_confirmed_path: bool,
}

impl PlayerController {
    pub fn new(player: PlayerId) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            player,
            sender,
            receiver,
            objective: PlayerObjective::Idle,
            building_budget: 0,
            rented_edges: BTreeSet::new(),
            planned_path: Vec::new(),
            has_path: false,
            has_confirmed_path: false,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn action_sender(&self) -> ActionSender {
        ActionSender {
            player: self.player,
            sender: self.sender.clone(),
        }
    }

    /// Queue an action for this player
    pub fn trigger_action(&self, action: PlayerAction) {
        let _ = self.sender.send(Envelope::Action(action));
    }

    pub fn objective(&self) -> PlayerObjective {
        self.objective
    }

    pub fn set_objective(&mut self, objective: PlayerObjective) {
        self.objective = objective;
    }

    pub fn building_budget(&self) -> u32 {
        self.building_budget
    }

    pub fn set_building_budget(&mut self, amount: u32) {
        self.building_budget = amount;
    }

    pub fn has_path(&self) -> bool {
        self.has_path
    }

    pub fn has_confirmed_path(&self) -> bool {
        self.has_confirmed_path
    }

    pub fn rented_edges(&self) -> &BTreeSet<EdgeKey> {
        &self.rented_edges
    }

    /// Forget last round's path, rentals and confirmation
    pub fn reset_driving_phase(&mut self) {
        self.has_path = false;
        self.has_confirmed_path = false;
        self.rented_edges.clear();
        self.planned_path.clear();
    }

    // Processing actions

    /// Set the objective, then block until an allowed action was executed
    pub fn wait_for_next_action(
        &mut self,
        objective: PlayerObjective,
        ctx: &mut TurnContext<'_>,
    ) -> GameResult<PlayerAction> {
        self.set_objective(objective);
        self.wait_for_allowed_action(ctx)
    }

    /// Block until an action allowed by the current objective was executed
    ///
    /// Only a stop signal ends the wait without an action.
    pub fn wait_for_allowed_action(
        &mut self,
        ctx: &mut TurnContext<'_>,
    ) -> GameResult<PlayerAction> {
        loop {
            ctx.observer
                .player_state_changed(&self.snapshot(ctx.state, true));

            // blocking, waiting for a UI or bot thread
            let action = match self.receiver.recv() {
                Ok(Envelope::Action(action)) => action,
                Ok(Envelope::Stop) | Err(_) => return Err(GameError::Stopped),
            };
            debug!("{} triggered {}", self.player, action);

            if !self.objective.allows(action.kind()) {
                warn!(
                    "{} sent {} while {:?}, allowed: {:?}",
                    self.player,
                    action,
                    self.objective,
                    self.objective.allowed_actions()
                );
                continue;
            }

            match self.execute(&action, ctx) {
                Ok(()) => {
                    ctx.observer
                        .player_state_changed(&self.snapshot(ctx.state, false));
                    ctx.observer
                        .game_state_changed(&ctx.state.view(Some(self.player)));
                    return Ok(action);
                }
                Err(err) if err.is_recoverable() => {
                    warn!("{} {} rejected: {}", self.player, action, err);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn execute(&mut self, action: &PlayerAction, ctx: &mut TurnContext<'_>) -> GameResult<()> {
        match action {
            PlayerAction::RollDice => {
                ctx.state.dice_roll = ctx.dice.roll();
                info!("{} rolled {}", self.player, ctx.state.dice_roll);
                Ok(())
            }
            PlayerAction::BuildRail(path) => self.build_rail(ctx.state, path),
            PlayerAction::ConfirmBuild => Ok(()),
            PlayerAction::ChooseCities => choose_cities(ctx.state, ctx.rng),
            PlayerAction::ChooseRails(edges) => self.choose_edges(ctx.state, edges),
            PlayerAction::ConfirmDrive(accept) => self.confirm_path(ctx.state, *accept),
            PlayerAction::Drive(target) => self.drive(ctx.state, *target),
        }
    }

    // Building

    /// Whether this player could build on `key` right now
    ///
    /// In the building phase the building cost comes out of the budget and
    /// only the parallel fees out of the credits. Otherwise the whole cost is
    /// paid in credits, still capped by the budget of the building sub-round.
    pub fn can_build_rail(&self, state: &GameState, key: &EdgeKey) -> bool {
        match state.player(self.player) {
            Ok(player) => can_build(&state.grid, player, state.phase, self.building_budget, key),
            Err(_) => false,
        }
    }

    /// Edges this player can afford to extend the network with
    pub fn buildable_edges(&self, state: &GameState) -> BTreeSet<EdgeKey> {
        let Ok(player) = state.player(self.player) else {
            return BTreeSet::new();
        };
        state.grid.buildable_edges(self.player, |key| {
            can_build(&state.grid, player, state.phase, self.building_budget, key)
        })
    }

    /// Builds every edge of `path` in order, or none of them
    ///
    /// Each edge must be buildable after the previous ones were built. The
    /// path is played out on a copy of the board first and only committed
    /// when every edge succeeded.
    pub fn build_rail(&mut self, state: &mut GameState, path: &[EdgeKey]) -> GameResult<()> {
        if path.is_empty() {
            return Err(GameError::illegal("empty rail path"));
        }

        let mut grid = state.grid.clone();
        let mut players = state.players().to_vec();
        let mut budget = self.building_budget;
        for key in path {
            build_one(
                &mut grid,
                &mut players,
                self.player,
                state.phase,
                &mut budget,
                key,
            )?;
        }

        state.grid = grid;
        *state.players_mut() = players;
        self.building_budget = budget;
        Ok(())
    }

    // Renting

    /// Foreign rails this player may rent this round
    ///
    /// Grows outward from the player's own network through edges other
    /// players own, at most `min(credits, max_rentable_distance)` edges deep.
    pub fn choosable_edges(&self, state: &GameState) -> BTreeSet<EdgeKey> {
        let credits = state.credits(self.player);
        if credits <= 0 || state.phase != GamePhase::Driving {
            return BTreeSet::new();
        }

        let grid = &state.grid;
        let is_foreign = |key: &EdgeKey| {
            grid.edge(key)
                .is_some_and(|edge| edge.has_rail() && !edge.is_owned_by(self.player))
        };

        let mut choosable: BTreeSet<EdgeKey> = grid
            .rails(self.player)
            .iter()
            .flat_map(|rail| grid.connected_edges(rail))
            .filter(|key| is_foreign(key))
            .collect();

        let max_depth = (credits as usize).min(grid.config().max_rentable_distance);
        let mut queue: VecDeque<(EdgeKey, usize)> =
            choosable.iter().map(|key| (*key, 1)).collect();

        while let Some((key, depth)) = queue.pop_front() {
            if depth + 1 > max_depth {
                continue;
            }
            for next in grid.connected_edges(&key) {
                if is_foreign(&next) && choosable.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }

        choosable
    }

    /// Select foreign edges to rent and look for a start-to-target path
    ///
    /// The path may use the player's own rails and the requested edges. The
    /// foreign edges on that path become the rented edges.
    ///
    /// A rejected choice leaves the previous one in place.
    pub fn choose_edges(&mut self, state: &GameState, edges: &BTreeSet<EdgeKey>) -> GameResult<()> {
        let max = state.grid.config().max_rentable_distance;
        if edges.len() > max {
            return Err(GameError::illegal(format!(
                "cannot rent more than {} edges",
                max
            )));
        }
        if !edges.is_subset(&self.choosable_edges(state)) {
            return Err(GameError::illegal("requested edges are not rentable"));
        }
        let (start, target) = state
            .chosen_pair()
            .ok_or_else(|| GameError::illegal("no cities chosen yet"))?;

        let grid = &state.grid;
        let mut available = grid.rails(self.player);
        available.extend(edges.iter().copied());

        let path = pathfinding::find_path(grid, start, target, &available, driving_cost_fn(grid))?;

        self.has_path = false;
        self.rented_edges.clear();
        self.planned_path.clear();
        if path.is_empty() {
            debug!("{} has no path from {} to {}", self.player, start, target);
            return Ok(());
        }

        self.has_path = true;
        self.rented_edges = path
            .iter()
            .filter(|key| grid.edge(key).is_some_and(|e| !e.is_owned_by(self.player)))
            .copied()
            .collect();
        self.planned_path = path;
        Ok(())
    }

    /// Rent owed to each owner of the currently rented edges
    pub fn rent_charges(&self, state: &GameState) -> GameResult<BTreeMap<PlayerId, u32>> {
        let mut charges = BTreeMap::new();
        for key in &self.rented_edges {
            for (owner, amount) in state.grid.renting_cost(key, self.player)? {
                *charges.entry(owner).or_insert(0) += amount;
            }
        }
        Ok(charges)
    }

    /// Accept or reject the path found by the last rail choice
    ///
    /// Accepting with a path pays the rent and enters the player into the race.
    pub fn confirm_path(&mut self, state: &mut GameState, accept: bool) -> GameResult<()> {
        if !accept {
            self.has_confirmed_path = false;
            return Ok(());
        }

        if self.has_path {
            let charges = self.rent_charges(state)?;
            let total: u32 = charges.values().sum();
            state.player_mut(self.player)?.remove_credits(total as i32)?;
            for (owner, amount) in charges {
                state.player_mut(owner)?.add_credits(amount as i32);
            }
            state.add_driving_player(self.player);
            info!("{} joins the race paying {} rent", self.player, total);
        }

        self.has_confirmed_path = true;
        Ok(())
    }

    // Driving

    pub fn can_drive(&self, state: &GameState) -> bool {
        state.phase == GamePhase::Driving && state.is_driving(self.player)
    }

    /// Tiles this player can move to with the current dice roll
    ///
    /// If the target city is in reach it is the only entry.
    pub fn drivable_tiles(&self, state: &GameState) -> GameResult<BTreeMap<TilePosition, Route>> {
        if !self.can_drive(state) {
            return Ok(BTreeMap::new());
        }
        let Some(position) = state.player_position(self.player) else {
            return Ok(BTreeMap::new());
        };

        let mut available = state.grid.rails(self.player);
        available.extend(
            self.rented_edges
                .iter()
                .filter(|key| state.grid.edge(key).is_some_and(|e| e.has_rail()))
                .copied(),
        );

        let target = state.chosen_pair().map(|(_, target)| target);
        pathfinding::reachable_tiles(&state.grid, position, &available, state.dice_roll, target)
    }

    /// Move the train to `target`, which must be drivable this turn
    pub fn drive(&mut self, state: &mut GameState, target: TilePosition) -> GameResult<()> {
        if !self.can_drive(state) {
            return Err(GameError::illegal(format!("{} is not racing", self.player)));
        }
        let tiles = self.drivable_tiles(state)?;
        let route = tiles
            .get(&target)
            .ok_or_else(|| GameError::illegal(format!("{} cannot reach {}", self.player, target)))?;

        state.set_player_position(self.player, target);
        if state.is_at_target(self.player) {
            let surplus = state.dice_roll as i32 - route.cost as i32;
            state.add_point_surplus(self.player, surplus);
            info!("{} reached the target with {} to spare", self.player, surplus);
        }
        Ok(())
    }

    /// Current view of this player for the presentation layer
    pub fn snapshot(&self, state: &GameState, awaiting_action: bool) -> PlayerState {
        let planned_route = match state.chosen_pair() {
            Some((start, _)) if self.has_path => pathfinding::path_tiles(start, &self.planned_path),
            _ => Vec::new(),
        };
        PlayerState {
            player: self.player,
            objective: self.objective,
            awaiting_action,
            credits: state.credits(self.player),
            building_budget: self.building_budget,
            buildable_edges: self.buildable_edges(state),
            choosable_edges: self.choosable_edges(state),
            rented_edges: self.rented_edges.clone(),
            rent_due: self
                .rent_charges(state)
                .map(|charges| charges.values().sum::<u32>())
                .unwrap_or(0),
            has_path: self.has_path,
            planned_route,
            position: state.player_position(self.player),
            drivable_tiles: self.drivable_tiles(state).unwrap_or_default(),
        }
    }
}

/// Driving cost of a step, as a path search cost function
pub fn driving_cost_fn(
    grid: &RailNetwork,
) -> impl Fn(TilePosition, TilePosition) -> GameResult<u32> + '_ {
    move |from, to| grid.driving_cost(&EdgeKey::new(from, to), &from)
}

fn can_build(
    grid: &RailNetwork,
    player: &Player,
    phase: GamePhase,
    budget: u32,
    key: &EdgeKey,
) -> bool {
    let (Ok(building), Ok(parallel)) = (
        grid.building_cost(key),
        grid.total_parallel_cost(key, player.id),
    ) else {
        return false;
    };
    if building > budget {
        return false;
    }
    match phase {
        GamePhase::Building => player.can_afford(parallel as i32),
        GamePhase::Driving => player.can_afford((building + parallel) as i32),
    }
}

fn find_player(players: &[Player], id: PlayerId) -> GameResult<&Player> {
    players
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| GameError::illegal(format!("unknown player {}", id)))
}

fn find_player_mut(players: &mut [Player], id: PlayerId) -> GameResult<&mut Player> {
    players
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| GameError::illegal(format!("unknown player {}", id)))
}

/// Builds a single edge on the given board, paying fees and collecting the
/// city bonus
fn build_one(
    grid: &mut RailNetwork,
    players: &mut [Player],
    builder: PlayerId,
    phase: GamePhase,
    budget: &mut u32,
    key: &EdgeKey,
) -> GameResult<()> {
    {
        let player = find_player(players, builder)?;
        let buildable = grid.buildable_edges(builder, |k| can_build(grid, player, phase, *budget, k));
        if !buildable.contains(key) {
            return Err(GameError::illegal(format!(
                "{} cannot build on {}",
                builder, key
            )));
        }
    }

    let building_cost = grid.building_cost(key)?;
    let fees = grid.parallel_cost(key, builder)?;
    let parallel_cost: u32 = fees.values().sum();
    let connects_new_city = key.positions().iter().any(|position| {
        grid.city_at(position)
            .is_some_and(|city| !city.is_starting_city)
            && !grid.is_city_connected(position)
    });

    if !grid.add_rail(key, builder) {
        return Err(GameError::illegal(format!(
            "{} cannot connect a rail at {}",
            builder, key
        )));
    }

    let charge = match phase {
        GamePhase::Building => parallel_cost,
        GamePhase::Driving => building_cost + parallel_cost,
    };
    find_player_mut(players, builder)?.remove_credits(charge as i32)?;
    for (owner, fee) in fees {
        find_player_mut(players, owner)?.add_credits(fee as i32);
    }
    *budget = budget.saturating_sub(building_cost);

    if connects_new_city {
        let bonus = grid.config().city_connection_bonus;
        find_player_mut(players, builder)?.add_credits(bonus);
        info!("{} connected a new city on {} (+{})", builder, key, bonus);
    }

    debug!(
        "{} built {} for {} budget and {} credits",
        builder, key, building_cost, charge
    );
    Ok(())
}
