//! Player actions and the objectives that gate them

use std::collections::BTreeSet;
use std::fmt;

use super::types::{EdgeKey, TilePosition};

/// Everything a human or bot can ask a player controller to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    RollDice,
    /// Build rails along a path, in order
    BuildRail(Vec<EdgeKey>),
    /// End the current building turn
    ConfirmBuild,
    ChooseCities,
    /// Select foreign edges to rent for this round
    ChooseRails(BTreeSet<EdgeKey>),
    /// Accept (true) or reject (false) the computed path
    ConfirmDrive(bool),
    Drive(TilePosition),
}

/// The variant of a [`PlayerAction`] without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    RollDice,
    BuildRail,
    ConfirmBuild,
    ChooseCities,
    ChooseRails,
    ConfirmDrive,
    Drive,
}

impl PlayerAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            PlayerAction::RollDice => ActionKind::RollDice,
            PlayerAction::BuildRail(_) => ActionKind::BuildRail,
            PlayerAction::ConfirmBuild => ActionKind::ConfirmBuild,
            PlayerAction::ChooseCities => ActionKind::ChooseCities,
            PlayerAction::ChooseRails(_) => ActionKind::ChooseRails,
            PlayerAction::ConfirmDrive(_) => ActionKind::ConfirmDrive,
            PlayerAction::Drive(_) => ActionKind::Drive,
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::BuildRail(path) => write!(f, "BuildRail({} edges)", path.len()),
            PlayerAction::ChooseRails(edges) => write!(f, "ChooseRails({} edges)", edges.len()),
            PlayerAction::ConfirmDrive(accept) => write!(f, "ConfirmDrive({})", accept),
            PlayerAction::Drive(tile) => write!(f, "Drive{}", tile),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

/// What the game currently expects from a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayerObjective {
    RollDice,
    PlaceRail,
    ChooseCities,
    ChooseRails,
    ConfirmPath,
    Drive,
    #[default]
    Idle,
}

impl PlayerObjective {
    pub fn allowed_actions(self) -> &'static [ActionKind] {
        match self {
            PlayerObjective::RollDice => &[ActionKind::RollDice],
            PlayerObjective::PlaceRail => &[ActionKind::BuildRail, ActionKind::ConfirmBuild],
            PlayerObjective::ChooseCities => &[ActionKind::ChooseCities],
            PlayerObjective::ChooseRails => &[ActionKind::ChooseRails],
            PlayerObjective::ConfirmPath => &[ActionKind::ConfirmDrive],
            PlayerObjective::Drive => &[ActionKind::Drive],
            PlayerObjective::Idle => &[],
        }
    }

    pub fn allows(self, kind: ActionKind) -> bool {
        self.allowed_actions().contains(&kind)
    }
}
