use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

use crate::battle::{first_living, BattleState};
use crate::creature::Creature;
use crate::data::{GameData, Trainer};
use crate::grid::{Cell, Grid, Position, ROUTE_START};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Screen {
    Start,
    Map,
    Battle,
}

pub const LOG_CAPACITY: usize = 64;
pub const MAP_LOG_WINDOW: usize = 6;
pub const BATTLE_LOG_WINDOW: usize = 8;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MessageLog {
    entries: VecDeque<String>,
}

impl MessageLog {
    pub fn push(&mut self, message: impl Into<String>) {
        if self.entries.len() == LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(message.into());
    }

    /// The newest `count` messages, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &str> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub screen: Screen,
    pub grid: Grid,
    pub player: Position,
    pub party: Vec<Creature>,
    pub battle: Option<BattleState>,
    pub log: MessageLog,
    pub money: u32,
    pub pokeballs: u32,
    pub caught: BTreeSet<String>,
    pub defeated_trainers: BTreeSet<String>,
    pub starter_cursor: usize,
    pub data: GameData,
    pub rng_seed: u64,
}

impl AppState {
    pub fn new(data: GameData, seed: u64) -> Self {
        Self::with_grid(data, seed, Grid::starting_route(), ROUTE_START)
    }

    pub fn with_grid(data: GameData, seed: u64, grid: Grid, player: Position) -> Self {
        Self {
            terminal_size: (80, 24),
            screen: Screen::Start,
            grid,
            player,
            party: Vec::new(),
            battle: None,
            log: MessageLog::default(),
            money: data.economy.starting_money,
            pokeballs: data.economy.starting_pokeballs,
            caught: BTreeSet::new(),
            defeated_trainers: BTreeSet::new(),
            starter_cursor: 0,
            data,
            rng_seed: seed,
        }
    }

    /// First living party member; the one that fights.
    pub fn active_member(&self) -> Option<&Creature> {
        first_living(&self.party).and_then(|idx| self.party.get(idx))
    }

    pub fn current_cell(&self) -> Option<Cell> {
        self.grid.cell(self.player)
    }

    /// The trainer a trainer cell is labelled with. Used for the
    /// "already defeated" check and the cleared marker.
    pub fn trainer_at(&self, pos: Position) -> Option<&Trainer> {
        if self.data.trainers.is_empty() {
            return None;
        }
        let slot = self.grid.trainer_slot(pos)?;
        self.data.trainers.get(slot % self.data.trainers.len())
    }

    pub fn is_trainer_cleared(&self, pos: Position) -> bool {
        self.trainer_at(pos)
            .is_some_and(|trainer| self.defeated_trainers.contains(&trainer.name))
    }

    pub fn heal_party(&mut self) {
        self.party.iter_mut().for_each(Creature::heal);
    }
}
