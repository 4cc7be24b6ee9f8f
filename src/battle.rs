use std::collections::BTreeSet;

use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::creature::{Creature, Move};
use crate::data::Trainer;
use crate::dice::Dice;
use crate::grid::Cell;
use crate::refusal::Refusal;
use crate::state::{AppState, Screen};

pub const ENCOUNTER_CHANCE: f64 = 0.45;
pub const RUN_CHANCE: f64 = 0.70;
const CATCH_BASE: f64 = 0.45;
const CATCH_FLOOR: f64 = 0.10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum BattleKind {
    Wild,
    Trainer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum BattlePhase {
    AwaitingPlayerMove,
    ResolvingEnemyTurn,
    Won,
    Lost,
    Fled,
    Caught,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum BattleOutcome {
    Won,
    Lost,
    Fled,
    Caught,
}

impl BattlePhase {
    pub fn outcome(self) -> Option<BattleOutcome> {
        match self {
            BattlePhase::AwaitingPlayerMove | BattlePhase::ResolvingEnemyTurn => None,
            BattlePhase::Won => Some(BattleOutcome::Won),
            BattlePhase::Lost => Some(BattleOutcome::Lost),
            BattlePhase::Fled => Some(BattleOutcome::Fled),
            BattlePhase::Caught => Some(BattleOutcome::Caught),
        }
    }

    pub fn is_over(self) -> bool {
        self.outcome().is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BattleState {
    pub kind: BattleKind,
    pub trainer: Option<String>,
    pub enemies: Vec<Creature>,
    pub active_enemy: usize,
    pub phase: BattlePhase,
    /// Highlighted entry of the command menu or the switch picker.
    pub cursor: usize,
    pub switching: bool,
}

impl BattleState {
    pub fn wild(wild: Creature) -> Self {
        Self::new(BattleKind::Wild, None, vec![wild])
    }

    pub fn trainer(trainer: &Trainer) -> Self {
        Self::new(
            BattleKind::Trainer,
            Some(trainer.name.clone()),
            trainer.roster.iter().map(Creature::spawn).collect(),
        )
    }

    fn new(kind: BattleKind, trainer: Option<String>, enemies: Vec<Creature>) -> Self {
        Self {
            kind,
            trainer,
            enemies,
            active_enemy: 0,
            phase: BattlePhase::AwaitingPlayerMove,
            cursor: 0,
            switching: false,
        }
    }

    pub fn enemy(&self) -> Option<&Creature> {
        self.enemies.get(self.active_enemy)
    }

    pub fn all_enemies_fainted(&self) -> bool {
        self.enemies.iter().all(Creature::is_fainted)
    }

    pub fn trainer_name(&self) -> &str {
        self.trainer.as_deref().unwrap_or("Trainer")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattleCommand {
    Attack(usize),
    Catch,
    Run,
    Switch,
}

/// Command menu in display order: the active member's moves, then Catch and
/// Run in wild battles, then Switch. Empty when nobody can fight.
pub fn commands(battle: &BattleState, party: &[Creature]) -> Vec<BattleCommand> {
    let Some(active) = first_living(party).and_then(|idx| party.get(idx)) else {
        return Vec::new();
    };
    let mut commands: Vec<BattleCommand> =
        (0..active.moves.len()).map(BattleCommand::Attack).collect();
    if battle.kind == BattleKind::Wild {
        commands.extend([BattleCommand::Catch, BattleCommand::Run]);
    }
    commands.push(BattleCommand::Switch);
    commands
}

pub fn first_living(party: &[Creature]) -> Option<usize> {
    party.iter().position(|member| !member.is_fainted())
}

/// 0.55 at zero health down to 0.10 at full health.
pub fn catch_chance(wild: &Creature) -> f64 {
    CATCH_BASE * (1.0 - wild.health_fraction()) + CATCH_FLOOR
}

/// First trainer not yet beaten, in declaration order. Once every trainer
/// is beaten the first one is up for a rematch.
pub fn pick_trainer<'a>(
    trainers: &'a [Trainer],
    defeated: &BTreeSet<String>,
) -> Option<&'a Trainer> {
    trainers
        .iter()
        .find(|trainer| !defeated.contains(&trainer.name))
        .or_else(|| trainers.first())
}

pub fn start_wild(state: &mut AppState, dice: &mut impl Dice) {
    let idx = dice.pick(state.data.wild_pool.len());
    let Some(template) = state.data.wild_pool.get(idx) else {
        return;
    };
    let wild = Creature::spawn(template);
    state.log.push(format!("A wild {} appeared!", wild.name));
    state.battle = Some(BattleState::wild(wild));
    state.screen = Screen::Battle;
}

pub fn start_trainer(state: &mut AppState) {
    let Some(trainer) = pick_trainer(&state.data.trainers, &state.defeated_trainers) else {
        return;
    };
    let battle = BattleState::trainer(trainer);
    let message = format!("Trainer {} challenges you!", trainer.name);
    state.log.push(message);
    state.battle = Some(battle);
    state.screen = Screen::Battle;
}

fn strike(attacker: &str, mv: &Move, defender: &mut Creature, dice: &mut impl Dice) -> String {
    let damage = dice.between(mv.min_damage, mv.max_damage);
    let left = defender.take_damage(damage);
    debug!("{attacker} -> {}: {} for {damage}, {left} left", defender.name, mv.name);
    format!("{attacker} used {}! It dealt {damage} damage.", mv.name)
}

fn awaiting_move(state: &AppState) -> bool {
    state
        .battle
        .as_ref()
        .is_some_and(|battle| battle.phase == BattlePhase::AwaitingPlayerMove)
}

/// The active member uses its move at `move_index`. Returns false when
/// nothing happened (no battle, nobody able to fight, unknown move).
pub fn attack(state: &mut AppState, move_index: usize, dice: &mut impl Dice) -> bool {
    if !awaiting_move(state) {
        return false;
    }
    let Some(active) = first_living(&state.party) else {
        return false;
    };
    let Some(battle) = state.battle.as_mut() else {
        return false;
    };
    let attacker = &state.party[active];
    let Some(mv) = attacker.moves.get(move_index) else {
        return false;
    };
    let Some(enemy) = battle.enemies.get_mut(battle.active_enemy) else {
        return false;
    };
    let message = strike(&attacker.name, mv, enemy, dice);
    let fainted = enemy.is_fainted().then(|| enemy.name.clone());
    state.log.push(message);

    match fainted {
        Some(name) => {
            state.log.push(format!("{name} fainted!"));
            if !evaluate_end(state) {
                send_out_next(state);
            }
        }
        None => {
            enemy_turn(state, dice);
            evaluate_end(state);
        }
    }
    true
}

fn send_out_next(state: &mut AppState) {
    let Some(battle) = state.battle.as_mut() else {
        return;
    };
    if battle.kind != BattleKind::Trainer || battle.active_enemy + 1 >= battle.enemies.len() {
        return;
    }
    battle.active_enemy += 1;
    if let Some(next) = battle.enemy() {
        state.log.push(format!("Trainer sends out {}!", next.name));
    }
}

/// The active enemy hits the first living party member with a random move.
/// The phase stays ResolvingEnemyTurn until `evaluate_end` settles it.
fn enemy_turn(state: &mut AppState, dice: &mut impl Dice) {
    let Some(target) = first_living(&state.party) else {
        return;
    };
    let Some(battle) = state.battle.as_mut() else {
        return;
    };
    let Some(enemy) = battle.enemies.get(battle.active_enemy) else {
        return;
    };
    if enemy.is_fainted() {
        return;
    }
    let Some(mv) = enemy.moves.get(dice.pick(enemy.moves.len())) else {
        return;
    };
    battle.phase = BattlePhase::ResolvingEnemyTurn;

    let defender = &mut state.party[target];
    let message = strike(&enemy.name, mv, defender, dice);
    state.log.push(message);
    if defender.is_fainted() {
        state.log.push(format!("Your {} fainted!", defender.name));
    }
}

/// Checks for a party wipe, then for a beaten enemy side. A wipe wins even
/// if the enemy went down in the same step. Returns true when the battle
/// is over; otherwise the player is up again.
pub fn evaluate_end(state: &mut AppState) -> bool {
    let over = settle(state);
    if !over {
        set_phase(state, BattlePhase::AwaitingPlayerMove);
    }
    over
}

fn settle(state: &mut AppState) -> bool {
    let Some(battle) = state.battle.as_ref() else {
        return false;
    };
    let enemies_down = battle.all_enemies_fainted();
    let party_down = state.party.iter().all(Creature::is_fainted);

    if party_down {
        state
            .log
            .push("All your Pokémon fainted! You hurry back to the Pokémon Center.");
        if let Some(center) = state.grid.first(Cell::Center) {
            state.player = center;
        }
        state.heal_party();
        set_phase(state, BattlePhase::Lost);
        return true;
    }

    if !enemies_down {
        return false;
    }

    let Some(battle) = state.battle.as_mut() else {
        return false;
    };
    match battle.kind {
        BattleKind::Wild => {
            let name = battle.enemy().map(|e| e.name.as_str()).unwrap_or("Pokémon");
            state.log.push(format!("You defeated the wild {name}!"));
        }
        BattleKind::Trainer => {
            let name = battle.trainer_name().to_string();
            let reward = state.data.economy.trainer_reward;
            state.money = state.money.saturating_add(reward);
            state.log.push(format!("You defeated Trainer {name}!"));
            state.log.push(format!("You won {reward} Pokédollars!"));
            state.defeated_trainers.insert(name);
        }
    }
    battle.phase = BattlePhase::Won;
    true
}

fn set_phase(state: &mut AppState, phase: BattlePhase) {
    if let Some(battle) = state.battle.as_mut() {
        battle.phase = phase;
    }
}

pub fn throw_ball(state: &mut AppState, dice: &mut impl Dice) -> Result<bool, Refusal> {
    if !awaiting_move(state) {
        return Ok(false);
    }
    let Some(battle) = state.battle.as_mut() else {
        return Ok(false);
    };
    if battle.kind == BattleKind::Trainer {
        return Err(Refusal::TrainerOwned);
    }
    if state.pokeballs == 0 {
        return Err(Refusal::NoPokeballs);
    }
    let Some(wild) = battle.enemy() else {
        return Ok(false);
    };
    state.pokeballs -= 1;

    let chance = catch_chance(wild);
    let roll = dice.roll();
    debug!("catch roll {roll:.3} against {chance:.3}");
    if roll < chance {
        let caught = Creature::spawn(wild);
        state.log.push(format!("You caught {}!", caught.name));
        state.caught.insert(caught.name.clone());
        state.party.push(caught);
        battle.phase = BattlePhase::Caught;
    } else {
        state.log.push(format!("{} broke free!", wild.name));
        enemy_turn(state, dice);
        evaluate_end(state);
    }
    Ok(true)
}

pub fn run_away(state: &mut AppState, dice: &mut impl Dice) -> Result<bool, Refusal> {
    if !awaiting_move(state) {
        return Ok(false);
    }
    let Some(battle) = state.battle.as_mut() else {
        return Ok(false);
    };
    if battle.kind == BattleKind::Trainer {
        return Err(Refusal::TrainerBattle);
    }
    if dice.chance(RUN_CHANCE) {
        state.log.push("You successfully ran away!");
        battle.phase = BattlePhase::Fled;
    } else {
        state.log.push("Couldn't escape!");
        enemy_turn(state, dice);
        evaluate_end(state);
    }
    Ok(true)
}

/// Moves a living member to the front of the party. Free action.
pub fn switch(state: &mut AppState, index: usize) -> Result<bool, Refusal> {
    let Some(member) = state.party.get(index) else {
        return Ok(false);
    };
    if member.is_fainted() {
        return Err(Refusal::Fainted(member.name.clone()));
    }
    let member = state.party.remove(index);
    state.log.push(format!("You switched to {}.", member.name));
    state.party.insert(0, member);
    Ok(true)
}

/// Leaves a finished battle: back to the map, enemy side dropped.
pub fn conclude(state: &mut AppState) -> Option<BattleOutcome> {
    let outcome = state.battle.as_ref()?.phase.outcome()?;
    state.battle = None;
    state.screen = Screen::Map;
    Some(outcome)
}
