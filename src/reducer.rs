use log::{info, warn};
use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::battle::{self, BattleCommand, ENCOUNTER_CHANCE};
use crate::creature::Creature;
use crate::dice::{Dice, SeededDice};
use crate::effect::Effect;
use crate::grid::{Cell, Grid, Position};
use crate::refusal::Refusal;
use crate::shop;
use crate::state::{AppState, Direction, Screen};

/// Every random draw of one dispatch comes from `state.rng_seed`; the seed
/// only advances when the state changed.
pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    let mut dice = SeededDice::new(state.rng_seed);
    let result = reduce(state, action, &mut dice);
    if result.changed {
        state.rng_seed = dice.next_seed();
    }
    result
}

fn reduce(state: &mut AppState, action: Action, dice: &mut impl Dice) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            if state.party.is_empty() {
                state.screen = Screen::Start;
                state.starter_cursor = 0;
            }
            DispatchResult::changed()
        }
        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        // Start screen
        Action::StarterSelect(index) => {
            if state.screen != Screen::Start
                || index >= state.data.starters.len()
                || index == state.starter_cursor
            {
                return DispatchResult::unchanged();
            }
            state.starter_cursor = index;
            DispatchResult::changed()
        }
        Action::StarterConfirm => confirm_starter(state),

        // Map
        Action::Move(direction) => move_player(state, direction, dice),
        Action::MapRefresh => {
            if state.screen != Screen::Map {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed_with(Effect::GenerateMap {
                seed: state.rng_seed,
                rows: state.grid.rows,
                cols: state.grid.cols,
            })
        }
        Action::MapGenerated(grid) => install_grid(state, grid),
        Action::ShopBuy => match shop::buy_pokeball(state) {
            Ok(()) => DispatchResult::changed(),
            Err(refusal) => refuse(state, refusal),
        },

        // Battle
        Action::BattleMenuSelect(index) => select_menu_entry(state, index),
        Action::BattleMenuConfirm => confirm_menu_entry(state, dice),
        Action::BattleAttack(move_index) => {
            if battle::attack(state, move_index, dice) {
                finish_turn(state)
            } else {
                DispatchResult::unchanged()
            }
        }
        Action::BattleCatch => match battle::throw_ball(state, dice) {
            Ok(true) => finish_turn(state),
            Ok(false) => DispatchResult::unchanged(),
            Err(refusal) => refuse(state, refusal),
        },
        Action::BattleRun => match battle::run_away(state, dice) {
            Ok(true) => finish_turn(state),
            Ok(false) => DispatchResult::unchanged(),
            Err(refusal) => refuse(state, refusal),
        },
        Action::BattleSwitchOpen => {
            let Some(battle) = state.battle.as_mut() else {
                return DispatchResult::unchanged();
            };
            if battle.switching {
                return DispatchResult::unchanged();
            }
            battle.switching = true;
            battle.cursor = 0;
            DispatchResult::changed()
        }
        Action::BattleSwitchClose => {
            let Some(battle) = state.battle.as_mut() else {
                return DispatchResult::unchanged();
            };
            if !battle.switching {
                return DispatchResult::unchanged();
            }
            battle.switching = false;
            battle.cursor = 0;
            DispatchResult::changed()
        }
        Action::BattleSwitch(index) => switch_member(state, index),

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn refuse(state: &mut AppState, refusal: Refusal) -> DispatchResult<Effect> {
    state.log.push(refusal.to_string());
    DispatchResult::changed()
}

fn confirm_starter(state: &mut AppState) -> DispatchResult<Effect> {
    if state.screen != Screen::Start {
        return DispatchResult::unchanged();
    }
    let Some(template) = state.data.starters.get(state.starter_cursor) else {
        return DispatchResult::unchanged();
    };
    let starter = Creature::spawn(template);
    info!("starter picked: {}", starter.name);
    state.log.push(format!("You picked {}!", starter.name));
    state.party = vec![starter];
    state.screen = Screen::Map;
    DispatchResult::changed()
}

fn move_player(
    state: &mut AppState,
    direction: Direction,
    dice: &mut impl Dice,
) -> DispatchResult<Effect> {
    if state.screen != Screen::Map {
        return DispatchResult::unchanged();
    }
    let Some(next) = state.grid.step(state.player, direction) else {
        return DispatchResult::unchanged();
    };
    state.player = next;

    match state.grid.cell(next).unwrap_or(Cell::Empty) {
        Cell::Center => {
            state.heal_party();
            state.log.push("You healed your party at the Pokémon Center!");
        }
        Cell::Trainer => {
            if state.is_trainer_cleared(next) {
                state.log.push("This trainer has already been defeated.");
            } else {
                battle::start_trainer(state);
            }
        }
        Cell::Grass => {
            if dice.chance(ENCOUNTER_CHANCE) {
                battle::start_wild(state, dice);
            } else {
                state
                    .log
                    .push("You walk through the grass... but nothing happened.");
            }
        }
        Cell::Mart => {
            state
                .log
                .push("Welcome to the Poké Mart! Press B to buy a Pokéball.");
        }
        Cell::Empty => state.log.push("You moved."),
    }
    DispatchResult::changed()
}

fn install_grid(state: &mut AppState, grid: Grid) -> DispatchResult<Effect> {
    let expected = grid.rows as usize * grid.cols as usize;
    if expected == 0 || grid.cells.len() != expected {
        warn!("ignoring malformed {}x{} grid", grid.rows, grid.cols);
        return DispatchResult::unchanged();
    }
    state.player = Position::new(
        state.player.row.min(grid.rows - 1),
        state.player.col.min(grid.cols - 1),
    );
    info!(
        "map regenerated: {}x{}, {} grass, {} trainers",
        grid.rows,
        grid.cols,
        grid.count(Cell::Grass),
        grid.count(Cell::Trainer)
    );
    state.grid = grid;
    state.log.push("The map has been refreshed!");
    DispatchResult::changed()
}

fn menu_len(state: &AppState) -> usize {
    match state.battle.as_ref() {
        Some(battle) if battle.switching => state.party.len(),
        Some(battle) => battle::commands(battle, &state.party).len(),
        None => 0,
    }
}

fn select_menu_entry(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    let len = menu_len(state);
    let Some(battle) = state.battle.as_mut() else {
        return DispatchResult::unchanged();
    };
    if index >= len || index == battle.cursor {
        return DispatchResult::unchanged();
    }
    battle.cursor = index;
    DispatchResult::changed()
}

fn confirm_menu_entry(state: &mut AppState, dice: &mut impl Dice) -> DispatchResult<Effect> {
    let Some(battle) = state.battle.as_ref() else {
        return DispatchResult::unchanged();
    };
    if battle.switching {
        let index = battle.cursor;
        return reduce(state, Action::BattleSwitch(index), dice);
    }
    let next = match battle::commands(battle, &state.party).get(battle.cursor) {
        Some(BattleCommand::Attack(move_index)) => Action::BattleAttack(*move_index),
        Some(BattleCommand::Catch) => Action::BattleCatch,
        Some(BattleCommand::Run) => Action::BattleRun,
        Some(BattleCommand::Switch) => Action::BattleSwitchOpen,
        None => return DispatchResult::unchanged(),
    };
    reduce(state, next, dice)
}

fn switch_member(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    if state.screen != Screen::Battle || state.battle.is_none() {
        return DispatchResult::unchanged();
    }
    match battle::switch(state, index) {
        Ok(true) => {
            if let Some(battle) = state.battle.as_mut() {
                battle.switching = false;
                battle.cursor = 0;
            }
            DispatchResult::changed()
        }
        Ok(false) => {
            warn!("no party member at slot {index}");
            DispatchResult::unchanged()
        }
        Err(refusal) => refuse(state, refusal),
    }
}

/// Leaves the battle screen once the battle reached a terminal phase.
fn finish_turn(state: &mut AppState) -> DispatchResult<Effect> {
    let len = menu_len(state);
    if let Some(battle) = state.battle.as_mut() {
        battle.cursor = battle.cursor.min(len.saturating_sub(1));
    }
    match battle::conclude(state) {
        Some(outcome) => {
            info!("battle over: {outcome:?}");
            DispatchResult::changed_with(Effect::BattleEnded { outcome })
        }
        None => DispatchResult::changed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::{BattleOutcome, BattleState};
    use crate::creature::Move;
    use crate::data::GameData;
    use crate::dice::scripted::ScriptedDice;
    use pretty_assertions::assert_eq;

    fn on_map() -> AppState {
        let mut state = AppState::new(GameData::default(), 42);
        reducer(&mut state, Action::StarterConfirm);
        state
    }

    fn heavy_hitter() -> Creature {
        Creature::new("Mew", 100, vec![Move::new("Psychic", 50, 50).unwrap()]).unwrap()
    }

    #[test]
    fn starter_confirm_enters_the_map() {
        let mut state = AppState::new(GameData::default(), 42);
        let result = reducer(&mut state, Action::StarterSelect(1));
        assert!(result.changed);
        reducer(&mut state, Action::StarterConfirm);

        assert_eq!(state.screen, Screen::Map);
        assert_eq!(state.party.len(), 1);
        assert_eq!(state.party[0].name, "Squirtle");
        assert_eq!(state.log.last(), Some("You picked Squirtle!"));
    }

    #[test]
    fn starter_select_ignores_unknown_index() {
        let mut state = AppState::new(GameData::default(), 42);
        let result = reducer(&mut state, Action::StarterSelect(9));
        assert!(!result.changed);
        assert_eq!(state.starter_cursor, 0);
    }

    #[test]
    fn moving_off_the_grid_changes_nothing() {
        let mut state = on_map();
        state.player = Position::new(0, 0);
        let before = state.clone();

        let result = reducer(&mut state, Action::Move(Direction::Up));

        assert!(!result.changed);
        assert_eq!(state, before);
    }

    #[test]
    fn plain_step_logs_a_move() {
        let mut state = on_map();
        reducer(&mut state, Action::Move(Direction::Right));
        assert_eq!(state.player, Position::new(3, 4));
        assert_eq!(state.log.last(), Some("You moved."));
    }

    #[test]
    fn center_heals_the_party() {
        let mut state = on_map();
        state.party[0].hp = 1;
        state.player = Position::new(1, 5);

        reducer(&mut state, Action::Move(Direction::Up));

        assert_eq!(state.party[0].hp, state.party[0].max_hp);
        assert_eq!(
            state.log.last(),
            Some("You healed your party at the Pokémon Center!")
        );
    }

    #[test]
    fn trainer_cell_starts_a_battle_until_cleared() {
        let mut state = on_map();
        state.player = Position::new(3, 5);
        reducer(&mut state, Action::Move(Direction::Up));
        assert_eq!(state.screen, Screen::Battle);
        let battle = state.battle.as_ref().unwrap();
        assert_eq!(battle.trainer.as_deref(), Some("Youngster Joe"));
        assert_eq!(state.log.last(), Some("Trainer Youngster Joe challenges you!"));

        let mut state = on_map();
        state.defeated_trainers.insert("Youngster Joe".to_string());
        state.player = Position::new(3, 5);
        reducer(&mut state, Action::Move(Direction::Up));
        assert_eq!(state.screen, Screen::Map);
        assert_eq!(state.log.last(), Some("This trainer has already been defeated."));
    }

    #[test]
    fn mart_step_shows_the_shop_hint() {
        let mut state = on_map();
        state.player = Position::new(4, 5);
        reducer(&mut state, Action::Move(Direction::Down));
        assert_eq!(
            state.log.last(),
            Some("Welcome to the Poké Mart! Press B to buy a Pokéball.")
        );
        reducer(&mut state, Action::ShopBuy);
        assert_eq!(state.pokeballs, 7);
        assert_eq!(state.money, 300);
    }

    #[test]
    fn grass_is_deterministic_for_a_seed() {
        let mut a = on_map();
        a.player = Position::new(1, 4);
        let mut b = a.clone();

        reducer(&mut a, Action::Move(Direction::Left));
        reducer(&mut b, Action::Move(Direction::Left));

        assert_eq!(a, b);
        let encountered = a.screen == Screen::Battle;
        let last = a.log.last().unwrap_or_default();
        if encountered {
            assert!(last.starts_with("A wild "));
        } else {
            assert_eq!(last, "You walk through the grass... but nothing happened.");
        }
    }

    #[test]
    fn grass_encounter_threshold_is_045() {
        let mut state = on_map();
        state.player = Position::new(1, 4);
        let mut hit = state.clone();

        let mut dice = ScriptedDice::new().rolls([0.44]).picks([2]);
        reduce(&mut hit, Action::Move(Direction::Left), &mut dice);
        assert_eq!(hit.screen, Screen::Battle);
        assert_eq!(hit.battle.as_ref().unwrap().enemies[0].name, "Weedle");
        assert_eq!(hit.log.last(), Some("A wild Weedle appeared!"));

        let mut dice = ScriptedDice::new().rolls([0.45]);
        reduce(&mut state, Action::Move(Direction::Left), &mut dice);
        assert_eq!(state.screen, Screen::Map);
        assert!(state.battle.is_none());
        assert_eq!(
            state.log.last(),
            Some("You walk through the grass... but nothing happened.")
        );
    }

    #[test]
    fn grass_encounters_happen_about_45_percent_of_the_time() {
        let start = on_map();
        let trials = 5000;
        let mut encounters = 0;
        for seed in 0..trials {
            let mut state = start.clone();
            state.player = Position::new(1, 4);
            state.rng_seed = seed;
            reducer(&mut state, Action::Move(Direction::Left));
            if state.screen == Screen::Battle {
                encounters += 1;
            }
        }
        let rate = encounters as f64 / trials as f64;
        assert!((0.42..=0.48).contains(&rate), "encounter rate {rate}");
    }

    #[test]
    fn refusals_land_in_the_log() {
        let mut state = on_map();
        let result = reducer(&mut state, Action::ShopBuy);
        assert!(result.changed);
        assert_eq!(state.log.last(), Some("There's no Poké Mart here."));
        assert_eq!(state.pokeballs, 6);
    }

    #[test]
    fn refresh_round_trips_through_an_effect() {
        let mut state = on_map();
        let result = reducer(&mut state, Action::MapRefresh);
        assert_eq!(result.effects.len(), 1);
        let Effect::GenerateMap { seed, rows, cols } = result.effects[0].clone() else {
            panic!("expected GenerateMap");
        };
        assert_eq!((rows, cols), (6, 6));

        let grid = Grid::generate(&mut SeededDice::new(seed), rows, cols);
        let party = state.party.clone();
        reducer(&mut state, Action::MapGenerated(grid.clone()));

        assert_eq!(state.grid, grid);
        assert_eq!(state.party, party);
        assert_eq!(state.player, Position::new(3, 3));
        assert_eq!(state.log.last(), Some("The map has been refreshed!"));
    }

    #[test]
    fn refresh_is_map_only() {
        let mut state = AppState::new(GameData::default(), 42);
        let result = reducer(&mut state, Action::MapRefresh);
        assert!(!result.changed);
        assert!(result.effects.is_empty());
    }

    #[test]
    fn winning_returns_to_the_map() {
        let mut state = on_map();
        state.party = vec![heavy_hitter()];
        state.screen = Screen::Battle;
        state.battle = Some(BattleState::wild(Creature::spawn(&state.data.wild_pool[2])));

        let result = reducer(&mut state, Action::BattleAttack(0));

        assert_eq!(
            result.effects,
            vec![Effect::BattleEnded {
                outcome: BattleOutcome::Won
            }]
        );
        assert_eq!(state.screen, Screen::Map);
        assert!(state.battle.is_none());
        assert_eq!(state.log.last(), Some("You defeated the wild Weedle!"));
    }

    #[test]
    fn menu_confirm_runs_the_highlighted_command() {
        let mut state = on_map();
        state.party = vec![heavy_hitter(), Creature::spawn(&state.data.starters[0])];
        state.screen = Screen::Battle;
        state.battle = Some(BattleState::wild(Creature::spawn(&state.data.wild_pool[2])));

        // Psychic, Catch, Run, Switch
        reducer(&mut state, Action::BattleMenuSelect(3));
        reducer(&mut state, Action::BattleMenuConfirm);
        assert!(state.battle.as_ref().unwrap().switching);

        reducer(&mut state, Action::BattleMenuSelect(1));
        reducer(&mut state, Action::BattleMenuConfirm);
        let battle = state.battle.as_ref().unwrap();
        assert!(!battle.switching);
        assert_eq!(battle.cursor, 0);
        assert_eq!(state.party[0].name, "Charmander");
        assert_eq!(state.log.last(), Some("You switched to Charmander."));
    }

    #[test]
    fn menu_select_is_bounded() {
        let mut state = on_map();
        state.screen = Screen::Battle;
        state.battle = Some(BattleState::trainer(&state.data.trainers[0]));
        // Scratch, Ember, Switch
        assert!(!reducer(&mut state, Action::BattleMenuSelect(3)).changed);
        assert!(reducer(&mut state, Action::BattleMenuSelect(2)).changed);
    }

    #[test]
    fn switch_outside_battle_is_ignored() {
        let mut state = on_map();
        let result = reducer(&mut state, Action::BattleSwitch(0));
        assert!(!result.changed);
    }

    #[test]
    fn switch_refusal_keeps_the_picker_open() {
        let mut state = on_map();
        let mut fainted = Creature::spawn(&state.data.starters[1]);
        fainted.hp = 0;
        state.party.push(fainted);
        state.screen = Screen::Battle;
        state.battle = Some(BattleState::wild(Creature::spawn(&state.data.wild_pool[0])));
        reducer(&mut state, Action::BattleSwitchOpen);

        reducer(&mut state, Action::BattleSwitch(1));

        assert!(state.battle.as_ref().unwrap().switching);
        assert_eq!(state.log.last(), Some("Can't switch to Squirtle (fainted)."));
        assert_eq!(state.party[0].name, "Charmander");
    }

    #[test]
    fn seed_advances_only_on_change() {
        let mut state = on_map();
        let seed = state.rng_seed;
        reducer(&mut state, Action::BattleRun);
        assert_eq!(state.rng_seed, seed);
        reducer(&mut state, Action::Move(Direction::Right));
        assert_ne!(state.rng_seed, seed);
    }
}
