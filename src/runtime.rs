use std::collections::VecDeque;

use log::debug;
use tui_dispatch::EffectStore;

use crate::action::Action;
use crate::dice::SeededDice;
use crate::effect::Effect;
use crate::grid::Grid;
use crate::state::AppState;

pub type Store = EffectStore<AppState, Action, Effect>;

/// Dispatches `action` and every action its effects produce, in order.
/// Returns true if any of them changed the state.
pub fn dispatch_action(store: &mut Store, action: Action) -> bool {
    let mut queue = VecDeque::from([action]);
    let mut changed = false;

    while let Some(next_action) = queue.pop_front() {
        let result = store.dispatch(next_action);
        changed |= result.changed;
        for effect in result.effects {
            handle_effect(effect, &mut queue);
        }
    }
    changed
}

pub fn handle_effect(effect: Effect, queue: &mut VecDeque<Action>) {
    match effect {
        Effect::GenerateMap { seed, rows, cols } => {
            let grid = Grid::generate(&mut SeededDice::new(seed), rows, cols);
            queue.push_back(Action::MapGenerated(grid));
        }
        Effect::BattleEnded { outcome } => debug!("back on the map after {outcome:?}"),
    }
}
