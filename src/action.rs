use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::state::Direction;

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    Init,
    UiTerminalResize(u16, u16),

    // Start screen
    StarterSelect(usize),
    StarterConfirm,

    // Map
    Move(Direction),
    MapRefresh,
    MapGenerated(Grid),
    ShopBuy,

    // Battle
    BattleMenuSelect(usize),
    BattleMenuConfirm,
    BattleAttack(usize),
    BattleCatch,
    BattleRun,
    BattleSwitchOpen,
    BattleSwitchClose,
    BattleSwitch(usize),

    Quit,
}
