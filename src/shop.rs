use crate::grid::Cell;
use crate::refusal::Refusal;
use crate::state::{AppState, Screen};

/// Buys one Pokéball at the mart the player is standing on.
pub fn buy_pokeball(state: &mut AppState) -> Result<(), Refusal> {
    if state.screen != Screen::Map || state.current_cell() != Some(Cell::Mart) {
        return Err(Refusal::NoMart);
    }
    let price = state.data.economy.pokeball_price;
    let Some(left) = state.money.checked_sub(price) else {
        return Err(Refusal::InsufficientFunds);
    };
    state.money = left;
    state.pokeballs = state.pokeballs.saturating_add(1);
    state.log.push("You bought a Pokéball!");
    Ok(())
}
