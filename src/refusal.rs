/// An action that was understood but could not be carried out. The state is
/// left untouched and the message lands in the log.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Refusal {
    #[error("No Pokéballs left!")]
    NoPokeballs,
    #[error("You can't catch a trainer's Pokémon!")]
    TrainerOwned,
    #[error("You can't run from a trainer battle!")]
    TrainerBattle,
    #[error("Can't switch to {0} (fainted).")]
    Fainted(String),
    #[error("Not enough money!")]
    InsufficientFunds,
    #[error("There's no Poké Mart here.")]
    NoMart,
}
