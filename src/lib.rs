//! minipoke - a grid-walking Pokémon game for the terminal
//!
//! The binary is a thin event loop; everything else lives here so the
//! flows can be driven from tests.

pub mod action;
pub mod battle;
pub mod creature;
pub mod data;
pub mod dice;
pub mod effect;
pub mod grid;
pub mod reducer;
pub mod refusal;
pub mod runtime;
pub mod shop;
pub mod state;
pub mod ui;
