use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::creature::{Creature, Move};

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse game data: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("move {name} has an inverted damage range {min}-{max}")]
    InvalidMove { name: String, min: u16, max: u16 },
    #[error("{name} has invalid health {hp}/{max_hp}")]
    InvalidHealth { name: String, hp: u16, max_hp: u16 },
    #[error("{0} knows no moves")]
    NoMoves(String),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("trainer {0} has no Pokemon")]
    EmptyRoster(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Trainer {
    pub name: String,
    pub roster: Vec<Creature>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Economy {
    pub starting_money: u32,
    pub starting_pokeballs: u32,
    pub pokeball_price: u32,
    pub trainer_reward: u32,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            starting_money: 500,
            starting_pokeballs: 6,
            pokeball_price: 200,
            trainer_reward: 200,
        }
    }
}

/// Read-only templates and prices for a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GameData {
    pub starters: Vec<Creature>,
    pub wild_pool: Vec<Creature>,
    /// Declaration order matters: trainer selection walks it front to back.
    pub trainers: Vec<Trainer>,
    #[serde(default)]
    pub economy: Economy,
}

impl Default for GameData {
    fn default() -> Self {
        Self {
            starters: vec![
                mon("Charmander", 39, &[("Scratch", 5, 9), ("Ember", 6, 10)]),
                mon("Squirtle", 44, &[("Tackle", 5, 9), ("Water Gun", 6, 10)]),
                mon("Bulbasaur", 45, &[("Tackle", 5, 9), ("Vine Whip", 6, 10)]),
            ],
            wild_pool: vec![
                mon("Pidgey", 30, &[("Tackle", 4, 8), ("Gust", 3, 7)]),
                mon("Rattata", 28, &[("Tackle", 4, 8), ("Bite", 5, 9)]),
                mon("Weedle", 22, &[("Tackle", 2, 6)]),
                mon("Pikachu", 32, &[("Tackle", 3, 6), ("Thunder Shock", 6, 10)]),
            ],
            trainers: vec![
                Trainer {
                    name: "Youngster Joe".to_string(),
                    roster: vec![
                        mon("Rattata", 28, &[("Tackle", 4, 8)]),
                        mon("Pidgey", 30, &[("Tackle", 4, 8)]),
                    ],
                },
                Trainer {
                    name: "Ace Trainer Mia".to_string(),
                    roster: vec![
                        mon("Pikachu", 32, &[("Quick Attack", 3, 6), ("Thunder Shock", 6, 10)]),
                        mon("Rattata", 28, &[("Bite", 5, 9)]),
                    ],
                },
            ],
            economy: Economy::default(),
        }
    }
}

impl GameData {
    pub fn from_ron(source: &str) -> Result<Self, DataError> {
        let data: GameData = ron::de::from_str(source)?;
        data.validate()?;
        Ok(data)
    }

    pub fn load(path: &Path) -> Result<Self, DataError> {
        let source = std::fs::read_to_string(path).map_err(|source| DataError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&source)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.starters.is_empty() {
            return Err(DataError::Empty("starters"));
        }
        if self.wild_pool.is_empty() {
            return Err(DataError::Empty("wild_pool"));
        }
        if self.trainers.is_empty() {
            return Err(DataError::Empty("trainers"));
        }
        for trainer in &self.trainers {
            if trainer.roster.is_empty() {
                return Err(DataError::EmptyRoster(trainer.name.clone()));
            }
            trainer.roster.iter().try_for_each(Creature::validate)?;
        }
        self.starters.iter().try_for_each(Creature::validate)?;
        self.wild_pool.iter().try_for_each(Creature::validate)
    }
}

fn mon(name: &str, hp: u16, moves: &[(&str, u16, u16)]) -> Creature {
    Creature {
        name: name.to_string(),
        hp,
        max_hp: hp,
        moves: moves
            .iter()
            .map(|(name, min_damage, max_damage)| Move {
                name: name.to_string(),
                min_damage: *min_damage,
                max_damage: *max_damage,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_data_is_valid() {
        GameData::default().validate().expect("valid defaults");
    }

    #[test]
    fn shipped_asset_matches_builtin_data() {
        let data = GameData::from_ron(include_str!("../assets/kanto.ron")).expect("asset");
        assert_eq!(data, GameData::default());
    }

    #[test]
    fn economy_defaults_when_omitted() {
        let data = GameData::from_ron(
            r#"(
                starters: [(name: "Eevee", hp: 40, max_hp: 40, moves: [(name: "Tackle", min_damage: 4, max_damage: 8)])],
                wild_pool: [(name: "Zubat", hp: 25, max_hp: 25, moves: [(name: "Bite", min_damage: 3, max_damage: 5)])],
                trainers: [(name: "Bug Catcher Rick", roster: [(name: "Caterpie", hp: 20, max_hp: 20, moves: [(name: "Tackle", min_damage: 2, max_damage: 4)])])],
            )"#,
        )
        .expect("parse");
        assert_eq!(data.economy, Economy::default());
        assert_eq!(data.starters[0].name, "Eevee");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = GameData::from_ron(
            r#"(starters: [], wild_pool: [], trainers: [], level_cap: 50)"#,
        );
        assert!(matches!(result, Err(DataError::Parse(_))));
    }

    #[test]
    fn empty_pools_are_rejected() {
        let mut data = GameData::default();
        data.wild_pool.clear();
        assert!(matches!(data.validate(), Err(DataError::Empty("wild_pool"))));
    }

    #[test]
    fn empty_roster_is_rejected() {
        let mut data = GameData::default();
        data.trainers[1].roster.clear();
        assert!(matches!(data.validate(), Err(DataError::EmptyRoster(name)) if name == "Ace Trainer Mia"));
    }

    #[test]
    fn inverted_range_in_pool_is_rejected() {
        let mut data = GameData::default();
        data.wild_pool[0].moves[0].min_damage = 20;
        assert!(matches!(data.validate(), Err(DataError::InvalidMove { .. })));
    }
}
