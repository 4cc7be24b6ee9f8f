use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::data::DataError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Move {
    pub name: String,
    pub min_damage: u16,
    pub max_damage: u16,
}

impl Move {
    pub fn new(name: &str, min_damage: u16, max_damage: u16) -> Result<Self, DataError> {
        let mv = Self {
            name: name.to_string(),
            min_damage,
            max_damage,
        };
        mv.validate()?;
        Ok(mv)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.min_damage > self.max_damage {
            return Err(DataError::InvalidMove {
                name: self.name.clone(),
                min: self.min_damage,
                max: self.max_damage,
            });
        }
        Ok(())
    }

    /// Button label, e.g. `Tackle (4-8)`.
    pub fn label(&self) -> String {
        format!("{} ({}-{})", self.name, self.min_damage, self.max_damage)
    }
}

/// A single Pokemon. Templates in [`crate::data::GameData`] and the
/// instances fighting in battles share this type; instances are always
/// produced with [`Creature::spawn`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Creature {
    pub name: String,
    pub hp: u16,
    pub max_hp: u16,
    pub moves: Vec<Move>,
}

impl Creature {
    pub fn new(name: &str, max_hp: u16, moves: Vec<Move>) -> Result<Self, DataError> {
        let creature = Self {
            name: name.to_string(),
            hp: max_hp,
            max_hp,
            moves,
        };
        creature.validate()?;
        Ok(creature)
    }

    /// Owned copy of `template` at full health.
    pub fn spawn(template: &Creature) -> Self {
        let mut creature = template.clone();
        creature.heal();
        creature
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.max_hp == 0 || self.hp > self.max_hp {
            return Err(DataError::InvalidHealth {
                name: self.name.clone(),
                hp: self.hp,
                max_hp: self.max_hp,
            });
        }
        if self.moves.is_empty() {
            return Err(DataError::NoMoves(self.name.clone()));
        }
        self.moves.iter().try_for_each(Move::validate)
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    /// Subtracts `amount`, flooring at zero. Returns the health left.
    pub fn take_damage(&mut self, amount: u16) -> u16 {
        self.hp = self.hp.saturating_sub(amount).min(self.max_hp);
        self.hp
    }

    pub fn heal(&mut self) {
        self.hp = self.max_hp;
    }

    /// Current health as a fraction of max; 0 when max is 0.
    pub fn health_fraction(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.hp as f64 / self.max_hp as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weedle() -> Creature {
        Creature::new("Weedle", 22, vec![Move::new("Tackle", 2, 6).unwrap()]).unwrap()
    }

    #[test]
    fn damage_floors_at_zero() {
        let mut mon = weedle();
        assert_eq!(mon.take_damage(5), 17);
        assert_eq!(mon.take_damage(u16::MAX), 0);
        assert!(mon.is_fainted());
        assert!(mon.hp <= mon.max_hp);
    }

    #[test]
    fn spawn_is_independent_of_template() {
        let template = weedle();
        let mut copy = Creature::spawn(&template);
        copy.take_damage(10);
        copy.moves.clear();
        assert_eq!(template.hp, 22);
        assert_eq!(template.moves.len(), 1);
    }

    #[test]
    fn spawn_restores_full_health() {
        let mut hurt = weedle();
        hurt.take_damage(20);
        assert_eq!(Creature::spawn(&hurt).hp, 22);
    }

    #[test]
    fn inverted_move_range_is_rejected() {
        assert!(matches!(
            Move::new("Bad", 9, 3),
            Err(DataError::InvalidMove { min: 9, max: 3, .. })
        ));
    }

    #[test]
    fn creature_without_moves_is_rejected() {
        assert!(matches!(
            Creature::new("Magikarp", 20, Vec::new()),
            Err(DataError::NoMoves(_))
        ));
    }

    #[test]
    fn health_fraction_handles_zero_max() {
        let mut mon = weedle();
        mon.max_hp = 0;
        mon.hp = 0;
        assert_eq!(mon.health_fraction(), 0.0);
    }
}
