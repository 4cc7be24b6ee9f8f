use crate::battle::BattleOutcome;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    GenerateMap { seed: u64, rows: u16, cols: u16 },
    BattleEnded { outcome: BattleOutcome },
}
