use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Source of every random decision in the game.
pub trait Dice {
    /// Uniform in `[0, 1)`.
    fn roll(&mut self) -> f64;
    /// Uniform in `lo..=hi`.
    fn between(&mut self, lo: u16, hi: u16) -> u16;
    /// Uniform in `0..len`; 0 for an empty range.
    fn pick(&mut self, len: usize) -> usize;

    fn chance(&mut self, probability: f64) -> bool {
        self.roll() < probability
    }
}

pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed to persist so the next dispatch continues the sequence.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

impl Dice for SeededDice {
    fn roll(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn between(&mut self, lo: u16, hi: u16) -> u16 {
        if lo >= hi {
            return lo.min(hi);
        }
        self.rng.gen_range(lo..=hi)
    }

    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

pub fn seed_from_time() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now.as_secs() << 32) ^ now.subsec_nanos() as u64
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;

    use super::Dice;

    /// Replays queued draws. Once a queue runs dry: rolls return 0.99,
    /// damage returns the low end, picks return 0.
    #[derive(Default)]
    pub struct ScriptedDice {
        rolls: VecDeque<f64>,
        damage: VecDeque<u16>,
        picks: VecDeque<usize>,
    }

    impl ScriptedDice {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn rolls(mut self, rolls: impl IntoIterator<Item = f64>) -> Self {
            self.rolls.extend(rolls);
            self
        }

        pub fn damage(mut self, damage: impl IntoIterator<Item = u16>) -> Self {
            self.damage.extend(damage);
            self
        }

        pub fn picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
            self.picks.extend(picks);
            self
        }

        pub fn always_roll(value: f64, count: usize) -> Self {
            Self::new().rolls(std::iter::repeat(value).take(count))
        }
    }

    impl Dice for ScriptedDice {
        fn roll(&mut self) -> f64 {
            self.rolls.pop_front().unwrap_or(0.99)
        }

        fn between(&mut self, lo: u16, hi: u16) -> u16 {
            self.damage.pop_front().unwrap_or(lo).clamp(lo, hi.max(lo))
        }

        fn pick(&mut self, len: usize) -> usize {
            self.picks
                .pop_front()
                .unwrap_or(0)
                .min(len.saturating_sub(1))
        }
    }
}
