//! Deterministic dice.
//!
//! Every roll the engine makes is a pure function of the combat seed, the
//! command nonce, the acting token and a per-command draw counter, so a
//! combat can be replayed from its command log. Physical rolls reported by
//! players enter through [`ScriptedDice`].

use std::collections::VecDeque;

/// Stateless RNG oracle: maps a seed to a 32-bit value.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a die with `sides` faces (1..=sides). A zero-sided die rolls 0.
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (self.next_u32(seed) % sides) + 1
    }
}

/// PCG-XSH-RR: 64-bit LCG state, 32-bit permuted output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Derives the seed of one draw.
///
/// * `combat_seed` - fixed when the combat is created
/// * `nonce` - number of commands applied so far
/// * `actor` - token performing the command (0 for the game master)
/// * `context` - index of the draw within the command
pub fn compute_seed(combat_seed: u64, nonce: u64, actor: u32, context: u32) -> u64 {
    let mut hash = combat_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// Source of die results.
pub trait Dice {
    /// Rolls one die with `sides` faces.
    fn roll(&mut self, sides: u32) -> u32;

    fn roll_many(&mut self, count: u32, sides: u32) -> Vec<u32> {
        (0..count).map(|_| self.roll(sides)).collect()
    }
}

impl<D: Dice + ?Sized> Dice for &mut D {
    fn roll(&mut self, sides: u32) -> u32 {
        (**self).roll(sides)
    }
}

/// Engine dice for one command: each draw advances the context counter.
#[derive(Clone, Debug)]
pub struct SeededDice<R = PcgRng> {
    rng: R,
    combat_seed: u64,
    nonce: u64,
    actor: u32,
    draws: u32,
}

impl SeededDice<PcgRng> {
    pub fn new(combat_seed: u64, nonce: u64, actor: u32) -> Self {
        Self::with_rng(PcgRng, combat_seed, nonce, actor)
    }
}

impl<R: RngOracle> SeededDice<R> {
    pub fn with_rng(rng: R, combat_seed: u64, nonce: u64, actor: u32) -> Self {
        Self {
            rng,
            combat_seed,
            nonce,
            actor,
            draws: 0,
        }
    }

    /// Number of dice rolled so far.
    pub fn draws(&self) -> u32 {
        self.draws
    }
}

impl<R: RngOracle> Dice for SeededDice<R> {
    fn roll(&mut self, sides: u32) -> u32 {
        let seed = compute_seed(self.combat_seed, self.nonce, self.actor, self.draws);
        self.draws = self.draws.wrapping_add(1);
        self.rng.roll_die(seed, sides)
    }
}

/// Always rolls the same face, clamped to the die.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedDice(pub u32);

impl Dice for FixedDice {
    fn roll(&mut self, sides: u32) -> u32 {
        self.0.clamp(1.min(sides), sides)
    }
}

/// Replays supplied results in order, then defers to a fallback.
///
/// Supplied values are clamped to the die being rolled.
#[derive(Clone, Debug)]
pub struct ScriptedDice<D = FixedDice> {
    queue: VecDeque<u32>,
    fallback: D,
}

impl ScriptedDice<FixedDice> {
    /// Scripted results; once exhausted every die rolls a 1.
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self::with_fallback(values, FixedDice(1))
    }
}

impl<D: Dice> ScriptedDice<D> {
    pub fn with_fallback(values: impl IntoIterator<Item = u32>, fallback: D) -> Self {
        Self {
            queue: values.into_iter().collect(),
            fallback,
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn into_fallback(self) -> D {
        self.fallback
    }
}

impl<D: Dice> Dice for ScriptedDice<D> {
    fn roll(&mut self, sides: u32) -> u32 {
        match self.queue.pop_front() {
            Some(_) if sides == 0 => 0,
            Some(value) => value.clamp(1, sides),
            None => self.fallback.roll(sides),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_dice_are_deterministic_and_in_range() {
        let mut a = SeededDice::new(42, 7, 3);
        let mut b = SeededDice::new(42, 7, 3);
        for _ in 0..200 {
            let roll = a.roll(20);
            assert_eq!(roll, b.roll(20));
            assert!((1..=20).contains(&roll));
        }
        assert_eq!(a.draws(), 200);
    }

    #[test]
    fn different_nonces_diverge() {
        let first: Vec<u32> = SeededDice::new(1, 1, 1).roll_many(8, 20);
        let second: Vec<u32> = SeededDice::new(1, 2, 1).roll_many(8, 20);
        assert_ne!(first, second);
    }

    #[test]
    fn scripted_dice_replay_then_fall_back() {
        let mut dice = ScriptedDice::with_fallback([18, 30, 0], FixedDice(4));
        assert_eq!(dice.roll(20), 18);
        assert_eq!(dice.roll(20), 20);
        assert_eq!(dice.roll(6), 1);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(dice.roll(6), 4);
    }

    #[test]
    fn zero_sided_die_rolls_zero() {
        assert_eq!(PcgRng.roll_die(99, 0), 0);
        assert_eq!(FixedDice(3).roll(0), 0);
        assert_eq!(ScriptedDice::new([5]).roll(0), 0);
    }
}
