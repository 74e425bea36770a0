//! Initial combat description used to open a combat.

use grid_math::Grid;

use crate::config::CombatConfig;
use crate::error::CombatError;
use crate::state::{CombatState, Token};

/// Everything needed to build the state of a new combat: the RNG seed, the
/// table rules, the board and the tokens placed before initiative.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatSetup {
    pub seed: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub config: CombatConfig,
    pub grid: Grid,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tokens: Vec<Token>,
}

impl CombatSetup {
    pub fn new(seed: u64, config: CombatConfig, grid: Grid) -> Self {
        Self {
            seed,
            config,
            grid,
            tokens: Vec::new(),
        }
    }

    pub fn with_token(mut self, token: Token) -> Self {
        self.tokens.push(token);
        self
    }

    /// Builds the `NotStarted` state, placing tokens in order.
    ///
    /// Fails on the first token that cannot be placed.
    pub fn build(&self) -> Result<CombatState, CombatError> {
        let mut state = CombatState::new(self.seed, self.config, self.grid.clone());
        for token in &self.tokens {
            state.place_token(token.clone())?;
        }
        Ok(state)
    }
}
