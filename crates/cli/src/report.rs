//! JSON lines written to stdout.
//!
//! Reports carry deltas and summaries only. The full combat state keys its
//! terrain and occupancy maps by coordinates, which JSON cannot express;
//! snapshots keep that in bincode instead.

use anyhow::Result;
use combat_core::{ActionResult, CombatError, CombatState, CommandId, Phase, StateDelta, Vitality};
use dice_resolution::ConditionKind;
use grid_math::Coord;
use serde::Serialize;

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus<'a> {
    Applied {
        result: &'a ActionResult,
        delta: &'a StateDelta,
    },
    Rejected {
        error: String,
    },
}

#[derive(Serialize)]
pub struct StepReport<'a> {
    pub step: usize,
    pub command: CommandId,
    #[serde(flatten)]
    pub status: StepStatus<'a>,
}

impl<'a> StepReport<'a> {
    pub fn applied(step: usize, result: &'a ActionResult, delta: &'a StateDelta) -> Self {
        Self {
            step,
            command: delta.command.id,
            status: StepStatus::Applied { result, delta },
        }
    }

    pub fn rejected(step: usize, command: CommandId, error: &CombatError) -> Self {
        Self {
            step,
            command,
            status: StepStatus::Rejected {
                error: error.to_string(),
            },
        }
    }
}

#[derive(Serialize)]
pub struct TokenSummary {
    pub id: u32,
    pub name: String,
    pub side: u32,
    pub position: Coord,
    pub hit_points: u32,
    pub max_hit_points: u32,
    pub vitality: Vitality,
    pub conditions: Vec<ConditionKind>,
}

#[derive(Serialize)]
pub struct CombatSummary {
    pub combat: String,
    pub nonce: u64,
    pub phase: Phase,
    pub state_root: String,
    pub initiative: Vec<u32>,
    pub tokens: Vec<TokenSummary>,
}

impl CombatSummary {
    pub fn new(combat: &str, state: &CombatState) -> Self {
        let tokens = state
            .tokens()
            .map(|token| TokenSummary {
                id: token.id.0,
                name: token.name.clone(),
                side: token.side.0,
                position: token.position,
                hit_points: token.creature.hit_points.current,
                max_hit_points: token.creature.hit_points.max,
                vitality: token.creature.vitality,
                conditions: state.condition_kinds(token.id),
            })
            .collect();

        Self {
            combat: combat.to_owned(),
            nonce: state.nonce(),
            phase: state.phase(),
            state_root: hex::encode(state.state_root()),
            initiative: state.initiative().iter().map(|e| e.token.0).collect(),
            tokens,
        }
    }
}

/// Prints one JSON document on its own line.
pub fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let line = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{line}");
    Ok(())
}
