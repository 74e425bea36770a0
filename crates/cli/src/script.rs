//! RON combat scripts.
//!
//! A script is a list of steps. Attacks and abilities are named by their
//! content ids and resolved against the loaded catalogs and the current
//! combat state just before each step is submitted.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use combat_content::{AbilityCatalog, CreatureCatalog};
use combat_core::{
    Actor, AttackAction, CombatState, CommandKind, EndTurnAction, MoveAction, MoveTarget,
    Resource, RollInitiativeAction, StartAction, SuppliedD20, TargetSelection, TokenId,
    UseAbilityAction,
};
use grid_math::{Coord, Direction};
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub enum Step {
    /// Physical initiative roll for a token.
    Initiative { token: u32, natural: u32 },
    /// Roll missing initiative and begin round one.
    Start,
    /// Move along the cheapest path to a cell.
    MoveTo { token: u32, to: (i32, i32) },
    /// Move along explicit cells.
    MoveAlong { token: u32, path: Vec<(i32, i32)> },
    /// Attack with a named attack of the attacker's creature.
    Attack {
        attacker: u32,
        attack: String,
        target: u32,
        #[serde(default)]
        roll: Option<u32>,
        #[serde(default)]
        damage: Vec<u32>,
        #[serde(default)]
        reaction: bool,
    },
    /// Use a catalog ability on tokens, or on the area placed at `origin`.
    Ability {
        caster: u32,
        ability: String,
        #[serde(default)]
        targets: Vec<u32>,
        #[serde(default)]
        origin: Option<(i32, i32)>,
        #[serde(default)]
        direction: Option<Direction>,
        #[serde(default)]
        rolls: Vec<u32>,
    },
    /// End the active token's turn (issued by the game master).
    EndTurn,
    /// Any other command, issued by the game master verbatim.
    Gm(CommandKind),
    /// Sends the command of an earlier step again, under the same id.
    Resubmit(u64),
}

/// Catalogs that script steps refer to by id.
pub struct Catalogs {
    pub creatures: CreatureCatalog,
    pub abilities: AbilityCatalog,
}

pub fn load(path: &Path) -> Result<Vec<Step>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse(&content).with_context(|| format!("in {}", path.display()))
}

pub fn parse(content: &str) -> Result<Vec<Step>> {
    ron::from_str(content).context("failed to parse script RON")
}

impl Step {
    /// Turns the step into an engine command for the current state.
    ///
    /// Fails for [`Step::Resubmit`], which reuses a command instead.
    pub fn resolve(&self, catalogs: &Catalogs, state: &CombatState) -> Result<(Actor, CommandKind)> {
        let resolved = match self {
            Step::Initiative { token, natural } => (
                Actor::GameMaster,
                RollInitiativeAction {
                    token: TokenId(*token),
                    natural: *natural,
                }
                .into(),
            ),
            Step::Start => (Actor::GameMaster, StartAction.into()),
            Step::MoveTo { token, to } => (
                Actor::Token(TokenId(*token)),
                MoveAction {
                    token: TokenId(*token),
                    target: MoveTarget::Destination(coord(*to)),
                }
                .into(),
            ),
            Step::MoveAlong { token, path } => (
                Actor::Token(TokenId(*token)),
                MoveAction {
                    token: TokenId(*token),
                    target: MoveTarget::Path(path.iter().copied().map(coord).collect()),
                }
                .into(),
            ),
            Step::Attack {
                attacker,
                attack,
                target,
                roll,
                damage,
                reaction,
            } => {
                let attacker = TokenId(*attacker);
                let creature_ref = &state
                    .token(attacker)
                    .ok_or_else(|| anyhow!("unknown attacker {attacker}"))?
                    .creature_ref;
                let profile = catalogs
                    .creatures
                    .get(creature_ref)
                    .and_then(|template| template.attack(attack))
                    .ok_or_else(|| anyhow!("creature '{creature_ref}' has no attack '{attack}'"))?;

                let mut action = AttackAction::new(attacker, TokenId(*target), profile.clone());
                action.roll = roll.map(|first| SuppliedD20 {
                    first,
                    second: None,
                });
                action.damage_rolls = damage.clone();
                if *reaction {
                    action.resource = Resource::Reaction;
                }
                (Actor::Token(attacker), action.into())
            }
            Step::Ability {
                caster,
                ability,
                targets,
                origin,
                direction,
                rolls,
            } => {
                let definition = catalogs
                    .abilities
                    .get(ability)
                    .ok_or_else(|| anyhow!("unknown ability '{ability}'"))?;
                let selection = match (origin, targets.is_empty()) {
                    (Some(origin), true) => TargetSelection::Area {
                        origin: coord(*origin),
                        direction: *direction,
                    },
                    (None, false) => {
                        TargetSelection::Tokens(targets.iter().copied().map(TokenId).collect())
                    }
                    (Some(_), false) => bail!("ability step names both targets and an origin"),
                    (None, true) => bail!("ability step needs targets or an origin"),
                };

                let caster = TokenId(*caster);
                let mut action = UseAbilityAction::new(caster, definition.clone(), selection);
                action.rolls = rolls.clone();
                (Actor::Token(caster), action.into())
            }
            Step::EndTurn => (Actor::GameMaster, EndTurnAction.into()),
            Step::Gm(kind) => (Actor::GameMaster, kind.clone()),
            Step::Resubmit(id) => bail!("resubmission of command {id} has nothing to resolve"),
        };
        Ok(resolved)
    }
}

fn coord((x, y): (i32, i32)) -> Coord {
    Coord::new(x, y)
}
