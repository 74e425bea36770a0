//! Run an encounter through a session, optionally driven by a script.
//!
//! Each step prints one JSON line with the applied delta or the rejection;
//! a final line summarizes the combat.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use combat_content::{ContentFactory, EncounterLoader};
use combat_core::Command;
use combat_session::{CombatId, SessionConfig, SessionError, SessionManager};
use tracing::info;

use crate::report::{self, CombatSummary, StepReport};
use crate::script::{self, Catalogs, Step};

/// Run an encounter, applying a command script
#[derive(Parser)]
pub struct Run {
    /// Encounter name under `<DATA_DIR>/encounters`
    #[arg(value_name = "ENCOUNTER")]
    encounter: String,

    /// Content directory with creatures, abilities, rules and encounters
    #[arg(short, long, value_name = "DIR", default_value = "data")]
    data_dir: PathBuf,

    /// RON script of steps to submit in order
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Combat id used for events and snapshots (defaults to the encounter name)
    #[arg(long, value_name = "ID")]
    combat_id: Option<String>,

    /// Override the encounter's RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Snapshot directory (overrides COMBAT_SNAPSHOT_DIR)
    #[arg(long, value_name = "DIR")]
    snapshot_dir: Option<PathBuf>,

    /// Continue from the latest snapshot instead of opening the encounter
    #[arg(long)]
    restore: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

impl Run {
    pub async fn execute(self) -> Result<()> {
        let factory = ContentFactory::new(&self.data_dir);
        let catalogs = Catalogs {
            creatures: factory.load_creatures()?,
            abilities: factory.load_abilities()?,
        };

        let mut config = SessionConfig::from_env();
        if let Some(dir) = self.snapshot_dir.clone() {
            config.snapshot_dir = Some(dir);
        }
        let manager = SessionManager::new(config).context("failed to start session")?;
        let combat_id = CombatId::new(
            self.combat_id
                .clone()
                .unwrap_or_else(|| self.encounter.clone()),
        );

        if self.restore {
            let nonce = manager.restore(combat_id.clone()).await?;
            info!(combat = %combat_id, nonce, "Continuing restored combat");
        } else {
            let spec = factory.load_encounter(&self.encounter)?;
            let mut setup =
                EncounterLoader::assemble(&spec, &catalogs.creatures, factory.load_rules()?)
                    .with_context(|| format!("failed to assemble encounter '{}'", spec.name))?;
            if let Some(seed) = self.seed {
                setup.seed = seed;
            }
            manager.open(combat_id.clone(), setup).await?;
        }

        if let Some(path) = &self.script {
            let steps = script::load(path)?;
            self.run_steps(&manager, &combat_id, &catalogs, &steps).await?;
        }

        let state = manager.close(&combat_id).await?;
        report::emit(&CombatSummary::new(combat_id.as_str(), &state), self.pretty)?;
        manager.shutdown().await?;
        Ok(())
    }

    async fn run_steps(
        &self,
        manager: &SessionManager,
        combat_id: &CombatId,
        catalogs: &Catalogs,
        steps: &[Step],
    ) -> Result<()> {
        let mut issued: HashMap<u64, Command> = HashMap::new();
        let mut next_id = manager.state(combat_id).await?.nonce() + 1;

        for (index, step) in steps.iter().enumerate() {
            let number = index + 1;
            let command = match step {
                Step::Resubmit(id) => issued
                    .get(id)
                    .cloned()
                    .with_context(|| format!("step {number}: no command {id} was issued"))?,
                step => {
                    let state = manager.state(combat_id).await?;
                    let (actor, kind) = step
                        .resolve(catalogs, &state)
                        .with_context(|| format!("step {number}"))?;
                    let command = Command::new(next_id, actor, kind);
                    next_id += 1;
                    issued.insert(command.id.0, command.clone());
                    command
                }
            };

            let id = command.id;
            match manager.execute(combat_id, command).await {
                Ok(outcome) => report::emit(
                    &StepReport::applied(number, &outcome.result, &outcome.delta),
                    self.pretty,
                )?,
                Err(SessionError::Rejected(error)) => {
                    report::emit(&StepReport::rejected(number, id, &error), self.pretty)?
                }
                Err(other) => return Err(other.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use combat_session::{FileSnapshotRepository, SnapshotRepository};

    use super::*;

    const DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data");

    #[tokio::test]
    async fn sample_script_runs_and_leaves_snapshots() {
        let snapshots = tempfile::tempdir().unwrap();
        let script = format!("{DATA_DIR}/scripts/goblin-ambush.ron");
        let run = Run::try_parse_from([
            "run",
            "goblin-ambush",
            "--data-dir",
            DATA_DIR,
            "--script",
            script.as_str(),
            "--snapshot-dir",
            snapshots.path().to_str().unwrap(),
        ])
        .unwrap();
        run.execute().await.unwrap();

        let repository = FileSnapshotRepository::new(snapshots.path()).unwrap();
        let latest = repository
            .load_latest(&CombatId::from("goblin-ambush"))
            .unwrap()
            .unwrap();
        // Five initiative rolls and the start always apply.
        assert!(latest.nonce >= 6);
        assert_eq!(latest.state.initiative().len(), 5);
    }

    #[tokio::test]
    async fn restore_without_snapshots_fails() {
        let snapshots = tempfile::tempdir().unwrap();
        let run = Run::try_parse_from([
            "run",
            "goblin-ambush",
            "--data-dir",
            DATA_DIR,
            "--restore",
            "--snapshot-dir",
            snapshots.path().to_str().unwrap(),
        ])
        .unwrap();
        let err = run.execute().await.unwrap_err();
        assert!(err.to_string().contains("no snapshot"));
    }
}
