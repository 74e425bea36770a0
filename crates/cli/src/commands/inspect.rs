//! Inspect stored combat snapshots.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use combat_session::{CombatId, FileSnapshotRepository, SnapshotRepository};

use crate::report::{self, CombatSummary};

/// Summarize a stored snapshot
#[derive(Parser)]
pub struct Inspect {
    /// Combat id whose snapshots to read
    #[arg(value_name = "COMBAT")]
    combat: String,

    /// Snapshot directory
    #[arg(short, long, value_name = "DIR")]
    snapshot_dir: PathBuf,

    /// Nonce of the snapshot to read (defaults to the latest)
    #[arg(short, long)]
    nonce: Option<u64>,

    /// List stored nonces instead of summarizing
    #[arg(long)]
    list: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

impl Inspect {
    pub fn execute(self) -> Result<()> {
        if !self.snapshot_dir.exists() {
            bail!(
                "Snapshot directory not found: {}",
                self.snapshot_dir.display()
            );
        }
        let repository = FileSnapshotRepository::new(&self.snapshot_dir)?;
        let combat_id = CombatId::new(self.combat);

        if self.list {
            return report::emit(&repository.list_nonces(&combat_id)?, self.pretty);
        }

        let snapshot = match self.nonce {
            Some(nonce) => repository.load(&combat_id, nonce)?,
            None => repository.load_latest(&combat_id)?,
        };
        let Some(snapshot) = snapshot else {
            bail!(
                "No snapshot for combat '{}'{}",
                combat_id,
                self.nonce.map(|n| format!(" at nonce {n}")).unwrap_or_default()
            );
        };

        report::emit(
            &CombatSummary::new(combat_id.as_str(), &snapshot.state),
            self.pretty,
        )
    }
}
