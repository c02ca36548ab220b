//! `sitenet sync`: run one snapshot reconciliation against the state file.

use std::sync::Arc;
use std::time::Duration;

use owo_colors::OwoColorize;
use tabled::Tabled;
use tracing::info;

use sitenet_core::{FailedDevice, ProjectDirectory, Snapshot, SnapshotReconciler, SyncOutcome};

use crate::cli::SyncArgs;
use crate::error::CliError;
use crate::output;

use super::Context;
use super::util::{self, Site};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct FailedRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl From<&FailedDevice> for FailedRow {
    fn from(f: &FailedDevice) -> Self {
        Self {
            mac: f.mac.clone().unwrap_or_else(|| "-".into()),
            reason: f.reason.clone(),
        }
    }
}

fn summary(outcome: &SyncOutcome, color: bool) -> String {
    let failed = outcome.failed.len();
    let counts = format!("Processed: {}  Failed: {failed}", outcome.processed);
    let mut out = if color && failed > 0 {
        counts.yellow().to_string()
    } else {
        counts
    };
    if failed > 0 {
        let rows: Vec<FailedRow> = outcome.failed.iter().map(FailedRow::from).collect();
        out.push('\n');
        out.push_str(&output::render_table(&rows));
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: SyncArgs, ctx: &Context) -> Result<(), CliError> {
    let snapshot: Snapshot = util::read_json_file(&args.snapshot)?;
    let site = Site::open(&ctx.state_path)?;

    let mut config = ctx.config.to_sync_config()?;
    if let Some(secs) = args.deadline.filter(|s| *s > 0) {
        config.snapshot_deadline = Duration::from_secs(secs);
    }

    let projects: Arc<dyn ProjectDirectory> = site.projects.clone();
    let reconciler = SnapshotReconciler::new(site.registry.clone(), projects, config);
    let outcome = reconciler.reconcile(&snapshot).await?;
    site.save()?;

    info!(
        snapshot = %args.snapshot.display(),
        processed = outcome.processed,
        failed = outcome.failed.len(),
        "sync complete"
    );

    let color = output::should_color(ctx.color);
    let out = output::render_single(
        ctx.output,
        &outcome,
        |o| summary(o, color),
        |o| o.processed.to_string(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
