use anyhow::{Context, Result};
use colored::Colorize;
use futures::future::join_all;
use permit_config::PermitConfig;
use permit_core::PermissionResults;
use serde::Serialize;
use tracing::info;

use crate::output::{print_json, Outcome};

/// What one batch caller got back.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchCallerReport {
    Resolved { results: PermissionResults },
    Failed { outcome: Outcome },
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub callers: Vec<BatchCallerReport>,
    pub prompts_launched: usize,
}

pub async fn run(
    config: &PermitConfig,
    permissions: Vec<String>,
    callers: usize,
) -> Result<BatchSummary> {
    let (host, coordinator) = super::simulated(config);

    let handles: Vec<_> = (0..callers.max(1))
        .map(|_| {
            let coordinator = coordinator.clone();
            let permissions = permissions.clone();
            tokio::spawn(async move { coordinator.request_batch(permissions).await })
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for joined in join_all(handles).await {
        let report = match joined.context("batch task panicked")? {
            Ok(results) => BatchCallerReport::Resolved { results },
            Err(e) => BatchCallerReport::Failed {
                outcome: Outcome::from(Err(e)),
            },
        };
        reports.push(report);
    }

    let prompts_launched = host.launcher.batch_prompts();
    info!(prompts_launched, "Batch run complete");
    host.lifecycle.destroy();

    Ok(BatchSummary {
        callers: reports,
        prompts_launched,
    })
}

pub async fn execute(
    config: PermitConfig,
    permissions: Vec<String>,
    callers: usize,
    json: bool,
) -> Result<()> {
    let summary = run(&config, permissions, callers).await?;

    if json {
        return print_json(&summary);
    }

    println!("{}", "Batch requests".bold());
    for (index, report) in summary.callers.iter().enumerate() {
        match report {
            BatchCallerReport::Resolved { results } => {
                println!("  caller {}:", index + 1);
                for (permission, granted) in results {
                    println!(
                        "    {:<38} {}",
                        permission,
                        Outcome::from(Ok(*granted)).colored()
                    );
                }
            }
            BatchCallerReport::Failed { outcome } => {
                println!("  caller {}: {}", index + 1, outcome.colored());
            }
        }
    }
    println!("\nPrompts launched: {}", summary.prompts_launched);
    Ok(())
}
