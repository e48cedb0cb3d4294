use anyhow::{Context, Result};
use colored::Colorize;
use futures::future::join_all;
use permit_config::PermitConfig;
use serde::Serialize;
use tracing::info;

use crate::output::{print_json, Outcome};

#[derive(Debug, Serialize)]
pub struct RequestReport {
    pub permission: String,
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Serialize)]
pub struct RequestSummary {
    pub requests: Vec<RequestReport>,
    pub prompts_launched: usize,
}

pub async fn run(
    config: &PermitConfig,
    permissions: Vec<String>,
    callers: usize,
) -> Result<RequestSummary> {
    let (host, coordinator) = super::simulated(config);
    let callers = callers.max(1);

    let tasks: Vec<_> = permissions
        .iter()
        .map(|permission| {
            let handles: Vec<_> = (0..callers)
                .map(|_| {
                    let coordinator = coordinator.clone();
                    let permission = permission.clone();
                    tokio::spawn(async move { coordinator.request(permission).await })
                })
                .collect();
            (permission.clone(), handles)
        })
        .collect();

    let mut requests = Vec::with_capacity(tasks.len());
    for (permission, handles) in tasks {
        let mut outcomes = Vec::with_capacity(handles.len());
        for joined in join_all(handles).await {
            let result = joined.context("request task panicked")?;
            outcomes.push(Outcome::from(result));
        }
        requests.push(RequestReport {
            permission,
            outcomes,
        });
    }

    let prompts_launched = host.launcher.single_prompts();
    info!(prompts_launched, "Request run complete");
    host.lifecycle.destroy();

    Ok(RequestSummary {
        requests,
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

    println!("{}", "Permission requests".bold());
    for report in &summary.requests {
        let outcomes: Vec<String> = report.outcomes.iter().map(|o| o.colored()).collect();
        println!("  {:<40} {}", report.permission, outcomes.join(", "));
    }
    println!("\nPrompts launched: {}", summary.prompts_launched);
    Ok(())
}
