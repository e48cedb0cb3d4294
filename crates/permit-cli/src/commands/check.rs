use anyhow::Result;
use colored::Colorize;
use permit_config::PermitConfig;

use crate::output::{print_json, Outcome};

pub async fn execute(config: PermitConfig, permissions: Vec<String>, json: bool) -> Result<()> {
    let (host, coordinator) = super::simulated(&config);
    let statuses = coordinator.are_granted(permissions);

    if json {
        print_json(&statuses)?;
    } else {
        println!("{}", "Permission status".bold());
        for (permission, granted) in &statuses {
            println!("  {:<40} {}", permission, Outcome::from(Ok(*granted)).colored());
        }
    }

    host.lifecycle.destroy();
    Ok(())
}
