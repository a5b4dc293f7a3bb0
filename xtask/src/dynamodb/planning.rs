//! Deployment planning. Pure functions over observed and desired state.

use super::config::{GsiConfig, TableConfig};

/// Observed state of an existing table.
#[derive(Debug, Clone)]
pub struct TableState {
    pub status: ResourceStatus,
    pub gsis: Vec<GsiState>,
}

/// Lifecycle status shared by tables and indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStatus {
    Active,
    Creating,
    Updating,
    Deleting,
}

#[derive(Debug, Clone)]
pub struct GsiState {
    pub name: String,
    pub status: ResourceStatus,
}

impl TableState {
    /// True once the table and all of its indexes accept traffic.
    pub fn is_ready(&self) -> bool {
        self.status == ResourceStatus::Active
            && self.gsis.iter().all(|g| g.status == ResourceStatus::Active)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployPlan {
    CreateTable {
        config: TableConfig,
    },
    AddGsis {
        table_name: String,
        gsis_to_add: Vec<GsiConfig>,
    },
    NoChanges {
        table_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyPlan {
    DeleteTable { table_name: String },
    AlreadyGone { table_name: String },
}

/// Changes needed to move from `current` to `desired`. Indexes are only ever
/// added; extra indexes on the live table are left alone.
pub fn calculate_deploy_plan(current: Option<&TableState>, desired: &TableConfig) -> DeployPlan {
    let Some(state) = current else {
        return DeployPlan::CreateTable {
            config: desired.clone(),
        };
    };

    let gsis_to_add: Vec<GsiConfig> = desired
        .gsis
        .iter()
        .filter(|gsi| !state.gsis.iter().any(|g| g.name == gsi.name))
        .cloned()
        .collect();

    if gsis_to_add.is_empty() {
        DeployPlan::NoChanges {
            table_name: desired.table_name.clone(),
        }
    } else {
        DeployPlan::AddGsis {
            table_name: desired.table_name.clone(),
            gsis_to_add,
        }
    }
}

pub fn calculate_destroy_plan(current: Option<&TableState>, table_name: &str) -> DestroyPlan {
    let table_name = table_name.to_string();
    match current {
        Some(_) => DestroyPlan::DeleteTable { table_name },
        None => DestroyPlan::AlreadyGone { table_name },
    }
}

pub fn format_deploy_plan(plan: &DeployPlan) -> Vec<String> {
    match plan {
        DeployPlan::CreateTable { config } => {
            let mut lines = vec![
                format!("+ Create table: {}", config.table_name),
                format!("  Partition key: {} (S)", config.partition_key),
                format!("  Sort key: {} (S)", config.sort_key),
            ];
            for gsi in &config.gsis {
                lines.push(format!("  + GSI: {}", gsi.name));
                lines.push(format!("    Partition key: {} (S)", gsi.partition_key));
                lines.push(format!("    Sort key: {} (S)", gsi.sort_key));
            }
            lines.push(format!(
                "  Throughput: {} RCU / {} WCU",
                config.throughput.read_capacity_units, config.throughput.write_capacity_units
            ));
            lines
        }
        DeployPlan::AddGsis {
            table_name,
            gsis_to_add,
        } => {
            let mut lines = vec![format!("~ Update table: {}", table_name)];
            for gsi in gsis_to_add {
                lines.push(format!("  + Add GSI: {}", gsi.name));
            }
            lines
        }
        DeployPlan::NoChanges { table_name } => {
            vec![format!("= Table '{}' is up to date", table_name)]
        }
    }
}

pub fn format_destroy_plan(plan: &DestroyPlan) -> Vec<String> {
    match plan {
        DestroyPlan::DeleteTable { table_name } => {
            vec![format!(
                "- Delete table: {} (ALL DATA WILL BE LOST)",
                table_name
            )]
        }
        DestroyPlan::AlreadyGone { table_name } => {
            vec![format!("= Table '{}' does not exist", table_name)]
        }
    }
}
