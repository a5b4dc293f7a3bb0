//! Desired table definition. Pure data, no I/O.

use formdesk_core::storage::SecondaryIndex;

/// Capacity units used for the table and every index.
pub const DEFAULT_CAPACITY_UNITS: i64 = 5;

/// Read and write capacity of a table or index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throughput {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

impl Default for Throughput {
    fn default() -> Self {
        Self {
            read_capacity_units: DEFAULT_CAPACITY_UNITS,
            write_capacity_units: DEFAULT_CAPACITY_UNITS,
        }
    }
}

/// Global secondary index definition. Every index projects all attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsiConfig {
    pub name: String,
    pub partition_key: String,
    pub sort_key: String,
    pub throughput: Throughput,
}

impl From<SecondaryIndex> for GsiConfig {
    fn from(index: SecondaryIndex) -> Self {
        Self {
            name: index.name().to_string(),
            partition_key: index.pk_attribute().to_string(),
            sort_key: index.sk_attribute().to_string(),
            throughput: Throughput::default(),
        }
    }
}

/// Table definition. All key attributes are strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub table_name: String,
    pub partition_key: String,
    pub sort_key: String,
    pub gsis: Vec<GsiConfig>,
    pub throughput: Throughput,
}

impl TableConfig {
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.table_name = name.to_string();
        self
    }

    /// Every key attribute the table and its indexes declare, without repeats.
    pub fn key_attributes(&self) -> Vec<&str> {
        let mut names = vec![self.partition_key.as_str(), self.sort_key.as_str()];
        for gsi in &self.gsis {
            for name in [gsi.partition_key.as_str(), gsi.sort_key.as_str()] {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

/// The formdesk single table: `PK`/`SK` plus one index per access pattern family.
pub fn formdesk_table_config() -> TableConfig {
    TableConfig {
        table_name: "service".to_string(),
        partition_key: "PK".to_string(),
        sort_key: "SK".to_string(),
        gsis: SecondaryIndex::ALL.into_iter().map(GsiConfig::from).collect(),
        throughput: Throughput::default(),
    }
}
