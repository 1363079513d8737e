use serde::{Deserialize, Serialize};

use crate::data_source::{LoadBalancingStrategy, ReadWriteStrategy};

/// General settings.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct General {
    /// How reads are spread across replicas.
    #[serde(default)]
    pub load_balancing_strategy: LoadBalancingStrategy,
    /// How statements inside a transaction are routed.
    #[serde(default)]
    pub read_write_strategy: ReadWriteStrategy,
}
