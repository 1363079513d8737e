// Submodules
pub mod core;
pub mod data_source;
pub mod error;
pub mod general;
pub mod journal;

pub use core::Config;
pub use data_source::{DataSource, LoadBalancingStrategy, ReadWriteStrategy, Role};
pub use error::Error;
pub use general::General;
pub use journal::{Journal, OperationKind};
