//! Core domain logic for the personal-data form filler.
//! This crate owns the household document invariants; the CLI only renders.

pub mod config;
pub mod gaps;
pub mod logging;
pub mod model;
pub mod path;
pub mod service;
pub mod store;

pub use config::{ConfigError, ConfigOverrides, StoreConfig};
pub use gaps::{scan_gaps, GapFilter};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::household::{Document, Member};
pub use path::{get_path, set_path};
pub use service::household_service::{
    coerce_value, AddMemberReport, FieldChange, GapReport, HouseholdService, InitOutcome,
    MemberSeed, ServiceError, ServiceResult, ShowView, UpdateReport,
};
pub use store::{to_pretty_json, DocumentStore, JsonFileStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
