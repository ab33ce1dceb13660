//! SLA policy engine: target fill dates, lateness classification, aging buckets,
//! and deadline extensions for requisitions.

mod classify;
mod extension;
mod policy;

pub use classify::{classify_sla, AgingBucket, AgingBuckets, SlaState, SlaStatus};
pub use extension::{
    apply_extension, preview_extension, ExtensionMode, ExtensionOutcome, ExtensionRequest,
};
pub use policy::{compute_target_date, SlaPolicy};

/// Validation failures raised by the policy engine. None of them mutate state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlaError {
    #[error("requisition start date is required to compute a target date")]
    MissingStartDate,
    #[error("requisition layer is required to compute a target date")]
    MissingLayer,
    #[error("requisition {0} has no target date to extend")]
    MissingTargetDate(String),
    #[error("an extension reason is required")]
    MissingReason,
    #[error("extension does not resolve to a new target date")]
    UnresolvedExtensionDate,
    #[error("invalid extension mode '{0}': expected 'policy', a day count, or YYYY-MM-DD")]
    InvalidExtensionMode(String),
}
