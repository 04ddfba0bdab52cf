//! `oneline-recon`: reconciles imported equipment groups against the local
//! one-line model and builds the allocation profile payload.
//!
//! Pure engine crate: receives pre-loaded records, returns a verdict or a
//! payload. No network or file IO.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod loader;
pub mod model;
pub mod payload;
pub mod report;
pub mod rules;
pub mod schedule;
pub mod session;

pub use catalog::InventoryCatalog;
pub use config::AllocationJob;
pub use engine::{commit, preflight, validate, ValidatedAllocation, Verdict};
pub use error::{AllocationIssue, ReconError};
pub use model::{AllocationEntry, EquipmentType, SourceItem, TargetSlot};
pub use payload::{build_payload, ProfilePayload, ProjectRef};
pub use rules::AllocationRuleSet;
pub use schedule::{Schedule, ScheduleRow, ScheduleRowDraft};
pub use session::ImportSession;
