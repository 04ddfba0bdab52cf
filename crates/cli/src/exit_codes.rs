//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Domain     | Description                                        |
//! |------|------------|----------------------------------------------------|
//! | 0    | Universal  | Success                                            |
//! | 1    | Universal  | General error (unspecified)                        |
//! | 2    | Universal  | CLI usage error (bad args)                         |
//! | 3    | job        | Job file could not be parsed or is inconsistent    |
//! | 4    | job        | Input export missing, unreadable or malformed      |
//! | 5    | allocation | Allocation table rejected by the engine            |
//! | 6    | profile    | Schedule or profile name rejected                  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use oneline_recon::{AllocationIssue, ReconError};

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Job (3-4)
// =============================================================================

/// Job TOML failed to parse or validate.
pub const EXIT_JOB_INVALID_CONFIG: u8 = 3;

/// A referenced CSV export is missing, unreadable, or has bad rows; or the
/// catalog built from it is inconsistent (duplicate ids).
pub const EXIT_JOB_INPUT: u8 = 4;

// =============================================================================
// Allocation (5-6)
// =============================================================================

/// The engine rejected the allocation table.
pub const EXIT_ALLOC_REJECTED: u8 = 5;

/// A schedule row or the profile name was rejected.
pub const EXIT_PROFILE_REJECTED: u8 = 6;

/// Map an operational error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_JOB_INVALID_CONFIG,
        ReconError::UnknownEquipmentType(_)
        | ReconError::DuplicateTargetSlot { .. }
        | ReconError::DuplicateSourceItem { .. }
        | ReconError::MissingColumn { .. }
        | ReconError::FieldParse { .. }
        | ReconError::Io(_) => EXIT_JOB_INPUT,
    }
}

/// Map a domain issue to its exit code.
pub fn issue_exit_code(issue: &AllocationIssue) -> u8 {
    if issue.is_profile_issue() {
        EXIT_PROFILE_REJECTED
    } else {
        EXIT_ALLOC_REJECTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oneline_recon::EquipmentType;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_JOB_INVALID_CONFIG,
            EXIT_JOB_INPUT,
            EXIT_ALLOC_REJECTED,
            EXIT_PROFILE_REJECTED,
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn issue_codes() {
        assert_eq!(issue_exit_code(&AllocationIssue::DuplicateDateRow), EXIT_PROFILE_REJECTED);
        assert_eq!(
            issue_exit_code(&AllocationIssue::NonIntegerAllocation {
                equipment_type: EquipmentType::Load
            }),
            EXIT_ALLOC_REJECTED
        );
        assert_eq!(
            recon_exit_code(&ReconError::ConfigParse("x".into())),
            EXIT_JOB_INVALID_CONFIG
        );
        assert_eq!(recon_exit_code(&ReconError::Io("x".into())), EXIT_JOB_INPUT);
    }
}
