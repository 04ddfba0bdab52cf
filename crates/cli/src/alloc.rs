//! Job-driven allocation commands: load a `.alloc.toml`, read its exports,
//! and run the engine over them.

use std::path::{Path, PathBuf};

use oneline_recon::config::AllocationJob;
use oneline_recon::layout::FieldState;
use oneline_recon::loader::{load_entries, load_source_items, load_target_slots};
use oneline_recon::payload::validate_profile_name;
use oneline_recon::report::{compute_summary, AllocationReport};
use oneline_recon::{
    AllocationIssue, AllocationRuleSet, ImportSession, InventoryCatalog, ProjectRef, ReconError,
    Schedule, Verdict,
};

use crate::exit_codes::{
    issue_exit_code, recon_exit_code, EXIT_ERROR, EXIT_JOB_INPUT, EXIT_JOB_INVALID_CONFIG,
};
use crate::CliError;

/// A parsed job plus the session built from its exports.
pub struct LoadedJob {
    pub job: AllocationJob,
    pub base_dir: PathBuf,
    pub session: ImportSession,
}

fn job_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::MissingColumn { .. } => {
                Some("map the column under [sources.columns] / [targets.columns] / [entries.columns]".to_string())
            }
            ReconError::UnknownEquipmentType(_) => {
                Some("expected one of LOAD, EV, STORAGE, SOLAR, WIND, GENERATOR".to_string())
            }
            _ => None,
        };
        CliError { code: recon_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<AllocationIssue> for CliError {
    fn from(issue: AllocationIssue) -> Self {
        let hint = match &issue {
            AllocationIssue::MissingTargetEquipment { .. }
            | AllocationIssue::InsufficientTargetCardinality { .. } => {
                Some("add the missing equipment to the one-line diagram and re-export".to_string())
            }
            AllocationIssue::DuplicateDateRow => {
                Some("each (month, day type, hour) row may appear once in [[schedule]]".to_string())
            }
            _ => None,
        };
        CliError { code: issue_exit_code(&issue), message: issue.to_string(), hint }
    }
}

fn read_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| job_err(EXIT_JOB_INPUT, format!("cannot read {}: {e}", path.display())))
}

/// Parse and validate the job file only.
pub fn read_job(path: &Path) -> Result<(AllocationJob, PathBuf), CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        job_err(EXIT_JOB_INVALID_CONFIG, format!("cannot read job {}: {e}", path.display()))
    })?;
    let job = AllocationJob::from_toml(&text)?;

    // Export paths resolve against the job file's directory
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((job, base_dir))
}

/// Load a job and every export it names into an open session.
pub fn load_job(path: &Path) -> Result<LoadedJob, CliError> {
    let (job, base_dir) = read_job(path)?;

    let items = load_source_items(&read_text(&base_dir.join(&job.sources.file))?, &job.sources.columns)?;
    let slots = load_target_slots(&read_text(&base_dir.join(&job.targets.file))?, &job.targets.columns)?;
    tracing::debug!(items = items.len(), slots = slots.len(), "exports loaded");

    let catalog = InventoryCatalog::new(items, slots)?;
    let entries = match &job.entries {
        Some(input) => load_entries(&read_text(&base_dir.join(&input.file))?, &input.columns, &catalog)?,
        None => Vec::new(),
    };

    let project = ProjectRef {
        project_id: job.project_id.clone(),
        result_id: job.result_id.clone(),
    };
    let mut session = ImportSession::open(project, catalog, AllocationRuleSet::standard())
        .with_entries(entries)
        .named(job.name.clone());
    for draft in &job.schedule {
        session = session.append_schedule_row(*draft)?;
    }

    Ok(LoadedJob { job, base_dir, session })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| job_err(EXIT_ERROR, format!("JSON serialization error: {e}")))
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents)
        .map_err(|e| job_err(EXIT_JOB_INPUT, format!("cannot write {}: {e}", path.display())))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

// ============================================================================
// fields
// ============================================================================

pub fn cmd_fields(job_path: PathBuf) -> Result<(), CliError> {
    let loaded = load_job(&job_path)?;
    let layout = loaded.session.layout();

    println!("{}", to_json(layout)?);

    let read_only = layout
        .fields
        .iter()
        .filter(|f| matches!(f.state, FieldState::ReadOnly { .. }))
        .count();
    let disabled = layout
        .fields
        .iter()
        .filter(|f| matches!(f.state, FieldState::Disabled { .. }))
        .count();
    eprintln!(
        "{} fields: {} editable, {} read-only, {} disabled",
        layout.fields.len(),
        layout.editable_count(),
        read_only,
        disabled,
    );
    Ok(())
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(job_path: PathBuf, json: bool, output: Option<PathBuf>) -> Result<(), CliError> {
    let loaded = load_job(&job_path)?;
    let session = &loaded.session;

    let verdict = session.validate();
    let summary = compute_summary(
        session.catalog(),
        &AllocationRuleSet::standard(),
        session.layout(),
        session.entries(),
    );

    // Human summary to stderr
    eprintln!(
        "{}: {} source items, {} target slots, {} nonzero entries, {} schedule rows",
        loaded.job.name,
        summary.source_items,
        summary.target_slots,
        summary.nonzero_entries,
        session.schedule().len(),
    );
    for t in &summary.types {
        eprintln!(
            "  {:<9} {:?} {} items -> {} slots",
            t.equipment_type.tag(),
            t.status,
            t.source_items,
            t.target_slots,
        );
    }

    let report = AllocationReport::new(&loaded.job.name, verdict.clone(), summary, session.layout().clone());
    let json_str = to_json(&report)?;
    if let Some(ref path) = output {
        write_file(path, &json_str)?;
    }
    if json {
        println!("{json_str}");
    }

    match verdict {
        Verdict::Ok => {
            eprintln!("allocation ok");
            Ok(())
        }
        Verdict::Rejected(issue) => Err(issue.into()),
    }
}

// ============================================================================
// payload
// ============================================================================

pub fn cmd_payload(job_path: PathBuf, output: Option<PathBuf>, name: Option<String>) -> Result<(), CliError> {
    let loaded = load_job(&job_path)?;
    let session = match name {
        Some(name) => loaded.session.named(name),
        None => loaded.session,
    };

    let payload = session.submit_payload().map_err(|issue| {
        let allocation_rejected = !issue.is_profile_issue();
        let err = CliError::from(issue);
        if allocation_rejected {
            err.with_hint("run `olrecon validate` for the full report")
        } else {
            err
        }
    })?;
    let json_str = to_json(&payload)?;

    let target = output.or_else(|| {
        loaded
            .job
            .output
            .payload
            .as_ref()
            .map(|p| loaded.base_dir.join(p))
    });
    match target {
        Some(path) => write_file(&path, &json_str)?,
        None => println!("{json_str}"),
    }

    eprintln!(
        "payload '{}': {} allocation records, {} dates",
        payload.name,
        payload.allocation.len(),
        payload.dates.len(),
    );
    Ok(())
}

// ============================================================================
// check-config
// ============================================================================

pub fn cmd_check_config(job_path: PathBuf) -> Result<(), CliError> {
    let (job, _) = read_job(&job_path)?;

    validate_profile_name(&job.name)?;
    let schedule = Schedule::try_from(job.schedule.clone())?;

    eprintln!("ok: job '{}' ({} schedule rows)", job.name.trim(), schedule.len());
    for row in schedule.rows() {
        eprintln!("  {}", row.label());
    }
    Ok(())
}
