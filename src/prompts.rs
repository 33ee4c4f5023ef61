//! Centralized prompt and description text for registered agents.

use crate::metadata::CaseStudyName;
use crate::services::RemoteFile;

/// System instructions given to every case-study agent.
pub const AGENT_INSTRUCTIONS: &str = r#"You are a research assistant for satellite and climate case studies.

You have read access, through the file search tool, to the source data produced by one case-study run: metadata descriptors, tabular exports and textual reports. Images are not available to you.

Guidelines:
- Ground every answer in the attached files and name the file you used
- Say so plainly when the files do not contain the answer
- Keep units and timestamps exactly as they appear in the data
- Do not invent measurements, locations or dates"#;

/// Title used for the research context, conversation and agent of a run.
pub fn canonical_title(case_study: CaseStudyName, tracer_id: &str, job_id: u64) -> String {
    format!("{}_{}_{}", case_study, tracer_id, job_id)
}

/// Human-readable description of a case-study run.
pub fn agent_description(case_study: CaseStudyName, tracer_id: &str, job_id: u64) -> String {
    format!(
        "Research context for the {} case study, tracer {}, job {}.",
        case_study, tracer_id, job_id
    )
}

/// Addendum telling the agent which files it was given but cannot search.
pub fn unsupported_files_note(files: &[RemoteFile]) -> Option<String> {
    if files.is_empty() {
        return None;
    }

    let listing: Vec<String> = files
        .iter()
        .map(|f| format!("- {}", f.relative_path))
        .collect();

    Some(format!(
        "The following files belong to this case study but could not be indexed; tell the user you cannot read them if asked:\n{}",
        listing.join("\n")
    ))
}
