use chrono::Local;
use log;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::rules::IgnoreRules;
use crate::run::AnalysisRun;
use crate::serialize;

/// Cap on errors listed in the report appendix.
const MAX_LISTED_ERRORS: usize = 50;
/// Cap on warnings listed in the report appendix.
const MAX_LISTED_WARNINGS: usize = 30;

/// Produces the consolidated report document and writes it to `output_path`.
///
/// The document contains, in order: title, project name and path, the
/// statistics block, the pre-rendered tree, the consolidated code sections
/// and the error/warning appendix. A write failure is returned as a distinct
/// error; when at least one file had been processed, a best-effort
/// `partial_<name>` report (statistics and appendix only) is attempted first,
/// its own failure swallowed.
pub fn generate_report(
    project_root: &Path,
    project_name: &str,
    tree_text: &str,
    rules: &IgnoreRules,
    max_file_size: u64,
    output_path: &Path,
    run: &mut AnalysisRun,
) -> Result<()> {
    log::info!("Consolidating code files...");
    let code_content = serialize::consolidate(project_root, rules, max_file_size, run);

    let stats = render_statistics(run);
    let appendix = render_appendix(run);
    let document = render_document(
        project_root,
        project_name,
        &stats,
        tree_text,
        &code_content,
        &appendix,
    );

    log::info!("Writing report to {}", output_path.display());
    match fs::write(output_path, document) {
        Ok(()) => Ok(()),
        Err(e) => {
            run.log_error(format!(
                "Failed to write report {}: {}",
                output_path.display(),
                e
            ));
            if run.files_processed > 0 {
                write_partial_report(output_path, run);
            }
            Err(AppError::FileWrite {
                path: output_path.to_path_buf(),
                source: e,
            })
        }
    }
}

pub fn render_statistics(run: &AnalysisRun) -> String {
    let mut stats = vec![
        "## Analysis Statistics\n".to_string(),
        format!("- **Files processed:** {}", run.files_processed),
        format!("- **Files skipped:** {}", run.files_skipped),
        format!("- **Errors:** {}", run.errors().len()),
        format!("- **Warnings:** {}", run.warnings().len()),
        format!("- **Date:** {}", Local::now().format("%d/%m/%Y %H:%M:%S")),
    ];
    stats.push(format!("- **Elapsed:** {:.2}s", run.elapsed().as_secs_f64()));
    stats.join("\n")
}

/// Error and warning listings, capped with a truncation notice past the
/// caps. Empty when the run was clean.
pub fn render_appendix(run: &AnalysisRun) -> String {
    let mut sections = Vec::new();
    if !run.errors().is_empty() {
        sections.push("\n## Errors\n".to_string());
        for (i, error) in run.errors().iter().take(MAX_LISTED_ERRORS).enumerate() {
            sections.push(format!("{}. {}", i + 1, error));
        }
        if run.errors().len() > MAX_LISTED_ERRORS {
            sections.push(format!(
                "\n_... and {} more errors_",
                run.errors().len() - MAX_LISTED_ERRORS
            ));
        }
    }
    if !run.warnings().is_empty() {
        sections.push("\n## Warnings\n".to_string());
        for (i, warning) in run.warnings().iter().take(MAX_LISTED_WARNINGS).enumerate() {
            sections.push(format!("{}. {}", i + 1, warning));
        }
        if run.warnings().len() > MAX_LISTED_WARNINGS {
            sections.push(format!(
                "\n_... and {} more warnings_",
                run.warnings().len() - MAX_LISTED_WARNINGS
            ));
        }
    }
    sections.join("\n")
}

fn render_document(
    project_root: &Path,
    project_name: &str,
    stats: &str,
    tree_text: &str,
    code_content: &str,
    appendix: &str,
) -> String {
    let mut doc = String::new();
    doc.push_str("# Project Analysis Report\n\n");
    doc.push_str(&format!("**Project:** `{}`  \n", project_name));
    doc.push_str(&format!("**Path:** `{}`\n\n", project_root.display()));
    doc.push_str("---\n\n");
    doc.push_str(stats);
    doc.push_str("\n\n---\n\n");
    doc.push_str("## Folder Structure\n\n```\n");
    doc.push_str(tree_text);
    doc.push_str("\n```\n\n");
    doc.push_str("---\n\n");
    doc.push_str("## Code File Contents\n\n");
    doc.push_str(code_content);
    if !appendix.is_empty() {
        doc.push_str("\n\n---\n");
        doc.push_str(appendix);
    }
    doc.push_str("\n\n---\n\n");
    doc.push_str("_Report generated automatically by treescribe_\n");
    doc
}

/// Derived filename for the crash-safe fallback report.
pub fn partial_report_path(output_path: &Path) -> PathBuf {
    let file_name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report.md".to_string());
    output_path.with_file_name(format!("partial_{}", file_name))
}

fn write_partial_report(output_path: &Path, run: &AnalysisRun) {
    let partial_path = partial_report_path(output_path);
    log::warn!(
        "Attempting partial report fallback: {}",
        partial_path.display()
    );
    let mut doc = String::from("# Partial Report (Run Interrupted)\n\n");
    doc.push_str(&render_statistics(run));
    doc.push_str(&render_appendix(run));
    doc.push('\n');
    if let Err(e) = fs::write(&partial_path, doc) {
        // Best effort only; nothing left to do if even this fails.
        log::warn!(
            "Failed to write partial report {}: {}",
            partial_path.display(),
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn appendix_is_empty_for_clean_runs() {
        let run = AnalysisRun::new(Duration::from_secs(300));
        assert!(render_appendix(&run).is_empty());
    }

    #[test]
    fn appendix_caps_listings_with_notice() {
        let mut run = AnalysisRun::new(Duration::from_secs(300));
        for i in 0..60 {
            run.log_error(format!("error {}", i));
        }
        for i in 0..40 {
            run.log_warning(format!("warning {}", i));
        }
        let appendix = render_appendix(&run);
        assert!(appendix.contains("## Errors"));
        assert!(appendix.contains("50. "));
        assert!(!appendix.contains("51. [")); // no entries past the cap
        assert!(appendix.contains("_... and 10 more errors_"));
        assert!(appendix.contains("## Warnings"));
        assert!(appendix.contains("_... and 10 more warnings_"));
    }

    #[test]
    fn statistics_report_counters() {
        let mut run = AnalysisRun::new(Duration::from_secs(300));
        run.files_processed = 7;
        run.files_skipped = 3;
        let stats = render_statistics(&run);
        assert!(stats.contains("**Files processed:** 7"));
        assert!(stats.contains("**Files skipped:** 3"));
        assert!(stats.contains("**Elapsed:**"));
    }

    #[test]
    fn partial_path_is_derived_from_output_name() {
        let path = partial_report_path(Path::new("/tmp/out/bundle.md"));
        assert_eq!(path, Path::new("/tmp/out/partial_bundle.md"));
    }
}
