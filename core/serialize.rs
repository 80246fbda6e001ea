use log;
use std::path::Path;

use crate::reader::read_file_safely;
use crate::rules::IgnoreRules;
use crate::run::AnalysisRun;
use crate::walk::{walk, EntryKind};

/// Line rendered when nothing survives filtering.
pub const EMPTY_TREE_PLACEHOLDER: &str = "├── (empty or permission denied)";
/// Message used when consolidation produced no sections.
pub const EMPTY_CODE_PLACEHOLDER: &str = "_No code files were found or processed._\n";

const INDENT_UNIT: &str = "│   ";

/// Renders the filtered tree as an indented line-art diagram.
///
/// The first line is the root directory name with a trailing slash. Each kept
/// directory gets one line indented by its depth; directory lines always use
/// the continuation connector, while files use the terminal connector only
/// when they are the last entry of their directory's raw listing. The
/// asymmetry is deliberate: the template parser's indentation arithmetic
/// depends on the four-character indent unit, not on the connector glyph.
pub fn render_tree(root: &Path, rules: &IgnoreRules, run: &mut AnalysisRun) -> String {
    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());

    let mut lines = vec![format!("{}/", root_name)];
    let entries = walk(root, rules, run);
    if entries.is_empty() {
        lines.push(EMPTY_TREE_PLACEHOLDER.to_string());
        return lines.join("\n");
    }

    for entry in &entries {
        let indent = INDENT_UNIT.repeat(entry.depth);
        match entry.kind {
            EntryKind::Dir => {
                lines.push(format!("{}├── {}/", indent, entry.file_name()));
            }
            EntryKind::File { last_in_dir } => {
                let connector = if last_in_dir { "└──" } else { "├──" };
                lines.push(format!("{}{} {}", indent, connector, entry.file_name()));
            }
        }
    }
    lines.join("\n")
}

/// Concatenates every kept file recognized as code into Markdown sections:
/// a heading with the root-relative path followed by a fenced block tagged
/// with the bare extension.
///
/// Files that fail the code-extension test or fail to read are counted as
/// skipped on the run, never as errors. Cancellation and timeout are polled
/// before each file; a soft stop returns whatever was gathered.
pub fn consolidate(
    root: &Path,
    rules: &IgnoreRules,
    max_file_size: u64,
    run: &mut AnalysisRun,
) -> String {
    let entries = walk(root, rules, run);
    let mut sections = Vec::new();

    for entry in &entries {
        if entry.is_dir() {
            continue;
        }
        if run.check_timeout() {
            run.log_error("Consolidation stopped by timeout");
            break;
        }
        if run.is_cancelled() {
            run.log_warning("Consolidation cancelled");
            break;
        }

        let name = entry.file_name();
        if !rules.is_recognized_code(&name) {
            run.files_skipped += 1;
            continue;
        }

        let (content, ok) = read_file_safely(&entry.path, max_file_size, run);
        if ok && !content.is_empty() {
            sections.push(format!(
                "### `{}`\n\n```{}\n{}\n```\n",
                entry.relative.display(),
                rules.code_tag(&name),
                content
            ));
            run.files_processed += 1;
            if run.files_processed % 10 == 0 {
                log::info!("Processed {} files...", run.files_processed);
            }
        } else {
            run.files_skipped += 1;
        }
    }

    if sections.is_empty() {
        EMPTY_CODE_PLACEHOLDER.to_string()
    } else {
        sections.join("\n")
    }
}
