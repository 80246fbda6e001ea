use log;
use serde::Serialize;
use std::collections::BTreeSet;

/// Step subtracted from the recorded indentation for every stack pop, the
/// width of one `"│   "` indent unit.
const INDENT_STEP: isize = 4;

/// The folder and file paths implied by a parsed template diagram, relative
/// to the diagram's root line. Sorted and deduplicated; immutable once
/// parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpectedStructure {
    pub folders: BTreeSet<String>,
    pub files: BTreeSet<String>,
}

impl ExpectedStructure {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }

    /// Top-level segment of the structure, i.e. the diagram's root folder.
    pub fn root_segment(&self) -> Option<&str> {
        self.folders
            .iter()
            .next()
            .and_then(|first| first.split('/').next())
    }
}

/// Reconstructs the expected folder/file paths from an indented tree diagram.
///
/// The first non-blank line names the root folder. Every later line carrying
/// a `├──` or `└──` connector contributes one item: trailing-slash names are
/// folders, everything else a file. `#` starts a trailing comment; blank and
/// `...` placeholder names are skipped. Depth is recovered from the character
/// width of the leading non-word run, popping the path stack in fixed
/// four-character steps. Malformed input degrades to a best-effort
/// reconstruction; this function never fails.
pub fn parse_template(text: &str) -> ExpectedStructure {
    let mut structure = ExpectedStructure::default();
    let mut stack: Vec<String> = Vec::new();
    let mut last_indent: isize = -1;

    let trimmed = text.trim();
    let mut lines = trimmed.lines();
    let root = match lines.next() {
        Some(first) => first.trim().trim_end_matches('/'),
        None => return structure,
    };
    if root.is_empty() {
        return structure;
    }
    structure.folders.insert(root.to_string());
    stack.push(root.to_string());

    for line in lines {
        if !line.contains("├──") && !line.contains("└──") {
            continue;
        }
        let relevant = line.split('#').next().unwrap_or("");
        let item = if let Some((_, rest)) = relevant.split_once("└──") {
            rest.trim()
        } else if let Some((_, rest)) = relevant.split_once("├──") {
            rest.trim()
        } else {
            continue;
        };
        if item.is_empty() || item == "..." {
            continue;
        }

        let is_folder = item.ends_with('/');
        let name = item.trim_end_matches('/');
        let indent = leading_indent_width(line);

        while indent <= last_indent && stack.len() > 1 {
            stack.pop();
            if stack.len() > 1 {
                last_indent -= INDENT_STEP;
            } else {
                last_indent = -1;
            }
        }

        let mut path = stack.join("/");
        path.push('/');
        path.push_str(name);

        if is_folder {
            structure.folders.insert(path);
            if indent > last_indent {
                stack.push(name.to_string());
                last_indent = indent;
            }
        } else {
            structure.files.insert(path);
        }
    }

    log::debug!(
        "Parsed template: {} folders, {} files",
        structure.folders.len(),
        structure.files.len()
    );
    structure
}

// Character count of everything before the first run of word, dot or hyphen
// characters. Tolerates connector glyphs, guide bars and plain whitespace
// alike, which is what makes hand-authored templates parse the same as
// generated ones.
fn leading_indent_width(line: &str) -> isize {
    line.chars()
        .take_while(|c| !(c.is_alphanumeric() || matches!(c, '_' | '.' | '-')))
        .count() as isize
}
