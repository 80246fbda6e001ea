use log;
use std::fs;
use std::path::{Path, PathBuf};

use crate::rules::IgnoreRules;
use crate::run::AnalysisRun;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    /// `last_in_dir` reflects the file's position in the directory's raw
    /// (pre-filter) listing; the tree renderer uses it for the terminal
    /// connector, so an ignored trailing file means no terminal connector.
    File {
        last_in_dir: bool,
    },
}

/// One kept directory or file produced by the walk, in pre-order.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub relative: PathBuf,
    /// Indentation multiplier for rendering: a directory sits at the number
    /// of separators in its relative path, its files one level deeper.
    pub depth: usize,
    pub kind: EntryKind,
}

impl WalkEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Dir)
    }
}

/// Walks `root` depth-first, directories before their contents, files before
/// subdirectories within each directory, both sorted by name for stable
/// output.
///
/// Ignored directories are pruned before descending; symbolic links are never
/// followed. Unreadable directories log a warning and are treated as empty.
/// The run's timeout and cancellation flag are polled before each directory;
/// on a soft stop the entries gathered so far are returned as-is.
pub fn walk(root: &Path, rules: &IgnoreRules, run: &mut AnalysisRun) -> Vec<WalkEntry> {
    log::debug!("Walking project directory: {}", root.display());
    let mut entries = Vec::new();
    walk_dir(root, root, rules, run, &mut entries);
    log::debug!("Walk finished with {} kept entries.", entries.len());
    entries
}

fn walk_dir(
    root: &Path,
    dir: &Path,
    rules: &IgnoreRules,
    run: &mut AnalysisRun,
    out: &mut Vec<WalkEntry>,
) {
    if run.should_stop() {
        return;
    }

    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) => {
            run.log_warning(format!("Cannot read directory {}: {}", dir.display(), e));
            return;
        }
    };

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    let mut subdirs: Vec<(String, PathBuf)> = Vec::new();
    for entry in read {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                run.log_warning(format!("Error listing entry in {}: {}", dir.display(), e));
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        let is_dir_like = match entry.file_type() {
            // Symlinked directories are classified as directory candidates so
            // the ignore rules can report and prune them.
            Ok(ft) => ft.is_dir() || (ft.is_symlink() && path.is_dir()),
            Err(e) => {
                run.log_warning(format!("Cannot classify {}: {}", path.display(), e));
                continue;
            }
        };
        if is_dir_like {
            subdirs.push((name, path));
        } else {
            files.push((name, path));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    subdirs.sort_by(|a, b| a.0.cmp(&b.0));

    let dir_level = level_of(root, dir);

    let raw_file_count = files.len();
    for (index, (name, path)) in files.into_iter().enumerate() {
        let relative = relative_to(root, &path);
        if rules.should_ignore_file(&name, &relative.to_string_lossy()) {
            log::trace!("Ignoring file: {}", relative.display());
            continue;
        }
        out.push(WalkEntry {
            path,
            relative,
            depth: dir_level + 1,
            kind: EntryKind::File {
                last_in_dir: index + 1 == raw_file_count,
            },
        });
    }

    for (name, path) in subdirs {
        if run.should_stop() {
            return;
        }
        if rules.should_ignore_dir(&name, &path, run) {
            log::trace!("Pruning directory: {}", path.display());
            continue;
        }
        let relative = relative_to(root, &path);
        out.push(WalkEntry {
            path: path.clone(),
            relative,
            depth: level_of(root, &path),
            kind: EntryKind::Dir,
        });
        walk_dir(root, &path, rules, run, out);
    }
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf())
}

// Rendered indent level: separator count of the relative path. The root and
// its immediate children both sit at level zero, matching the template
// format's four-characters-per-level arithmetic.
fn level_of(root: &Path, dir: &Path) -> usize {
    relative_to(root, dir).components().count().saturating_sub(1)
}
