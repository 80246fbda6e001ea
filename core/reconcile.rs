use log;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::template::ExpectedStructure;

/// Expected entries absent from disk, in sorted order with kind preserved.
/// Computed fresh on every verification pass; never cached across
/// filesystem mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissingItems {
    pub folders: Vec<String>,
    pub files: Vec<String>,
}

impl MissingItems {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }

    pub fn total(&self) -> usize {
        self.folders.len() + self.files.len()
    }
}

/// Result of a materialization pass: what was created and what failed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterializeOutcome {
    pub created_folders: Vec<String>,
    pub created_files: Vec<String>,
    pub failures: Vec<String>,
}

impl MaterializeOutcome {
    /// Count of successfully created items.
    pub fn created(&self) -> usize {
        self.created_folders.len() + self.created_files.len()
    }
}

/// Picks the directory the expected structure's relative paths resolve
/// against.
///
/// When the structure's root segment equals the selected directory's own
/// name, the base is the selected directory's parent, so re-joining the root
/// path lands back on the selection. Otherwise the expected root is created
/// as a child of the selection.
pub fn resolve_base_dir(expected: &ExpectedStructure, selected_dir: &Path) -> PathBuf {
    let root_segment = match expected.root_segment() {
        Some(segment) if !segment.is_empty() => segment,
        _ => return selected_dir.to_path_buf(),
    };
    let selected_name = selected_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if root_segment == selected_name {
        selected_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| selected_dir.to_path_buf())
    } else {
        selected_dir.to_path_buf()
    }
}

/// Read-only pass over the expected structure: folders must exist as
/// directories, files as regular files. Running it twice without touching
/// the filesystem yields identical results.
pub fn verify(base_dir: &Path, expected: &ExpectedStructure) -> MissingItems {
    let folders = expected
        .folders
        .iter()
        .filter(|folder| !base_dir.join(folder.as_str()).is_dir())
        .cloned()
        .collect();
    let files = expected
        .files
        .iter()
        .filter(|file| !base_dir.join(file.as_str()).is_file())
        .cloned()
        .collect();
    let missing = MissingItems { folders, files };
    log::debug!(
        "Verification against {}: {} missing",
        base_dir.display(),
        missing.total()
    );
    missing
}

/// Creates every missing folder, then every missing file (empty, parent
/// directories ensured). Per-item failures are recorded and skipped;
/// the rest of the list is still processed.
///
/// Immediately re-running [`verify`] after this with no other filesystem
/// activity reports nothing missing, provided no item failed.
pub fn materialize(base_dir: &Path, missing: &MissingItems) -> MaterializeOutcome {
    let mut outcome = MaterializeOutcome::default();

    for folder in &missing.folders {
        let path = base_dir.join(folder);
        match fs::create_dir_all(&path) {
            Ok(()) => {
                log::debug!("Created folder: {}", path.display());
                outcome.created_folders.push(folder.clone());
            }
            Err(e) => {
                log::warn!("Failed to create folder {}: {}", path.display(), e);
                outcome.failures.push(format!("{}: {}", folder, e));
            }
        }
    }

    for file in &missing.files {
        let path = base_dir.join(file);
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Failed to create parent of {}: {}", path.display(), e);
                outcome.failures.push(format!("{}: {}", file, e));
                continue;
            }
        }
        match fs::File::create(&path) {
            Ok(_) => {
                log::debug!("Created file: {}", path.display());
                outcome.created_files.push(file.clone());
            }
            Err(e) => {
                log::warn!("Failed to create file {}: {}", path.display(), e);
                outcome.failures.push(format!("{}: {}", file, e));
            }
        }
    }

    outcome
}
