use log;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::run::AnalysisRun;

/// Profile names accepted by `apply_profile`. Anything else is ignored.
pub const KNOWN_PROFILES: &[&str] = &["php", "react", "spring", "python", "node", "nodejs"];

// Hidden directories that are still traversed despite the leading dot.
static ALLOWED_HIDDEN_DIRS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from([".github", ".gitlab"]));

// Hidden files that are still kept despite the leading dot.
static ALLOWED_HIDDEN_FILES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from([".gitkeep", ".htaccess", ".env.example", ".editorconfig"]));

const BASE_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    "venv",
    "env",
    ".venv",
    ".env",
    ".idea",
    ".vscode",
    "coverage",
    ".pytest_cache",
    ".mypy_cache",
    ".tox",
    ".nox",
];

const BASE_DIRS_EXACT: &[&str] = &[
    "build",
    "dist",
    "target",
    "out",
    "bin",
    "obj",
    "logs",
    "tmp",
    "temp",
    ".gradle",
    ".mvn",
    "node_modules",
    "bower_components",
    "jspm_packages",
    "vendor",
];

const BASE_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    ".ds_store",
    "thumbs.db",
    "desktop.ini",
];

const BASE_EXTENSIONS: &[&str] = &[
    ".log",
    ".tmp",
    ".cache",
    ".lock",
    ".pid",
    ".swp",
    ".swo",
    ".bak",
    ".backup",
    ".old",
    ".orig",
    ".ico",
    ".png",
    ".jpg",
    ".jpeg",
    ".gif",
    ".svg",
    ".webp",
    ".bmp",
    ".tiff",
    ".pdf",
    ".doc",
    ".docx",
    ".xls",
    ".xlsx",
    ".ppt",
    ".pptx",
    ".zip",
    ".rar",
    ".7z",
    ".tar",
    ".gz",
    ".bz2",
    ".xz",
    ".exe",
    ".dll",
    ".so",
    ".dylib",
    ".a",
    ".lib",
    ".deb",
    ".rpm",
    ".apk",
    ".dmg",
    ".iso",
    ".map",
    ".pyc",
    ".pyo",
    ".pyd",
    ".class",
    ".o",
    ".obj",
];

const BASE_CODE_EXTENSIONS: &[&str] = &[
    ".html",
    ".htm",
    ".css",
    ".scss",
    ".sass",
    ".less",
    ".js",
    ".jsx",
    ".ts",
    ".tsx",
    ".mjs",
    ".cjs",
    ".vue",
    ".svelte",
    ".astro",
    ".json",
    ".json5",
    ".jsonc",
    ".yaml",
    ".yml",
    ".toml",
    ".xml",
    ".ini",
    ".cfg",
    ".conf",
    ".config",
    ".md",
    ".markdown",
    ".txt",
    ".text",
    ".py",
    ".pyw",
    ".pyi",
    ".java",
    ".kt",
    ".kts",
    ".scala",
    ".c",
    ".cpp",
    ".cc",
    ".cxx",
    ".h",
    ".hpp",
    ".hh",
    ".hxx",
    ".cs",
    ".vb",
    ".fs",
    ".fsx",
    ".rb",
    ".rake",
    ".go",
    ".rs",
    ".swift",
    ".m",
    ".mm",
    ".lua",
    ".pl",
    ".pm",
    ".r",
    ".sh",
    ".bash",
    ".zsh",
    ".fish",
    ".ps1",
    ".bat",
    ".cmd",
    ".sql",
    ".psql",
    ".mysql",
    ".sqlite",
    // Extensionless or dotfile names recognized as code by full lowercase name.
    ".env.example",
    ".gitignore",
    ".dockerignore",
    "dockerfile",
    "makefile",
    "rakefile",
];

/// Exclusion rule sets applied during traversal, plus the allowlist of
/// extensions (and full filenames) treated as code for consolidation.
///
/// Rule sets are append-only: profiles add rules, nothing ever removes one.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    dirs: HashSet<String>,
    dirs_exact: HashSet<String>,
    files: HashSet<String>,
    extensions: HashSet<String>,
    paths: HashSet<String>,
    code_extensions: HashSet<String>,
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self::base()
    }
}

impl IgnoreRules {
    /// The fixed default rule set: common VCS/dependency/build directories,
    /// lock files, binary/media/archive extensions and the code allowlist.
    pub fn base() -> Self {
        let to_set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        IgnoreRules {
            dirs: to_set(BASE_DIRS),
            dirs_exact: to_set(BASE_DIRS_EXACT),
            files: to_set(BASE_FILES),
            extensions: to_set(BASE_EXTENSIONS),
            paths: HashSet::new(),
            code_extensions: to_set(BASE_CODE_EXTENSIONS),
        }
    }

    pub fn apply_profiles<S: AsRef<str>>(&mut self, profiles: &[S]) {
        for profile in profiles {
            self.apply_profile(profile.as_ref());
        }
    }

    /// Additively applies one named profile. Unknown names are ignored.
    pub fn apply_profile(&mut self, name: &str) {
        match name.to_lowercase().as_str() {
            "php" => self.add_php_rules(),
            "react" => self.add_react_rules(),
            "spring" => self.add_spring_rules(),
            "python" => self.add_python_rules(),
            "node" | "nodejs" => self.add_node_rules(),
            other => {
                log::debug!("Ignoring unknown profile name: {}", other);
            }
        }
    }

    fn add_php_rules(&mut self) {
        log::trace!("Applying 'php' profile rules");
        for d in ["vendor", "cache"] {
            self.dirs_exact.insert(d.to_string());
        }
        for p in [
            "storage/logs",
            "storage/framework/cache",
            "storage/framework/sessions",
            "storage/framework/views",
            "bootstrap/cache",
        ] {
            self.paths.insert(p.to_string());
        }
        for f in ["composer.lock", "composer.phar", ".phpunit.result.cache"] {
            self.files.insert(f.to_string());
        }
        self.extensions.insert(".phar".to_string());
        for e in [".php", ".phtml", ".php3", ".php4", ".php5", ".php7", ".phps"] {
            self.code_extensions.insert(e.to_string());
        }
    }

    fn add_react_rules(&mut self) {
        log::trace!("Applying 'react' profile rules");
        for d in ["node_modules", ".next", ".nuxt", "coverage"] {
            self.dirs_exact.insert(d.to_string());
        }
        for f in ["package-lock.json", "yarn.lock", "pnpm-lock.yaml"] {
            self.files.insert(f.to_string());
        }
    }

    fn add_spring_rules(&mut self) {
        log::trace!("Applying 'spring' profile rules");
        for d in ["target", ".mvn", ".gradle"] {
            self.dirs_exact.insert(d.to_string());
        }
        for f in [
            "mvnw",
            "mvnw.cmd",
            "gradlew",
            "gradlew.bat",
            "gradle-wrapper.jar",
            "maven-wrapper.jar",
        ] {
            self.files.insert(f.to_string());
        }
        for e in [".java", ".kt", ".xml", ".properties", ".gradle", ".sql"] {
            self.code_extensions.insert(e.to_string());
        }
    }

    fn add_python_rules(&mut self) {
        log::trace!("Applying 'python' profile rules");
        for d in [
            "__pycache__",
            ".pytest_cache",
            ".mypy_cache",
            ".tox",
            ".nox",
            "htmlcov",
            ".coverage",
        ] {
            self.dirs_exact.insert(d.to_string());
        }
        for e in [".pyc", ".pyo", ".pyd", ".whl", ".egg"] {
            self.extensions.insert(e.to_string());
        }
        for f in ["poetry.lock", "pipfile.lock"] {
            self.files.insert(f.to_string());
        }
    }

    fn add_node_rules(&mut self) {
        log::trace!("Applying 'node' profile rules");
        for d in ["node_modules", ".npm", ".yarn", ".pnpm-store"] {
            self.dirs_exact.insert(d.to_string());
        }
        for f in ["package-lock.json", "yarn.lock", "pnpm-lock.yaml"] {
            self.files.insert(f.to_string());
        }
    }

    /// Decides whether a directory is pruned before descending.
    ///
    /// Symbolic links are never followed and permission-denied directories are
    /// skipped; both cases log a warning into the run. Evaluation fails
    /// closed: anything that cannot be classified is ignored.
    pub fn should_ignore_dir(&self, dir_name: &str, full_path: &Path, run: &mut AnalysisRun) -> bool {
        if dir_name.is_empty() {
            return true;
        }
        if dir_name.starts_with('.') && !ALLOWED_HIDDEN_DIRS.contains(dir_name) {
            return true;
        }
        if self.dirs.contains(dir_name) || self.dirs_exact.contains(dir_name) {
            return true;
        }
        match fs::symlink_metadata(full_path) {
            Ok(meta) => {
                if meta.file_type().is_symlink() {
                    run.log_warning(format!("Symbolic link skipped: {}", dir_name));
                    return true;
                }
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                run.log_warning(format!("No permission to access: {}", dir_name));
                return true;
            }
            // Cannot stat for another reason; the walker logs the real failure
            // when it tries to read the directory.
            Err(_) => {}
        }
        false
    }

    /// Decides whether a file is excluded from the tree and consolidation.
    pub fn should_ignore_file(&self, file_name: &str, relative_path: &str) -> bool {
        if file_name.is_empty() {
            return true;
        }
        let lower_name = file_name.to_lowercase();
        if self.files.contains(&lower_name) {
            return true;
        }
        if let Some(ext) = extension_of(&lower_name) {
            if self.extensions.contains(&ext) {
                return true;
            }
        }
        if lower_name.starts_with('.') && !ALLOWED_HIDDEN_FILES.contains(lower_name.as_str()) {
            return true;
        }
        let normalized = relative_path.replace('\\', "/");
        if self.paths.iter().any(|p| normalized.contains(p.as_str())) {
            return true;
        }
        false
    }

    /// True when the file counts as code for consolidation, by extension or
    /// by full lowercase name (e.g. `Dockerfile`).
    pub fn is_recognized_code(&self, file_name: &str) -> bool {
        let lower_name = file_name.to_lowercase();
        if self.code_extensions.contains(&lower_name) {
            return true;
        }
        extension_of(&lower_name).is_some_and(|ext| self.code_extensions.contains(&ext))
    }

    /// Fence tag for a consolidated file: the bare extension without the dot,
    /// or empty for extensionless names.
    pub fn code_tag(&self, file_name: &str) -> String {
        extension_of(&file_name.to_lowercase())
            .map(|ext| ext.trim_start_matches('.').to_string())
            .unwrap_or_default()
    }
}

// Last-dot extension including the dot, lowercase input assumed. Dotfiles
// like `.env` have no extension.
fn extension_of(lower_name: &str) -> Option<String> {
    Path::new(lower_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn run() -> AnalysisRun {
        AnalysisRun::new(Duration::from_secs(300))
    }

    #[test]
    fn default_rules_ignore_dependency_dirs() {
        let rules = IgnoreRules::base();
        let mut run = run();
        assert!(rules.should_ignore_dir("node_modules", Path::new("/p/node_modules"), &mut run));
        assert!(rules.should_ignore_dir("target", Path::new("/p/target"), &mut run));
        assert!(rules.should_ignore_dir(".git", Path::new("/p/.git"), &mut run));
        assert!(!rules.should_ignore_dir("src", Path::new("/p/src"), &mut run));
    }

    #[test]
    fn hidden_dir_exceptions_are_traversed() {
        let rules = IgnoreRules::base();
        let mut run = run();
        assert!(!rules.should_ignore_dir(".github", Path::new("/p/.github"), &mut run));
        assert!(!rules.should_ignore_dir(".gitlab", Path::new("/p/.gitlab"), &mut run));
        assert!(rules.should_ignore_dir(".cache", Path::new("/p/.cache"), &mut run));
    }

    #[test]
    fn hidden_file_exceptions_are_kept() {
        let rules = IgnoreRules::base();
        assert!(!rules.should_ignore_file(".gitkeep", ".gitkeep"));
        assert!(!rules.should_ignore_file(".env.example", ".env.example"));
        assert!(rules.should_ignore_file(".env", ".env"));
        assert!(rules.should_ignore_file(".DS_Store", ".DS_Store"));
    }

    #[test]
    fn extension_and_exact_name_rules() {
        let rules = IgnoreRules::base();
        assert!(rules.should_ignore_file("app.log", "app.log"));
        assert!(rules.should_ignore_file("photo.PNG", "assets/photo.PNG"));
        assert!(rules.should_ignore_file("yarn.lock", "yarn.lock"));
        assert!(!rules.should_ignore_file("main.rs", "src/main.rs"));
    }

    #[test]
    fn php_profile_adds_path_rules() {
        let mut rules = IgnoreRules::base();
        rules.apply_profile("php");
        assert!(rules.should_ignore_file("laravel.log", "storage/logs/laravel.log"));
        assert!(rules.should_ignore_file("composer.lock", "composer.lock"));
        assert!(rules.is_recognized_code("index.php"));
    }

    #[test]
    fn profiles_are_monotonic() {
        let mut both = IgnoreRules::base();
        both.apply_profile("php");
        both.apply_profile("react");
        let mut run = run();
        // Union of what each profile ignores on its own.
        assert!(both.should_ignore_dir(".next", Path::new("/p/.next"), &mut run));
        assert!(both.should_ignore_dir("cache", Path::new("/p/cache"), &mut run));
        assert!(both.should_ignore_file("composer.phar", "composer.phar"));
        assert!(both.should_ignore_file("pnpm-lock.yaml", "pnpm-lock.yaml"));
    }

    #[test]
    fn unknown_profile_is_silently_ignored() {
        let mut rules = IgnoreRules::base();
        let before = rules.clone();
        rules.apply_profile("fortran");
        assert_eq!(before.dirs_exact, rules.dirs_exact);
        assert_eq!(before.files, rules.files);
        assert_eq!(before.extensions, rules.extensions);
    }

    #[test]
    fn code_recognition_by_name_and_extension() {
        let rules = IgnoreRules::base();
        assert!(rules.is_recognized_code("Dockerfile"));
        assert!(rules.is_recognized_code("Makefile"));
        assert!(rules.is_recognized_code("lib.rs"));
        assert!(!rules.is_recognized_code("binary.exe"));
        assert_eq!(rules.code_tag("main.py"), "py");
        assert_eq!(rules.code_tag("Dockerfile"), "");
    }
}
