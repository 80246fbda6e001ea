use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, Result};

pub const DEFAULT_CONFIG_DIR: &str = ".treescribe";
pub const DEFAULT_CONFIG_FILENAME: &str = "treescribe.toml";
pub const DEFAULT_OUTPUT_FILENAME: &str = "project_bundle.md";
pub const DEFAULT_MAX_FILE_SIZE: &str = "10 MiB";
pub const DEFAULT_TIMEOUT: &str = "300s";

// Characters replaced with '_' in output filenames.
const FORBIDDEN_FILENAME_CHARS: [char; 8] = ['<', '>', ':', '"', '|', '?', '*', '\0'];
const MAX_FILENAME_LEN: usize = 200;
const MAX_FILENAME_STEM_LEN: usize = 196;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default)]
    pub project_name: Option<String>,
    /// Ignore-rule profiles applied on top of the base rule set.
    #[serde(default)]
    pub profiles: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    #[serde(default = "default_output_filename")]
    pub output: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: String,
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: default_output_filename(),
            max_file_size: default_max_file_size(),
            timeout: default_timeout(),
        }
    }
}

fn default_output_filename() -> String {
    DEFAULT_OUTPUT_FILENAME.to_string()
}
fn default_max_file_size() -> String {
    DEFAULT_MAX_FILE_SIZE.to_string()
}
fn default_timeout() -> String {
    DEFAULT_TIMEOUT.to_string()
}

impl Config {
    /// Resolves and validates the project root: CLI value, then the
    /// `PROJECT_ROOT` environment variable, then the current directory.
    /// The result must exist and be a readable directory.
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        let resolved = path_to_resolve.canonicalize().map_err(|e| {
            AppError::Config(format!(
                "Project root '{}' is not accessible: {}",
                path_to_resolve.display(),
                e
            ))
        })?;
        if !resolved.is_dir() {
            return Err(AppError::Config(format!(
                "Project root is not a directory: {}",
                resolved.display()
            )));
        }
        Ok(resolved)
    }

    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p_str) => {
                let expanded = shellexpand::tilde(p_str);
                let path = PathBuf::from(expanded.as_ref());
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = project_root
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        toml::from_str::<Config>(&toml_content).map_err(|e| {
            AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                e
            ))
        })
    }

    /// Default configuration rendered as TOML, for bootstrapping a config
    /// file.
    pub fn default_toml() -> Result<String> {
        Ok(toml::to_string_pretty(&Config::default())?)
    }

    pub fn get_effective_project_name(&self, project_root: &Path) -> String {
        self.general.project_name.clone().unwrap_or_else(|| {
            project_root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "UnknownProject".to_string())
        })
    }

    pub fn get_max_file_size(&self) -> Result<u64> {
        let byte = byte_unit::Byte::parse_str(&self.export.max_file_size, true).map_err(|e| {
            AppError::InvalidArgument(format!(
                "Invalid max file size '{}': {}. Use format like '10 MiB', '500 KB'.",
                self.export.max_file_size, e
            ))
        })?;
        Ok(byte.as_u64())
    }

    pub fn get_timeout(&self) -> Result<Duration> {
        parse_duration::parse(&self.export.timeout).map_err(|e| {
            AppError::InvalidArgument(format!(
                "Invalid timeout duration '{}': {}. Use format like '300s', '5m'.",
                self.export.timeout, e
            ))
        })
    }
}

/// Makes a safe report filename: forbidden characters replaced with `_`,
/// a `.md` extension forced, and the name capped at 200 characters.
/// Blank input falls back to the default filename.
pub fn sanitize_output_filename(filename: &str) -> String {
    let mut name = if filename.trim().is_empty() {
        DEFAULT_OUTPUT_FILENAME.to_string()
    } else {
        filename.to_string()
    };
    for ch in FORBIDDEN_FILENAME_CHARS {
        if name.contains(ch) {
            name = name.replace(ch, "_");
        }
    }
    if !name.to_lowercase().ends_with(".md") {
        name.push_str(".md");
    }
    if name.chars().count() > MAX_FILENAME_LEN {
        let (stem, ext) = match name.rfind('.') {
            Some(idx) => (name[..idx].to_string(), name[idx..].to_string()),
            None => (name.clone(), String::new()),
        };
        name = stem.chars().take(MAX_FILENAME_STEM_LEN).collect::<String>() + &ext;
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_forbidden_characters() {
        assert_eq!(
            sanitize_output_filename("report<bad>:name"),
            "report_bad__name.md"
        );
    }

    #[test]
    fn sanitize_forces_md_extension() {
        assert_eq!(sanitize_output_filename("notes.txt"), "notes.txt.md");
        assert_eq!(sanitize_output_filename("notes.md"), "notes.md");
        assert_eq!(sanitize_output_filename("NOTES.MD"), "NOTES.MD");
    }

    #[test]
    fn sanitize_blank_falls_back_to_default() {
        assert_eq!(sanitize_output_filename(""), DEFAULT_OUTPUT_FILENAME);
        assert_eq!(sanitize_output_filename("   "), DEFAULT_OUTPUT_FILENAME);
    }

    #[test]
    fn sanitize_caps_length() {
        let long = "x".repeat(400);
        let sanitized = sanitize_output_filename(&long);
        assert!(sanitized.chars().count() <= MAX_FILENAME_LEN);
        assert!(sanitized.ends_with(".md"));
    }

    #[test]
    fn defaults_parse_to_usable_limits() {
        let config = Config::default();
        assert_eq!(config.get_max_file_size().unwrap(), 10 * 1024 * 1024);
        assert_eq!(config.get_timeout().unwrap(), Duration::from_secs(300));
        assert_eq!(config.export.output, DEFAULT_OUTPUT_FILENAME);
    }

    #[test]
    fn default_toml_round_trips() {
        let rendered = Config::default_toml().unwrap();
        let reparsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(reparsed, Config::default());
    }

    #[test]
    fn invalid_limit_strings_are_rejected() {
        let mut config = Config::default();
        config.export.max_file_size = "plenty".to_string();
        assert!(config.get_max_file_size().is_err());
        config.export.timeout = "whenever".to_string();
        assert!(config.get_timeout().is_err());
    }
}
