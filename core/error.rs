use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("TOML Parsing Error: {0}")]
    TomlParse(String),

    #[error("TOML Serialization Error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON Serialization Error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Read Error: Path '{path}', Error: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File Write Error: Path '{path}', Error: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory Creation Error: Path '{path}', Error: {source}")]
    DirCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    #[error("Duration Parsing Error: {0}")]
    DurationParse(String),

    #[error("Size Parsing Error: {0}")]
    SizeParse(String),
}

impl From<parse_duration::parse::Error> for AppError {
    fn from(err: parse_duration::parse::Error) -> Self {
        AppError::DurationParse(err.to_string())
    }
}

impl From<byte_unit::ParseError> for AppError {
    fn from(err: byte_unit::ParseError) -> Self {
        AppError::SizeParse(err.to_string())
    }
}
