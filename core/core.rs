pub mod config;
pub mod error;
pub mod reader;
pub mod reconcile;
pub mod report;
pub mod rules;
pub mod run;
pub mod serialize;
pub mod template;
pub mod walk;

pub use config::{Config, sanitize_output_filename};
pub use error::{AppError, Result};
pub use reader::read_file_safely;
pub use reconcile::{MaterializeOutcome, MissingItems, materialize, resolve_base_dir, verify};
pub use report::generate_report;
pub use rules::IgnoreRules;
pub use run::AnalysisRun;
pub use serialize::{consolidate, render_tree};
pub use template::{ExpectedStructure, parse_template};
pub use walk::{EntryKind, WalkEntry, walk};
