use crate::cli_args::VerifyArgs;
use crate::output;
use anyhow::{Context, Result};
use log;
use serde::Serialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use treescribe_core::{self as core, ExpectedStructure, MissingItems};

#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub base_dir: PathBuf,
    pub expected_folders: usize,
    pub expected_files: usize,
    pub missing: MissingItems,
}

pub fn handle_verify_command(args: VerifyArgs, quiet: bool) -> Result<()> {
    let (base_dir, structure, missing) =
        run_verification(&args.template, args.base_dir.as_deref())?;

    if args.json {
        let report = VerifyReport {
            base_dir,
            expected_folders: structure.folders.len(),
            expected_files: structure.files.len(),
            missing,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_verify_results(&base_dir, &structure, &missing, quiet);
    }
    Ok(())
}

/// Shared parse + resolve + verify pass, also used by the create command.
pub fn run_verification(
    template: &std::path::Path,
    base_dir: Option<&std::path::Path>,
) -> Result<(PathBuf, ExpectedStructure, MissingItems)> {
    let text = fs::read_to_string(template)
        .with_context(|| format!("Failed to read template {}", template.display()))?;
    let structure = core::parse_template(&text);
    if structure.is_empty() {
        anyhow::bail!(core::AppError::InvalidArgument(format!(
            "Template '{}' contains no recognizable structure",
            template.display()
        )));
    }

    let selected = match base_dir {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir().context("Failed to determine current directory")?,
    };
    let base = core::resolve_base_dir(&structure, &selected);
    log::info!(
        "Verifying {} folders and {} files against {}",
        structure.folders.len(),
        structure.files.len(),
        base.display()
    );

    let missing = core::verify(&base, &structure);
    Ok((base, structure, missing))
}
