mod cli_args;
mod commands;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::process;

use cli_args::{Cli, Commands, ExportArgs, ProjectConfigOpts};
use treescribe_core::{AppError, Config};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let core_err = e.downcast_ref::<AppError>();
            let exit_code = match core_err {
                Some(AppError::Config(_)) => 1,
                Some(AppError::TomlParse(_)) => 1,
                Some(AppError::TomlSerialize(_)) => 1,
                Some(AppError::Io(_)) => 2,
                Some(AppError::FileRead { .. }) => 2,
                Some(AppError::FileWrite { .. }) => 2,
                Some(AppError::DirCreation { .. }) => 2,
                Some(AppError::InvalidArgument(_)) => 5,
                Some(AppError::DurationParse(_)) => 5,
                Some(AppError::SizeParse(_)) => 5,
                Some(AppError::JsonSerialize(_)) => 6,
                Some(_) => 1,
                None => 1,
            };

            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(command) => match command {
            Commands::Export(args) => {
                log::debug!("Executing 'export' command...");
                commands::export::handle_export_command(args, quiet)?;
            }
            Commands::Verify(args) => {
                log::debug!("Executing 'verify' command...");
                commands::verify::handle_verify_command(args, quiet)?;
            }
            Commands::Create(args) => {
                log::debug!("Executing 'create' command...");
                commands::create::handle_create_command(args, quiet)?;
            }
            Commands::Config(args) => {
                log::debug!("Executing 'config' command...");
                commands::config::handle_config_command(&args, quiet)?;
            }
        },
    }
    Ok(())
}

// Applies export command-line overrides on top of the loaded config.
fn merge_config_with_cli_overrides(mut config: Config, args: &ExportArgs) -> Config {
    log::trace!("Applying export command CLI overrides to config...");

    if let Some(name) = &args.project_config.project_name {
        config.general.project_name = Some(name.clone());
    }
    if let Some(output) = &args.output {
        config.export.output = output.clone();
    }
    if !args.profiles.is_empty() {
        for profile in &args.profiles {
            if !config.general.profiles.contains(profile) {
                config.general.profiles.push(profile.clone());
            }
        }
    }
    if let Some(timeout) = &args.timeout {
        config.export.timeout = timeout.clone();
    }
    if let Some(max_file_size) = &args.max_file_size {
        config.export.max_file_size = max_file_size.clone();
    }

    log::trace!("Config after CLI overrides: {:?}", config);
    config
}

// Helper to load config considering CLI options. Used by multiple commands.
pub fn load_config_for_command(
    project_root: &std::path::Path,
    project_opts: &ProjectConfigOpts,
    export_args: Option<&ExportArgs>,
) -> Result<Config> {
    use anyhow::Context;

    let config_path = Config::resolve_config_path(
        project_root,
        project_opts.config_file.as_ref(),
        project_opts.disable_config_file,
    )
    .context("Failed to resolve configuration path")?;

    let mut config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(args) = export_args {
        config = merge_config_with_cli_overrides(config, args);
    } else if let Some(name) = &project_opts.project_name {
        config.general.project_name = Some(name.clone());
    }

    // Ensure project name is set (fallback to directory name).
    config.general.project_name = Some(config.get_effective_project_name(project_root));

    Ok(config)
}
