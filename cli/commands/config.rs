use crate::cli_args::ConfigArgs;
use crate::output;
use anyhow::{Context, Result};
use colored::Colorize;
use log;
use treescribe_core::{Config, config};

pub fn handle_config_command(args: &ConfigArgs, quiet: bool) -> Result<()> {
    let default_toml = Config::default_toml().context("Failed to render default configuration")?;

    if args.save {
        let project_root =
            Config::determine_project_root(args.project_config.project_root.as_ref())
                .context("Failed to determine project root for config save")?;
        let target = project_root
            .join(config::DEFAULT_CONFIG_DIR)
            .join(config::DEFAULT_CONFIG_FILENAME);
        if target.exists() && !output::confirm(&format!("Overwrite {}?", target.display()))? {
            println!("Aborted, config not written.");
            return Ok(());
        }
        output::write_to_file(&target, &default_toml)?;
        if !quiet {
            println!(
                "{} Default config saved to: {}",
                "✅".green(),
                target.display().to_string().blue()
            );
        }
        log::info!("Default config written to {}", target.display());
    } else {
        print!("{}", default_toml);
    }
    Ok(())
}
