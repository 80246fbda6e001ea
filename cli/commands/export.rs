use crate::cli_args::ExportArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use colored::Colorize;
use log;
use std::path::{Path, PathBuf};
use treescribe_core::{self as core, AnalysisRun, Config, IgnoreRules};

pub fn handle_export_command(args: ExportArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(&project_root, &args.project_config, Some(&args))
        .context("Failed to load configuration")?;

    let output_name = core::sanitize_output_filename(&config.export.output);
    let max_file_size = config.get_max_file_size()?;
    let timeout = config.get_timeout()?;
    let project_name = config.get_effective_project_name(&project_root);

    let mut rules = IgnoreRules::base();
    rules.apply_profiles(&config.general.profiles);
    log::debug!(
        "Ignore rules ready (profiles: {:?})",
        config.general.profiles
    );

    let mut run = AnalysisRun::new(timeout);

    log::info!("Rendering tree diagram...");
    let tree_text = core::render_tree(&project_root, &rules, &mut run);

    // The standalone template file is the canonical parser input; a failure
    // here is reported but does not stop the report.
    let report_path = PathBuf::from(&output_name);
    let template_path = template_path_for(&report_path, &project_name);
    match output::write_to_file(&template_path, &tree_text) {
        Ok(()) => {
            if !quiet {
                println!(
                    "{} Template saved to: {}",
                    "✅".green(),
                    template_path.display().to_string().blue()
                );
            }
        }
        Err(e) => run.log_error(format!(
            "Failed to save template {}: {:#}",
            template_path.display(),
            e
        )),
    }

    let report_result = core::generate_report(
        &project_root,
        &project_name,
        &tree_text,
        &rules,
        max_file_size,
        &report_path,
        &mut run,
    );

    if !quiet {
        print_summary(&run, &report_path, report_result.is_ok());
    }

    report_result.with_context(|| {
        format!("Failed to write the report to {}", report_path.display())
    })?;
    Ok(())
}

// The template lands next to the report, named after the project.
fn template_path_for(report_path: &Path, project_name: &str) -> PathBuf {
    let file_name = format!("{}_template.txt", project_name);
    match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(file_name),
        _ => PathBuf::from(file_name),
    }
}

fn print_summary(run: &AnalysisRun, report_path: &Path, success: bool) {
    println!();
    if success {
        println!("{}", " Export complete ".green().bold().underline());
        println!(
            "{:<20} {}",
            "Report:".green(),
            report_path.display().to_string().blue()
        );
    } else {
        println!("{}", " Export failed ".red().bold().underline());
    }
    println!(
        "{:<20} {}",
        "Files processed:".green(),
        run.files_processed.to_string().cyan()
    );
    println!(
        "{:<20} {}",
        "Files skipped:".green(),
        run.files_skipped.to_string().cyan()
    );
    if !run.errors().is_empty() {
        println!(
            "{:<20} {}",
            "Errors:".red(),
            run.errors().len().to_string().red()
        );
    }
    if !run.warnings().is_empty() {
        println!(
            "{:<20} {}",
            "Warnings:".yellow(),
            run.warnings().len().to_string().yellow()
        );
    }
    println!(
        "{:<20} {:.2}s",
        "Elapsed:".green(),
        run.elapsed().as_secs_f64()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_sits_next_to_the_report() {
        assert_eq!(
            template_path_for(Path::new("out/bundle.md"), "myapp"),
            PathBuf::from("out/myapp_template.txt")
        );
        assert_eq!(
            template_path_for(Path::new("bundle.md"), "myapp"),
            PathBuf::from("myapp_template.txt")
        );
    }
}
