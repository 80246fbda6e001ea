use crate::cli_args::CreateArgs;
use crate::commands::verify::run_verification;
use crate::output;
use anyhow::Result;
use colored::Colorize;
use log;
use treescribe_core as core;

pub fn handle_create_command(args: CreateArgs, quiet: bool) -> Result<()> {
    let (base_dir, structure, missing) =
        run_verification(&args.template, args.base_dir.as_deref())?;

    output::print_verify_results(&base_dir, &structure, &missing, quiet);
    if missing.is_empty() {
        return Ok(());
    }

    // Mutating from here on; explicit confirmation is required.
    if !args.yes {
        let prompt = format!(
            "Create {} missing items under {}?",
            missing.total(),
            base_dir.display()
        );
        if !output::confirm(&prompt)? {
            println!("Aborted, nothing created.");
            return Ok(());
        }
    }

    log::info!("Materializing {} missing items...", missing.total());
    let outcome = core::materialize(&base_dir, &missing);

    if !quiet {
        for folder in &outcome.created_folders {
            println!("{} (folder) {}", "[CREATED]".green(), folder);
        }
        for file in &outcome.created_files {
            println!("{} (file)   {}", "[CREATED]".green(), file);
        }
        for failure in &outcome.failures {
            println!("{} {}", "[ERROR]".red(), failure);
        }
    }
    println!(
        "{} {} items created, {} failures.",
        "✨".green(),
        outcome.created().to_string().cyan(),
        outcome.failures.len()
    );

    // Re-check so the user sees current disk truth; with no failures this
    // comes back clean.
    let after = core::verify(&base_dir, &structure);
    if after.is_empty() {
        println!("{} Structure complete after creation.", "✅".green());
    } else {
        println!(
            "{} {} items still missing after creation.",
            "⚠️".yellow(),
            after.total().to_string().yellow()
        );
    }
    Ok(())
}
