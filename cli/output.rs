use anyhow::{Context, Result};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::path::Path;
use treescribe_core::{ExpectedStructure, MissingItems};

pub fn write_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to file {}", path.display()))?;
    Ok(())
}

/// Interactive y/N confirmation on stdin. Anything but `y`/`yes` declines.
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Per-item `[OK]`/`[MISSING]` listing plus a summary table, the CLI
/// rendition of the verification log pane.
pub fn print_verify_results(
    base_dir: &Path,
    structure: &ExpectedStructure,
    missing: &MissingItems,
    quiet: bool,
) {
    if !quiet {
        println!("--- BASE: {} ---", base_dir.display().to_string().blue());
        for folder in &structure.folders {
            if missing.folders.contains(folder) {
                println!("{} (folder) {}", "[MISSING]".red(), folder);
            } else {
                println!("{} (folder) {}", "[OK]".green(), folder);
            }
        }
        for file in &structure.files {
            if missing.files.contains(file) {
                println!("{} (file)   {}", "[MISSING]".red(), file);
            } else {
                println!("{} (file)   {}", "[OK]".green(), file);
            }
        }
        println!();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Kind").fg(Color::Green),
        Cell::new("Expected").fg(Color::Green),
        Cell::new("Missing").fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Folders"),
        Cell::new(structure.folders.len()),
        Cell::new(missing.folders.len()),
    ]);
    table.add_row(vec![
        Cell::new("Files"),
        Cell::new(structure.files.len()),
        Cell::new(missing.files.len()),
    ]);
    println!("{table}");

    if missing.is_empty() {
        println!("{} Structure complete, nothing missing.", "✅".green());
    } else {
        println!(
            "{} {} items missing.",
            "⚠️".yellow(),
            missing.total().to_string().yellow()
        );
    }
}
