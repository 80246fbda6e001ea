use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        help = "Specify the target project directory (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify path of the TOML config file (default: .treescribe/treescribe.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "disable_config_file",
        help_heading = "Project Setup"
    )]
    pub config_file: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config_file",
        help_heading = "Project Setup"
    )]
    pub disable_config_file: bool,

    #[arg(
        long,
        help = "Specify the project name (overrides config/dir name).",
        value_name = "NAME",
        help_heading = "Project Setup"
    )]
    pub project_name: Option<String>,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Export a project tree and consolidated code bundle, or rebuild a structure from a template.",
    long_about = "treescribe walks a project directory through configurable ignore rules and \nexports a tree diagram plus a Markdown bundle embedding file contents. \nThe same diagram format can be parsed back to verify a directory against \na template and create whatever is missing.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  treescribe export --profile python -o bundle.md\n  treescribe verify myapp_template.txt --base-dir ./workspace\n  treescribe create myapp_template.txt --base-dir ./workspace --yes",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "e",
        about = "Export the tree diagram and consolidated report for a project."
    )]
    Export(ExportArgs),

    #[command(
        visible_alias = "v",
        about = "Parse a template and report which expected entries are missing on disk."
    )]
    Verify(VerifyArgs),

    #[command(
        visible_alias = "c",
        about = "Create the folders and files a template expects but the disk lacks."
    )]
    Create(CreateArgs),

    #[command(about = "Show or save the default configuration file structure.")]
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,

    #[arg(
        short = 'o',
        long,
        value_name = "NAME",
        help = "Report filename (sanitized, '.md' enforced) [default: project_bundle.md].",
        help_heading = "Export Options"
    )]
    pub output: Option<String>,

    #[arg(
        short = 'p',
        long = "profile",
        value_name = "NAME",
        help = "Apply a named ignore profile (php, react, spring, python, node). Repeatable.",
        help_heading = "Export Options"
    )]
    pub profiles: Vec<String>,

    #[arg(
        long,
        value_name = "DURATION",
        help = "Wall-clock budget for the run (e.g. '300s', '5m').",
        help_heading = "Export Options"
    )]
    pub timeout: Option<String>,

    #[arg(
        long,
        value_name = "SIZE",
        help = "Largest file content to embed (e.g. '10 MiB').",
        help_heading = "Export Options"
    )]
    pub max_file_size: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    #[arg(
        value_name = "TEMPLATE",
        help = "Template file: a generated tree diagram or hand-authored text."
    )]
    pub template: PathBuf,

    #[arg(
        long,
        value_name = "PATH",
        help = "Directory the expected structure resolves against (default: current dir)."
    )]
    pub base_dir: Option<PathBuf>,

    #[arg(long, help = "Emit the verification result as JSON.")]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    #[arg(
        value_name = "TEMPLATE",
        help = "Template file: a generated tree diagram or hand-authored text."
    )]
    pub template: PathBuf,

    #[arg(
        long,
        value_name = "PATH",
        help = "Directory the expected structure resolves against (default: current dir)."
    )]
    pub base_dir: Option<PathBuf>,

    #[arg(short = 'y', long, help = "Create without the interactive confirmation.")]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        long,
        help = "Save default config structure to .treescribe/treescribe.toml in the project root."
    )]
    pub save: bool,

    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
}
