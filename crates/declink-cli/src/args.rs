use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the declink binary.
#[derive(Parser, Debug)]
#[command(
    name = "declink",
    version,
    about = "Lower a semantic declaration tree into linkable declarations"
)]
pub struct CliArgs {
    /// Semantic tree to lower (JSON).
    pub input: PathBuf,

    /// Lowering options (JSON, camelCase keys).
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Only lower these top-level classes. Repeatable.
    #[arg(long = "class", value_name = "NAME")]
    pub classes: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, ignore_case = true)]
    pub format: OutputFormat,

    /// Worker threads; defaults to one per core.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Leave fake overrides out of class member lists.
    #[arg(long = "no-fake-overrides")]
    pub no_fake_overrides: bool,

    /// Never color diagnostics.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
