//! CLI argument parsing for trellis.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// trellis - compiles template ASTs into the Trellis wire format
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: ./trellis.toml, then the user config dir)
    #[arg(short, long, global = true, env = "TRELLIS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile AST JSON files into serialized templates
    #[command(alias = "c")]
    Precompile(PrecompileArgs),

    /// Print the compiled wire format with names instead of slots
    Debug(DebugArgs),

    /// Print the VM instructions for a template
    Lower(LowerArgs),
}

#[derive(Args, Debug)]
pub struct PrecompileArgs {
    /// Template AST files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Template id (single file only; default: content hash)
    #[arg(long)]
    pub id: Option<String>,

    /// Write `<stem>.json` files here instead of printing
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DebugArgs {
    /// Template AST file
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct LowerArgs {
    /// Template AST file
    pub file: PathBuf,

    /// Print the program as JSON instead of a listing
    #[arg(long)]
    pub json: bool,
}
