use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "keybridge",
    about = "Keybridge: resolve table keys and build key-value stores",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the candidate keys of every table
    Candidates(ManifestArgs),
    /// Check the key mapping and report every issue
    Check(ManifestArgs),
    /// Print the key specifications the mapping resolves to
    Emit(ManifestArgs),
    /// Build the store in memory and report its tables
    Build(BuildArgs),
}

#[derive(Args)]
pub struct ManifestArgs {
    /// Path to a TOML (or .json) manifest
    pub manifest: PathBuf,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Path to a TOML (or .json) manifest
    pub manifest: PathBuf,
    /// Override the store name from the manifest
    #[arg(long)]
    pub name: Option<String>,
    /// Override the store version from the manifest
    #[arg(long)]
    pub store_version: Option<u32>,
}
