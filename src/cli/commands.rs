//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Configuration file looked up in the data directory
pub const CONFIG_FILE: &str = "config.json";
/// Run state file looked up in the output directory
pub const STATE_FILE: &str = "state.json";

/// LinkedIn Pages extractor
#[derive(Parser, Debug)]
#[command(name = "linkedin-pages-extractor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON, or YAML by extension)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding `config.json`; also the default output directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Run state file (defaults to `<output>/state.json`)
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Output directory receiving `tables/`
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Output format of command results
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Data directory, the working directory when not given
    pub fn data_dir(&self) -> &Path {
        self.data_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// Configuration file path
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.data_dir().join(CONFIG_FILE))
    }

    /// Output directory path
    pub fn output_dir(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.data_dir().join("out"))
    }

    /// Run state file path
    pub fn state_path(&self) -> PathBuf {
        self.state
            .clone()
            .unwrap_or_else(|| self.output_dir().join(STATE_FILE))
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Extract the configured endpoint into tables
    Run,

    /// Test the access token against the API
    Check,

    /// List endpoint modes and their tables
    Endpoints,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let cli = Cli::parse_from(["linkedin-pages-extractor", "--data-dir", "/data", "run"]);
        assert_eq!(cli.command, Commands::Run);
        assert_eq!(cli.config_path(), PathBuf::from("/data/config.json"));
        assert_eq!(cli.output_dir(), PathBuf::from("/data/out"));
        assert_eq!(cli.state_path(), PathBuf::from("/data/out/state.json"));
    }

    #[test]
    fn test_explicit_paths() {
        let cli = Cli::parse_from([
            "linkedin-pages-extractor",
            "check",
            "--config",
            "cfg.yaml",
            "--output",
            "/tmp/out",
            "--state",
            "/tmp/state.json",
            "-v",
        ]);
        assert_eq!(cli.command, Commands::Check);
        assert_eq!(cli.config_path(), PathBuf::from("cfg.yaml"));
        assert_eq!(cli.output_dir(), PathBuf::from("/tmp/out"));
        assert_eq!(cli.state_path(), PathBuf::from("/tmp/state.json"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_format_flag() {
        let cli = Cli::parse_from(["linkedin-pages-extractor", "endpoints", "--format", "pretty"]);
        assert_eq!(cli.format, OutputFormat::Pretty);
    }
}
