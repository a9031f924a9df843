use clap::{Parser, Subcommand};
use cloudscan_runner::output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cloudscan-runner",
    version,
    about = "Resolve rulepacks and run cloudscan as a build step"
)]
pub struct Cli {
    /// Enable debug diagnostics on stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve rulepacks and execute the configured scan
    Run {
        /// Job config file (defaults to ./cloudscan.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Summary format
        #[arg(long, short, default_value = "pretty", value_enum)]
        format: OutputFormat,

        /// Download rulepacks under this directory instead of the system temp dir
        #[arg(long)]
        temp_dir: Option<PathBuf>,
    },

    /// Print the scan as a shell command instead of running it
    Render {
        /// Job config file (defaults to ./cloudscan.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, short, default_value = "pretty", value_enum)]
        format: OutputFormat,

        /// Download rulepacks under this directory instead of the system temp dir
        #[arg(long)]
        temp_dir: Option<PathBuf>,
    },

    /// Resolve rulepack references (paths or URLs) to local paths
    Resolve {
        /// Local paths or http(s) URLs
        #[arg(required = true)]
        references: Vec<String>,

        /// Output format
        #[arg(long, short, default_value = "pretty", value_enum)]
        format: OutputFormat,

        /// Download rulepacks under this directory instead of the system temp dir
        #[arg(long)]
        temp_dir: Option<PathBuf>,
    },

    /// Check whether the configured cloudscan executable is available
    CheckTools {
        /// Job config file (defaults to ./cloudscan.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
