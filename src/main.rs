mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use cloudscan_runner::config::Config;
use cloudscan_runner::executor::which_exists;
use cloudscan_runner::logger::ConsoleLogger;
use cloudscan_runner::orchestrator::ScanOrchestrator;
use cloudscan_runner::report::ResolvedRulepack;
use cloudscan_runner::resolver::RulepackResolver;
use cloudscan_runner::{options::ScanOptions, output};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let logger = ConsoleLogger::stderr();

    match cli.command {
        Commands::Run {
            config: config_path,
            format,
            temp_dir,
        } => {
            let (config, options) = load_job(config_path.as_deref());
            let resolver = make_resolver(&logger, temp_dir.or(config.temp_dir));
            let orchestrator = ScanOrchestrator::new(logger).with_resolver(resolver);

            let report = orchestrator.perform(&options);
            print!("{}", output::format_run(&report, &format));

            std::process::exit(if report.succeeded { 0 } else { 1 });
        }

        Commands::Render {
            config: config_path,
            format,
            temp_dir,
        } => {
            let (config, options) = load_job(config_path.as_deref());
            let resolver = make_resolver(&logger, temp_dir.or(config.temp_dir));
            let orchestrator = ScanOrchestrator::new(logger).with_resolver(resolver);

            let rendered = orchestrator.render(&options);
            print!("{}", output::format_render(&rendered, &format));
        }

        Commands::Resolve {
            references,
            format,
            temp_dir,
        } => {
            let resolver = make_resolver(&logger, temp_dir);
            let resolved: Vec<ResolvedRulepack> = references
                .into_iter()
                .map(|reference| ResolvedRulepack {
                    path: resolver.resolve(&reference),
                    reference,
                })
                .collect();

            print!("{}", output::format_resolved(&resolved, &format));

            let all_resolved = resolved.iter().all(|r| r.path.is_some());
            std::process::exit(if all_resolved { 0 } else { 1 });
        }

        Commands::CheckTools {
            config: config_path,
        } => {
            let config = Config::load(config_path.as_deref()).unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                std::process::exit(2);
            });
            let command = config.command();

            println!("{}", "Tool Availability".bold().underline());
            println!();

            let available = which_exists(command);
            let status = if available {
                "READY".green().bold().to_string()
            } else {
                "NOT AVAILABLE".red().to_string()
            };
            println!("  [{status}] {command}");
            println!();

            std::process::exit(if available { 0 } else { 1 });
        }
    }
}

/// Loads the job config and converts it to scan options, exiting with
/// status 2 on any configuration error.
fn load_job(path: Option<&Path>) -> (Config, ScanOptions) {
    let config = Config::load(path).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(2);
    });
    let options = config.to_scan_options().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(2);
    });
    (config, options)
}

fn make_resolver(logger: &ConsoleLogger, temp_dir: Option<PathBuf>) -> RulepackResolver {
    let resolver = RulepackResolver::new(logger.clone());
    match temp_dir {
        Some(dir) => resolver.with_temp_dir(dir),
        None => resolver,
    }
}
