//! parabatch - batch planner for parallel test runners
//!
//! Packs discovered test suites into batches so that a fixed pool of worker
//! processes can run a large suite with fewer process start-ups.
//!
//! ## Features
//!
//! - First-fit-decreasing packing on test-function counts; a suite is never split
//! - Batch size as a fixed function count (`10`) or a fraction (`/4`)
//! - Batches dispatched through a bootstrap test that reads its class list
//!   from an environment variable
//! - Table, JSON, CSV and raw command output
//!
//! ## Usage
//!
//! ```bash
//! # Plan batches of about 1/8th of all test functions
//! parabatch plan --suites suites.yaml --processes 8 --batch-size /8
//!
//! # Print only the commands for the runner
//! parabatch plan --suites suites.yaml --batch-size 50 --format commands
//!
//! # Inspect the manifest
//! parabatch suites --suites suites.yaml --detailed
//!
//! # Write an example configuration
//! parabatch config init
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

mod batcher;
mod cli;
mod config;
mod models;
mod output;
mod utils;

use cli::Args;
use config::{AppConfig, ConfigFile, EnvConfig};
use models::{ExecutableTest, Suite, SuiteManifest};
use output::{OutputFormat, Plan, PlanFormatter};
use utils::logger::{init_logger, LogLevel};

fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    let verbose = args.verbose || env.verbose.unwrap_or(false);
    init_logger(LogLevel::resolve(args.log_level.as_deref(), verbose));

    match args.command {
        cli::Command::Plan(plan_args) => {
            let config = load_config(args.config.as_deref(), &env)?;
            run_plan(plan_args, config)?;
        }
        cli::Command::Suites(suites_args) => {
            list_suites(suites_args)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, args.config.as_deref(), &env)?;
        }
    }

    Ok(())
}

/// Resolve configuration: config file, then environment
fn load_config(path: Option<&str>, env: &EnvConfig) -> Result<AppConfig> {
    let file = match path.or(env.config_file.as_deref()) {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::load_default()?,
    };

    let mut config = file.app;
    config.apply_env(env);
    Ok(config)
}

fn run_plan(args: cli::PlanArgs, mut config: AppConfig) -> Result<()> {
    if let Some(processes) = args.processes {
        config.processes = processes;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(binary) = args.binary {
        config.binary = binary;
    }
    for raw in &args.options {
        let (key, value) = cli::parse_option(raw);
        config.options.insert(key, value);
    }
    config.validate().context("Invalid configuration")?;

    let format = OutputFormat::from_str(&args.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", args.format))?;

    let batcher = config.batcher()?;
    let manifest = SuiteManifest::load(&args.suites)?;

    info!(
        "Loaded {} suites ({} functions) from {}",
        manifest.suites.len(),
        manifest.total_functions(),
        args.suites
    );

    let units = if args.functional {
        let methods = manifest.suites.iter().flat_map(Suite::methods).collect();
        batcher.batch_methods(methods)
    } else {
        batcher.batch_suites(manifest.suites)
    };

    let plan = Plan::new(&batcher, &units, &config.binary, &config.options);
    debug!(
        "Planned {} units, largest holds {} functions",
        plan.unit_count(),
        plan.max_functions()
    );

    let rendered = PlanFormatter::new(format).format_plan(&plan)?;
    println!("{rendered}");

    if let Some(path) = args.output {
        output::write_plan_to_file(&path, &plan, format)?;
        info!("Plan written to {}", path);
    }

    Ok(())
}

fn list_suites(args: cli::SuitesArgs) -> Result<()> {
    let manifest = SuiteManifest::load(&args.suites)?;

    println!(
        "\nSuites in {} ({} suites, {} functions)\n",
        args.suites,
        manifest.suites.len(),
        manifest.total_functions()
    );
    println!("──────────────────────────────────────────────────────────────────────");

    for suite in &manifest.suites {
        println!(
            "  {:4}  {:40} {}",
            suite.function_count(),
            suite.class_name(),
            suite.path()
        );
        if args.detailed {
            for function in suite.functions() {
                println!("          - {function}");
            }
        }
    }

    println!("──────────────────────────────────────────────────────────────────────\n");
    Ok(())
}

fn manage_config(args: cli::ConfigArgs, path: Option<&str>, env: &EnvConfig) -> Result<()> {
    match args.action {
        cli::ConfigAction::Show => {
            let config = load_config(path, env)?;
            let policy = config.batch_size_policy()?;

            println!("Effective Configuration:");
            println!("  processes:  {}", config.processes);
            println!("  batch_size: {} ({:?})", config.batch_size, policy);
            println!("  binary:     {}", config.binary);
            println!(
                "  bootstrap:  {} {} (${})",
                config.bootstrap.class_name, config.bootstrap.path, config.bootstrap.env_var
            );
            for (key, value) in &config.options {
                match value {
                    Some(value) => println!("  option:     --{key} {value}"),
                    None => println!("  option:     --{key}"),
                }
            }

            if env.has_any() {
                println!();
                env.print_summary();
            }
        }
        cli::ConfigAction::Init { path, force } => {
            if std::path::Path::new(&path).exists() && !force {
                anyhow::bail!("{path} already exists (use --force to overwrite)");
            }
            ConfigFile::example().save(&path)?;
            println!("Wrote example configuration to {path}");
        }
        cli::ConfigAction::Env => {
            config::print_env_help();
        }
    }

    Ok(())
}
