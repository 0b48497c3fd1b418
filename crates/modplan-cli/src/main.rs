use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modplan_config::ConfigLoader;
use std::path::PathBuf;

mod commands;
mod config;
mod logging;
mod render;

/// Module dependency resolver and build planner.
///
/// Reads module descriptors (TOML or JSON), validates the dependency graph,
/// propagates public/private visibility, and prints a deterministic build
/// order together with the modules that are loaded at runtime.
///
/// EXAMPLES:
///     modplan plan modules/             Print the build plan
///     modplan check                     Validate configured descriptors
///     modplan groups --json             Parallel build groups as JSON
///     modplan show Game modules/        Effective visibility of Game
///     modplan manifest modules/         Runtime-loaded modules
///
/// ENVIRONMENT VARIABLES:
///     MODPLAN_PARALLEL  Override resolver.parallel (true/false)
///     MODPLAN_FORMAT    Override output.format (text/json)
///     MODPLAN_LOG       Override output.log_level
///     RUST_LOG          Log filter, takes precedence over everything
///     MODPLAN_NO_COLOR  Set to disable colored output
///     NO_COLOR          Set to disable colored output
#[derive(Parser)]
#[command(name = "modplan")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Propagate visibility sequentially instead of in parallel waves
    #[arg(long, global = true)]
    sequential: bool,

    /// Root module for conflict analysis (repeatable)
    #[arg(long = "root", value_name = "NAME", global = true)]
    roots: Vec<String>,

    /// Verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Use this config file instead of searching for modplan.toml
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the build order, runtime manifest, and visibility conflicts
    ///
    /// EXAMPLES:
    ///     modplan plan modules/ engine.toml
    ///     modplan plan --json
    #[command(visible_alias = "p")]
    Plan {
        /// Descriptor files or directories (default: descriptors.paths)
        paths: Vec<PathBuf>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Validate descriptors without emitting a plan
    #[command(visible_alias = "c")]
    Check {
        /// Descriptor files or directories (default: descriptors.paths)
        paths: Vec<PathBuf>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print groups of modules that can be built concurrently
    Groups {
        /// Descriptor files or directories (default: descriptors.paths)
        paths: Vec<PathBuf>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show the effective include paths and link targets of a module
    Show {
        /// Module name
        module: String,
        /// Descriptor files or directories (default: descriptors.paths)
        paths: Vec<PathBuf>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List the modules loaded at runtime, one per line
    Manifest {
        /// Descriptor files or directories (default: descriptors.paths)
        paths: Vec<PathBuf>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cli_config = config::Config::from_env();

    if cli_config.no_color {
        colored::control::set_override(false);
    }

    let loader = ConfigLoader::new();
    let project_config = match &cli.config {
        Some(path) => loader.load_from_file(path),
        None => loader.load_from_directory(&std::env::current_dir()?),
    }
    .context("Failed to load project configuration")?;

    // -v overrides the configured level; RUST_LOG still wins
    let filter = if cli.verbose {
        "debug"
    } else {
        project_config.log_level()
    };
    logging::init_logging(filter, !cli_config.no_color);

    let resolve_args = |paths: Vec<PathBuf>, json: bool| commands::ResolveArgs {
        paths,
        sequential: cli.sequential,
        roots: cli.roots.clone(),
        json,
    };

    match cli.command {
        Commands::Plan { paths, json } => {
            commands::plan::run(&resolve_args(paths, json), &project_config)?;
        }
        Commands::Check { paths, json } => {
            commands::check::run(&resolve_args(paths, json), &project_config)?;
        }
        Commands::Groups { paths, json } => {
            commands::groups::run(&resolve_args(paths, json), &project_config)?;
        }
        Commands::Show {
            module,
            paths,
            json,
        } => {
            commands::show::run(&module, &resolve_args(paths, json), &project_config)?;
        }
        Commands::Manifest { paths, json } => {
            commands::manifest::run(&resolve_args(paths, json), &project_config)?;
        }
    }

    Ok(())
}
