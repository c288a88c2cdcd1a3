use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "plugin-manifest")]
#[command(about = "Generate client and server plugin import manifests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Application root (defaults to marker-directory discovery from the working directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Plugin directory name to leave out; may be repeated
    #[arg(long = "disable", value_name = "NAME", global = true)]
    disabled: Vec<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover plugins, install their dependencies and write both manifests
    Build {
        /// Print the manifests instead of writing them; implies --skip-install
        #[arg(long)]
        dry_run: bool,

        /// Do not run the package manager for plugins with a dependency manifest
        #[arg(long)]
        skip_install: bool,

        /// Package manager command, e.g. "yarn install --frozen-lockfile"
        #[arg(long, value_name = "CMD")]
        install_command: Option<String>,
    },
    /// List eligible plugins and the artifacts they provide
    List {
        /// Print JSON instead of one line per plugin
        #[arg(long)]
        json: bool,
    },
    /// Show version information
    Version,
}

fn main() -> ExitCode {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stderr keeps --dry-run output on stdout clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let global = cli::GlobalArgs {
        root: cli.root,
        disabled: cli.disabled,
    };

    match cli.command {
        None => cli::cmd_build(global, cli::BuildArgs::default()),
        Some(Commands::Build {
            dry_run,
            skip_install,
            install_command,
        }) => cli::cmd_build(
            global,
            cli::BuildArgs {
                dry_run,
                skip_install,
                install_command,
            },
        ),
        Some(Commands::List { json }) => cli::cmd_list(global, json),
        Some(Commands::Version) => {
            println!("plugin-manifest {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
