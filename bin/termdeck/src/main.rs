//! Termdeck - command-line front end
//!
//! Resolves the workspace, wires the library's orchestrator to a tmux host and
//! a console UI, and dispatches one trigger per invocation.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use termdeck::config::{discover_root, ConfigLoader, ConfigProvider, FileConfigProvider};
use termdeck::host::{ConsoleUi, DryRunHost, TerminalHost, TmuxHost};
use termdeck::models::{TerminalDefinition, Trigger};
use termdeck::substitution::{ContextResolver, SubstitutionContext};
use termdeck::{Orchestrator, PersistentRegistry, RunReport, TerminalRunner};

/// Run the terminals declared for a workspace
#[derive(Parser, Debug)]
#[command(name = "termdeck")]
#[command(about = "Configuration-driven terminal launcher", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Workspace root (default: nearest directory with a configuration or .git)
    #[arg(long, global = true, value_name = "PATH")]
    root: Option<PathBuf>,

    /// Configuration path relative to the workspace root
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// tmux session new terminals are opened in (default: current session)
    #[arg(long, global = true, value_name = "SESSION")]
    tmux_session: Option<String>,

    /// File recording persistent terminals between invocations
    #[arg(long, global = true, value_name = "PATH")]
    registry: Option<PathBuf>,

    /// Active file, for [file] and related tokens
    #[arg(long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Cursor line, for the [lineNumber] token
    #[arg(long, global = true, value_name = "LINE")]
    line: Option<u32>,

    /// Print what would happen instead of driving tmux
    #[arg(long, global = true)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every terminal not marked onlySingle/onlyAPI
    RunAll,
    /// Pick one terminal interactively and run it
    Pick,
    /// Run the terminal with the given name
    Run {
        /// Terminal name
        name: String,
    },
    /// Run a group of terminals as split panes
    Group {
        /// Group name (picked interactively when omitted)
        name: Option<String>,
    },
    /// Write the default configuration if none exists
    Init,
    /// Open the configuration in $EDITOR, creating it first if needed
    Edit,
    /// Kill terminals with a sweep of kill requests
    Kill,
    /// Run all terminals if the configuration enables autorun
    Autorun,
    /// List configured terminals without running anything
    List,
}

fn init_logging(debug: bool) {
    let debug = debug
        || env::var("TERMDECK_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
    let level = if debug { "debug" } else { "warn" };

    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn config_loader(args: &Args) -> ConfigLoader {
    let relative = args
        .config
        .clone()
        .or_else(|| env::var("TERMDECK_CONFIG").ok().map(PathBuf::from));

    match relative {
        Some(path) => ConfigLoader::new().with_relative_path(path),
        None => ConfigLoader::new(),
    }
}

fn resolve_root(args: &Args, loader: &ConfigLoader, cwd: &Path) -> Option<PathBuf> {
    match &args.root {
        Some(root) if root.is_absolute() => Some(root.clone()),
        Some(root) => Some(cwd.join(root)),
        None => discover_root(cwd, loader.relative_path()),
    }
}

fn registry(args: &Args) -> anyhow::Result<PersistentRegistry> {
    if args.dry_run {
        return Ok(PersistentRegistry::new());
    }

    let path = args
        .registry
        .clone()
        .or_else(|| dirs::data_dir().map(|dir| dir.join("termdeck").join("persistent.json")));

    match path {
        Some(path) => PersistentRegistry::with_store(&path)
            .with_context(|| format!("failed to open registry {}", path.display())),
        None => {
            warn!("No data directory, persistent terminals last for this run only");
            Ok(PersistentRegistry::new())
        }
    }
}

fn host(args: &Args) -> Arc<dyn TerminalHost> {
    if args.dry_run {
        return Arc::new(DryRunHost::new());
    }

    let host = match &args.tmux_session {
        Some(session) => TmuxHost::new().with_session(session),
        None => TmuxHost::new(),
    };
    Arc::new(host)
}

fn describe(terminal: &TerminalDefinition) -> String {
    let mut tags = Vec::new();
    if let Some(group) = &terminal.group {
        tags.push(format!("group={}", group));
    }
    if let Some(key) = &terminal.persistent {
        tags.push(format!("persistent={}", key));
    }
    if !terminal.is_eligible(Trigger::Batch) {
        tags.push("not in run-all".to_string());
    }
    if !terminal.is_eligible(Trigger::SinglePick) {
        tags.push("not in pick".to_string());
    }

    let mut line = terminal.name.clone();
    if !tags.is_empty() {
        line.push_str(&format!(" [{}]", tags.join(", ")));
    }
    if let Some(description) = &terminal.description {
        line.push_str(&format!(" - {}", description));
    }
    line
}

fn print_report(report: &RunReport) {
    for handle in &report.handles {
        let marker = if report.shown.as_ref() == Some(&handle.id) {
            "*"
        } else {
            " "
        };
        let reused = if handle.reused { " (reused)" } else { "" };
        println!("{} {} {}{}", marker, handle.id, handle.name, reused);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    info!("Starting termdeck v{}", termdeck::VERSION);

    let cwd = env::current_dir().context("failed to read the current directory")?;
    let loader = config_loader(&args);
    let root = resolve_root(&args, &loader, &cwd);
    debug!("Workspace root: {:?}", root);

    let provider = Arc::new(FileConfigProvider::new(loader));

    let resolver = ContextResolver::new(SubstitutionContext {
        file: args.file.clone(),
        line_number: args.line,
        cwd: Some(cwd.clone()),
    });
    let runner = TerminalRunner::new(host(&args), Arc::new(registry(&args)?));
    let orchestrator = Orchestrator::new(
        provider.clone(),
        Arc::new(resolver),
        runner,
        Arc::new(ConsoleUi::new()),
        root,
    );

    match &args.command {
        Commands::RunAll => print_report(&orchestrator.run_all(None).await),
        Commands::Pick => print_report(&orchestrator.run_single().await),
        Commands::Run { name } => print_report(&orchestrator.run_by_name(name).await),
        Commands::Group { name } => print_report(&orchestrator.run_group(name.as_deref()).await),
        Commands::Autorun => print_report(&orchestrator.autorun().await),
        Commands::Init => {
            if let Some(path) = orchestrator.init_config().await {
                println!("{}", path.display());
            }
        }
        Commands::Edit => {
            orchestrator.edit_config().await;
        }
        Commands::Kill => {
            let killed = orchestrator.kill_all().await;
            debug!("Killed {} terminals", killed);
        }
        Commands::List => {
            let config = provider.load(orchestrator.root())?;
            if config.terminals.is_empty() {
                println!("No terminals defined in {}", config.config_path.display());
            }
            for terminal in &config.terminals {
                println!("{}", describe(terminal));
            }
        }
    }

    Ok(())
}
