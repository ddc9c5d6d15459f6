mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use ec_core::{CompileOptions, VersionPolicyKind};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ProjectConfig;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// How version-less references pick among declared versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    LatestDeclared,
    HighestVersion,
}

impl From<PolicyArg> for VersionPolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::LatestDeclared => VersionPolicyKind::LatestDeclared,
            PolicyArg::HighestVersion => VersionPolicyKind::HighestVersion,
        }
    }
}

/// Event catalog DSL toolchain.
#[derive(Parser)]
#[command(name = "ec", version, about = "Event catalog DSL toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log pass-level detail to stderr (overridden by RUST_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    /// Project file; defaults to ./ec.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured version policy
    #[arg(long, global = true, value_enum)]
    version_policy: Option<PolicyArg>,

    /// Override the configured per-document syntax error cap
    #[arg(long, global = true)]
    max_errors: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a set of files or directories and report diagnostics
    Check {
        /// Files or directories; defaults to the project's sources, then `.`
        paths: Vec<PathBuf>,
    },

    /// Print the linked AST of one file as JSON
    Parse {
        /// Path to the .ec source file
        file: PathBuf,
    },

    /// Print the canonical rendering of one file
    Print {
        /// Path to the .ec source file
        file: PathBuf,
    },

    /// Re-indent one file
    Fmt {
        /// Path to the .ec source file
        file: PathBuf,
        /// Exit 1 instead of printing when the file is not formatted
        #[arg(long)]
        check: bool,
    },

    /// List every indexed symbol
    Symbols {
        /// Files or directories; defaults to the project's sources, then `.`
        paths: Vec<PathBuf>,
    },

    /// Print flow graphs: entry sources and targets, triggers, actions
    Flows {
        /// Files or directories; defaults to the project's sources, then `.`
        paths: Vec<PathBuf>,
    },
}

/// Settings shared by every subcommand once the project file and flags
/// are merged.
pub(crate) struct Context {
    pub output: OutputFormat,
    pub quiet: bool,
    pub options: CompileOptions,
    pub sources: Vec<PathBuf>,
}

impl Context {
    /// Paths named on the command line win over the project's `sources`.
    pub(crate) fn unit_paths(&self, paths: Vec<PathBuf>) -> Vec<PathBuf> {
        if !paths.is_empty() {
            paths
        } else if !self.sources.is_empty() {
            self.sources.clone()
        } else {
            vec![PathBuf::from(".")]
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let project = match ProjectConfig::load(cli.config.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            report_error(&e.to_string(), cli.output, cli.quiet);
            process::exit(1);
        }
    };
    let mut options = project.compile;
    if let Some(policy) = cli.version_policy {
        options.version_policy = policy.into();
    }
    if let Some(max) = cli.max_errors {
        options.max_errors = max;
    }
    tracing::debug!(?options, sources = project.sources.len(), "configuration loaded");

    let ctx = Context {
        output: cli.output,
        quiet: cli.quiet,
        options,
        sources: project.sources,
    };

    match cli.command {
        Commands::Check { paths } => commands::check::cmd_check(paths, &ctx),
        Commands::Parse { file } => commands::parse::cmd_parse(&file, &ctx),
        Commands::Print { file } => commands::print::cmd_print(&file, &ctx),
        Commands::Fmt { file, check } => commands::fmt::cmd_fmt(&file, check, &ctx),
        Commands::Symbols { paths } => commands::symbols::cmd_symbols(paths, &ctx),
        Commands::Flows { paths } => commands::flows::cmd_flows(paths, &ctx),
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
