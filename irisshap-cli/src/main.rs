mod commands;

use clap::Parser;
use irisshap_core::normalize::NormalizationMode;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Shapley-value attributions for an Iris versicolor classifier, and a
/// dashboard to browse them.
#[derive(Parser, Debug)]
#[command(name = "irisshap", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (looked up for `.irisshap/config.toml`)
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Explicit configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Attribution table to write or read (overrides `data_file`)
    #[arg(short, long, global = true)]
    data_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Train the classifier, compute attributions and write the table
    Explain {
        /// Seed of the train/test shuffle
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Serve the dashboard over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
        #[arg(short, long, value_enum)]
        normalization: Option<NormalizationArg>,
    },
    /// Run a dashboard query and print the result as JSON
    Query {
        #[arg(short, long, value_enum)]
        normalization: Option<NormalizationArg>,
        #[command(subcommand)]
        action: QueryAction,
    },
    /// Build a dashboard chart and print it as Plotly figure JSON
    Chart {
        #[arg(short, long, value_enum)]
        normalization: Option<NormalizationArg>,
        #[command(subcommand)]
        action: ChartAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum QueryAction {
    /// Every attribution of one class (0 = not versicolor, 1 = versicolor)
    Class {
        #[arg(allow_negative_numbers = true)]
        class: i64,
    },
    /// One record against the average of its class
    Record {
        #[arg(allow_negative_numbers = true)]
        row: i64,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ChartAction {
    /// Raw attributions of one class as box plots
    Box {
        #[arg(allow_negative_numbers = true)]
        class: i64,
    },
    /// Raw attribution against shift for one class
    Bubble {
        #[arg(allow_negative_numbers = true)]
        class: i64,
    },
    /// Normalized record against its class average
    Polar {
        #[arg(allow_negative_numbers = true)]
        row: i64,
    },
    /// Raw record against its class average as gauges
    Gauge {
        #[arg(allow_negative_numbers = true)]
        row: i64,
    },
    /// Scatter-plot matrix of every record
    Pairwise,
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration to the workspace
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum NormalizationArg {
    Shared,
    PerColumn,
}

impl From<NormalizationArg> for NormalizationMode {
    fn from(arg: NormalizationArg) -> Self {
        match arg {
            NormalizationArg::Shared => NormalizationMode::Shared,
            NormalizationArg::PerColumn => NormalizationMode::PerColumn,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)));

    let log_dir = directories::ProjectDirs::from("dev", "irisshap", "irisshap")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "irisshap.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let ctx = commands::Context {
        workspace,
        config_file: cli.config,
        data_file: cli.data_file,
    };
    commands::handle_command(cli.command, &ctx).await
}
