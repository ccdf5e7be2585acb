//! CLI subcommand handlers.

use crate::{ChartAction, Commands, ConfigAction, NormalizationArg, QueryAction};
use anyhow::Context as _;
use irisshap_core::canvas::{self, ChartSpec};
use irisshap_core::config::{self, AppConfig, ConfigOverrides};
use irisshap_core::gateway::{run_dashboard, DashboardServer, GatewayConfig};
use irisshap_core::{ClassLabel, DashboardSnapshot};
use std::path::{Path, PathBuf};

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    pub workspace: PathBuf,
    pub config_file: Option<PathBuf>,
    pub data_file: Option<PathBuf>,
}

impl Context {
    fn load(&self, overrides: ConfigOverrides) -> anyhow::Result<AppConfig> {
        let overrides = ConfigOverrides {
            data_file: self.data_file.clone(),
            ..overrides
        };
        config::load_config(
            Some(&self.workspace),
            self.config_file.as_deref(),
            &overrides,
        )
        .context("Failed to load configuration")
    }

    /// Relative data paths are resolved against the workspace.
    fn data_path(&self, config: &AppConfig) -> PathBuf {
        resolve(&self.workspace, &config.data_file)
    }
}

fn resolve(workspace: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace.join(path)
    }
}

/// Handle a CLI subcommand.
pub async fn handle_command(command: Commands, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Commands::Explain { seed } => handle_explain(seed, ctx),
        Commands::Serve {
            host,
            port,
            normalization,
        } => handle_serve(host, port, normalization, ctx).await,
        Commands::Query {
            normalization,
            action,
        } => handle_query(action, normalization, ctx),
        Commands::Chart {
            normalization,
            action,
        } => handle_chart(action, normalization, ctx),
        Commands::Config { action } => handle_config(action, ctx),
    }
}

fn handle_explain(seed: Option<u64>, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load(ConfigOverrides {
        seed,
        ..Default::default()
    })?;
    let output = ctx.data_path(&config);
    let result = irisshap_ml::run(&config.pipeline, &output)
        .with_context(|| format!("Attribution pipeline failed for {}", output.display()))?;

    println!(
        "Wrote {} records to {} (accuracy {:.3}, expected value {:.4})",
        result.table.len(),
        output.display(),
        result.accuracy,
        result.expected_value
    );
    Ok(())
}

fn load_snapshot(config: &AppConfig, ctx: &Context) -> anyhow::Result<DashboardSnapshot> {
    let path = ctx.data_path(config);
    DashboardSnapshot::load(&path, config.dashboard.normalization)
        .with_context(|| format!("Failed to load attribution table {}", path.display()))
}

async fn handle_serve(
    host: Option<String>,
    port: Option<u16>,
    normalization: Option<NormalizationArg>,
    ctx: &Context,
) -> anyhow::Result<()> {
    let config = ctx.load(ConfigOverrides {
        host,
        port,
        normalization: normalization.map(Into::into),
        ..Default::default()
    })?;
    let snapshot = load_snapshot(&config, ctx)?.into_shared();
    let gateway = GatewayConfig::from(&config.dashboard);
    println!("Dashboard running on http://{}", gateway.addr());

    let dashboard = DashboardServer::new(gateway, snapshot).into_shared();
    run_dashboard(dashboard)
        .await
        .context("Dashboard server failed")
}

fn handle_query(
    action: QueryAction,
    normalization: Option<NormalizationArg>,
    ctx: &Context,
) -> anyhow::Result<()> {
    let config = ctx.load(ConfigOverrides {
        normalization: normalization.map(Into::into),
        ..Default::default()
    })?;
    let snapshot = load_snapshot(&config, ctx)?;

    let json = match action {
        QueryAction::Class { class } => {
            let class = ClassLabel::try_from(class)?;
            serde_json::to_string_pretty(&irisshap_core::class_distribution(&snapshot, class))?
        }
        QueryAction::Record { row } => {
            let cmp = irisshap_core::record_comparison(&snapshot, row)?;
            serde_json::to_string_pretty(&cmp)?
        }
    };
    println!("{json}");
    Ok(())
}

fn build_chart(action: ChartAction, snapshot: &DashboardSnapshot) -> irisshap_core::Result<ChartSpec> {
    let distribution = |class: i64| -> irisshap_core::Result<_> {
        Ok(irisshap_core::class_distribution(snapshot, ClassLabel::try_from(class)?))
    };
    let comparison = |row: i64| irisshap_core::record_comparison(snapshot, row);

    let spec = match action {
        ChartAction::Box { class } => canvas::box_plot(&distribution(class)?),
        ChartAction::Bubble { class } => canvas::bubble_chart(&distribution(class)?),
        ChartAction::Polar { row } => canvas::polar_comparison(&comparison(row)?),
        ChartAction::Gauge { row } => canvas::gauge_comparison(&comparison(row)?),
        ChartAction::Pairwise => canvas::pairwise_matrix(&irisshap_core::pairwise_dimensions(snapshot)),
    };
    Ok(spec)
}

fn handle_chart(
    action: ChartAction,
    normalization: Option<NormalizationArg>,
    ctx: &Context,
) -> anyhow::Result<()> {
    let config = ctx.load(ConfigOverrides {
        normalization: normalization.map(Into::into),
        ..Default::default()
    })?;
    let snapshot = load_snapshot(&config, ctx)?;
    let spec = build_chart(action, &snapshot)?;
    println!("{}", canvas::render_figure_json(&spec)?);
    Ok(())
}

fn handle_config(action: ConfigAction, ctx: &Context) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init { force } => {
            let path = config::init_workspace_config(&ctx.workspace, force)?;
            println!("Created default configuration at: {}", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            let config = ctx.load(ConfigOverrides::default())?;
            println!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
