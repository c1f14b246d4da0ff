// crates/edge/src/cli.rs

use crate::router::{build_app_router, AppState};
use crate::EdgeError;
use chrono::Utc;
use clap::{builder::ValueHint, Args, Parser, Subcommand, ValueEnum};
use domain::item::PoolKind;
use domain::query::FilterQuery;
use domain::setting::Settings;
use domain::taxonomy::{BUCKET, CATEGORY, MATERIAL_TYPE, SERVICE_AREA, VIDEO_CATEGORY};
use serve::aggregate::{Aggregator, PageRequest};
use serve::cache::CachedPool;
use serve::pool::{file_name, ContentPool, JsonPool};
use std::net::SocketAddr;
use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};
use tracing::{error, info, warn};

pub type Result<T> = std::result::Result<T, EdgeError>;

/// Discovery CLI, edge layer
#[tokio::main(flavor = "multi_thread")]
#[tracing::instrument(skip_all)]
pub async fn start() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(cmd) => do_serve(cmd).await,
        Commands::Query(cmd) => do_query(cmd).await,
    };

    result.map_or_else(
        |e| {
            error!("discovery failed: {}", e);
            ExitCode::FAILURE
        },
        |_| ExitCode::SUCCESS,
    )
}

#[tracing::instrument(skip_all)]
async fn do_serve(cmd: ServeCmd) -> Result<()> {
    let then = Utc::now();
    let process = StartProcess::<CommandIssued>::parse_settings_file(cmd.site.dir)?;
    info!(
        "Settings parsed in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    let then = Utc::now();
    let process = process.build_pools();
    info!(
        "Pools built in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    process.start_server().await
}

#[tracing::instrument(skip_all)]
async fn do_query(cmd: QueryCmd) -> Result<()> {
    let process = StartProcess::<CommandIssued>::parse_settings_file(cmd.site.dir.clone())?
        .build_pools();

    let name = cmd.collection.as_str();
    let aggregator = process
        .state
        .app
        .collection(name)
        .ok_or_else(|| EdgeError::UnknownCollection(name.to_owned()))?;

    let page = aggregator.aggregate(&cmd.page_request()).await?;
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "discovery", version, about = "Faceted content discovery server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the discovery API for the site in the specified directory
    Serve(ServeCmd),
    /// Run one aggregation and print the page as JSON
    Query(QueryCmd),
}

#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// Site directory holding settings.toml (or set DISCOVERY_DIR)
    #[arg(
        value_name = "DIR",
        env = "DISCOVERY_DIR",
        required = true,
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ServeCmd {
    #[command(flatten)]
    pub site: SiteArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Videos,
    Posts,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Videos => "videos",
            Collection::Posts => "posts",
        }
    }
}

#[derive(Parser, Debug)]
pub struct QueryCmd {
    #[command(flatten)]
    pub site: SiteArgs,

    #[arg(long, value_enum, default_value = "videos")]
    pub collection: Collection,

    /// Free-text search
    #[arg(long)]
    pub text: Option<String>,

    #[arg(long, value_delimiter = ',')]
    pub bucket: Vec<String>,

    /// Video category slugs
    #[arg(long, value_delimiter = ',')]
    pub topic: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub material: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub area: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    pub category: Vec<String>,

    #[arg(long)]
    pub first: Option<usize>,

    /// Cursor from a previous page's `endCursor`
    #[arg(long)]
    pub after: Option<String>,
}

impl QueryCmd {
    pub fn page_request(&self) -> PageRequest {
        let mut query = FilterQuery::new().with_text(self.text.clone().unwrap_or_default());
        for (taxonomy, slugs) in [
            (BUCKET, &self.bucket),
            (VIDEO_CATEGORY, &self.topic),
            (MATERIAL_TYPE, &self.material),
            (SERVICE_AREA, &self.area),
            (CATEGORY, &self.category),
        ] {
            query.set_selection(taxonomy, slugs);
        }

        PageRequest {
            query,
            first: self.first,
            after: self.after.clone(),
        }
    }
}

fn dir_must_exist(s: &str) -> std::result::Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if !p.exists() {
        return Err(format!("Not found: {}", p.display()));
    }
    if !p.is_dir() {
        return Err(format!("Not a directory: {}", p.display()));
    }
    Ok(p)
}

// ─────────────────────────────────────────────────────────────────────────────
// Start process state machine
// ─────────────────────────────────────────────────────────────────────────────

pub trait ProcessState {}

pub struct CommandIssued;

pub struct SettingsLoaded {
    dir: PathBuf,
    settings: Settings,
}

pub struct PoolsBuilt {
    settings: Settings,
    app: AppState,
}

impl ProcessState for CommandIssued {}
impl ProcessState for SettingsLoaded {}
impl ProcessState for PoolsBuilt {}

pub struct StartProcess<S: ProcessState> {
    state: S,
}

impl StartProcess<CommandIssued> {
    /// Load settings from `<dir>/settings.toml`.
    #[tracing::instrument(skip_all)]
    pub fn parse_settings_file(dir: PathBuf) -> Result<StartProcess<SettingsLoaded>> {
        if !dir.exists() {
            return Err(EdgeError::Config(format!(
                "Settings directory does not exist: {}",
                dir.display()
            )));
        }

        let path = dir.join("settings.toml");
        if !path.exists() {
            return Err(EdgeError::Config(format!(
                "settings.toml not found at {}",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(&path).map_err(|err| {
            EdgeError::Config(format!("Failed reading {}: {}", path.display(), err))
        })?;

        let settings: Settings = toml::from_str(&text).map_err(|err| {
            EdgeError::Config(format!(
                "Invalid settings.toml at {}: {}",
                path.display(),
                err
            ))
        })?;

        Ok(StartProcess {
            state: SettingsLoaded { dir, settings },
        })
    }
}

impl StartProcess<SettingsLoaded> {
    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    /// One revalidating JSON pool per kind, and the two collections over them.
    #[tracing::instrument(skip_all)]
    pub fn build_pools(self) -> StartProcess<PoolsBuilt> {
        let SettingsLoaded { dir, settings } = self.state;
        let pools_dir = dir.join(&settings.pools.dir);
        let ttl = Duration::from_secs(settings.pools.revalidate_secs);

        let pool = |kind: PoolKind| -> Arc<dyn ContentPool> {
            let json = JsonPool::in_dir(kind, &pools_dir);
            if !json.path().exists() {
                warn!(
                    "{} pool file {} is missing; requests touching it will fail",
                    kind,
                    file_name(kind)
                );
            }
            Arc::new(CachedPool::new(json, ttl))
        };

        let videos = Aggregator::videos(
            pool(PoolKind::VideoEntry),
            pool(PoolKind::Project),
            settings.discovery.clone(),
        );
        let posts = Aggregator::posts(pool(PoolKind::Post), settings.discovery.clone());

        StartProcess {
            state: PoolsBuilt {
                settings,
                app: AppState::new(videos, posts),
            },
        }
    }
}

impl StartProcess<PoolsBuilt> {
    pub fn app(&self) -> &AppState {
        &self.state.app
    }

    /// Bind the configured address and serve until Ctrl-C.
    #[tracing::instrument(skip_all)]
    pub async fn start_server(self) -> Result<()> {
        let server = &self.state.settings.server;
        let addr = SocketAddr::new(server.ip, server.port);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Discovery API listening on {}", addr);

        axum::serve(listener, build_app_router(self.state.app))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Discovery API stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
