//! Workbench Web — HTTP host for the browser workbench.
//!
//! Serves the workbench page in one of three bundle modes, mounts extension
//! folders as static assets, relays one-shot redirect callbacks back to the
//! page and optionally exposes a local folder through the filesystem
//! provider extension.
//!
//! Usage:
//!   workbench-web                                         # Sources via yarn web on :8080
//!   workbench-web --build static --build-location ./out   # Prebuilt bundle
//!   workbench-web --build cdn --cdn-url https://...       # Bundle on a CDN
//!   workbench-web --extension-development-path ./my-ext   # Develop an extension
//!   workbench-web --folder-path ./project                 # Open a local folder

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;
use workbench_protocol::{AutoOpenFolder, BuildConfig, DeploymentConfig, DevCompanionConfig};
use workbench_server::{AppState, build_app};
use workbench_services::{CallbackRelay, Downloader, FsExtensionScanner};
use workbench_transport::{TransportConfig, TransportServer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BuildKind {
    /// Sources served by the local development companion
    Sources,
    /// Prebuilt bundle on disk
    Static,
    /// Bundle hosted on a CDN
    Cdn,
}

#[derive(Parser, Debug)]
#[command(name = "workbench-web", about = "Workbench Web — browser workbench host")]
struct Cli {
    /// Hostname to bind to
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port to listen on (0 for OS-assigned)
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Where the workbench bundle comes from
    #[arg(long, value_enum, default_value = "sources")]
    build: BuildKind,

    /// Prebuilt bundle directory (with --build static)
    #[arg(long, required_if_eq("build", "static"))]
    build_location: Option<PathBuf>,

    /// Base URL of the bundle (with --build cdn)
    #[arg(long, required_if_eq("build", "cdn"))]
    cdn_url: Option<String>,

    /// Folder of additional builtin extensions (repeatable)
    #[arg(long = "extension-path")]
    extension_paths: Vec<PathBuf>,

    /// Extension under development
    #[arg(long)]
    extension_development_path: Option<PathBuf>,

    /// Test runner module inside the extension under development
    #[arg(long, requires = "extension_development_path")]
    extension_tests_path: Option<PathBuf>,

    /// Folder URI to open on load
    #[arg(long, conflicts_with = "folder_path")]
    folder_uri: Option<String>,

    /// Local folder to serve through the filesystem provider and open on load
    #[arg(long)]
    folder_path: Option<PathBuf>,

    /// Root of the UI static assets
    #[arg(long, default_value = "static")]
    static_root: PathBuf,

    /// Workbench HTML template
    #[arg(long, default_value = "views/workbench.html")]
    template: PathBuf,

    /// Filesystem provider extension served with --folder-path
    #[arg(long, default_value = "fs-provider")]
    fs_provider_path: PathBuf,

    /// Base URL of the local development companion
    #[arg(long, default_value = "http://localhost:8080")]
    dev_companion_url: String,

    /// Timeout for requests to the development companion and CDN
    #[arg(long, default_value = "5000")]
    dev_timeout_ms: u64,

    /// Do not log every HTTP request
    #[arg(long)]
    hide_server_log: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    /// Write logs to a file (defaults to ~/.workbench-web/logs/host.log if no path given)
    #[arg(long, default_missing_value = "DEFAULT", num_args = 0..=1)]
    log_file: Option<String>,
}

impl Cli {
    fn deployment_config(&self) -> Result<DeploymentConfig> {
        let build = match self.build {
            BuildKind::Sources => BuildConfig::Sources,
            BuildKind::Static => BuildConfig::Static {
                location: self
                    .build_location
                    .clone()
                    .context("--build static needs --build-location")?,
            },
            BuildKind::Cdn => BuildConfig::Cdn {
                uri: self
                    .cdn_url
                    .clone()
                    .context("--build cdn needs --cdn-url")?,
            },
        };

        let folder = match (&self.folder_uri, &self.folder_path) {
            (Some(uri), _) => Some(AutoOpenFolder::Uri(uri.clone())),
            (None, Some(path)) => Some(AutoOpenFolder::Mount(absolute(path))),
            (None, None) => None,
        };

        let config = DeploymentConfig {
            build,
            extension_paths: self.extension_paths.iter().map(|p| absolute(p)).collect(),
            extension_development_path: self.extension_development_path.as_deref().map(absolute),
            extension_tests_path: self.extension_tests_path.as_deref().map(absolute),
            folder,
            static_root: self.static_root.clone(),
            template_path: self.template.clone(),
            fs_provider_extension_path: self.fs_provider_path.clone(),
            dev_companion: DevCompanionConfig {
                url: self.dev_companion_url.trim_end_matches('/').to_string(),
                timeout: Duration::from_millis(self.dev_timeout_ms),
            },
        };
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

/// Canonical form when the path exists, so tests paths compare against
/// development paths reliably.
fn absolute(path: &std::path::Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });

    let Some(log_file_arg) = &cli.log_file else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(());
    };

    let log_path = if log_file_arg == "DEFAULT" {
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(".workbench-web/logs/host.log")
    } else {
        PathBuf::from(log_file_arg)
    };
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    eprintln!("Logging to {}", log_path.display());
    Ok(())
}

fn print_banner(config: &DeploymentConfig, url: &str) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                        Workbench Web                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    match &config.build {
        BuildConfig::Sources => {
            println!("  Build:      sources ({})", config.dev_companion.url)
        }
        BuildConfig::Static { location } => {
            println!("  Build:      static ({})", location.display())
        }
        BuildConfig::Cdn { uri } => println!("  Build:      cdn ({uri})"),
    }
    for (index, path) in config.extension_paths.iter().enumerate() {
        println!("  Extensions: [{index}] {}", path.display());
    }
    if let Some(path) = &config.extension_development_path {
        println!("  Developing: {}", path.display());
    }
    match &config.folder {
        Some(AutoOpenFolder::Uri(uri)) => println!("  Folder:     {uri}"),
        Some(AutoOpenFolder::Mount(path)) => println!("  Folder:     {} (mounted)", path.display()),
        None => {}
    }
    println!();
    println!("  Listening on {url}");
    println!();
    println!("  Press Ctrl+C to stop.");
    println!();
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.deployment_config()?;

    let downloader = Downloader::new(config.dev_companion.timeout)
        .context("failed to create HTTP client")?;
    let state = Arc::new(AppState {
        config: Arc::new(config.clone()),
        relay: Arc::new(CallbackRelay::new()),
        source: FsExtensionScanner,
        downloader,
    });

    let transport_config = TransportConfig {
        port: cli.port,
        hostname: cli.host.clone(),
        log_requests: !cli.hide_server_log,
    };
    let mut transport = TransportServer::start(transport_config, build_app(state))
        .await
        .context("failed to start server")?;

    print_banner(&config, &format!("http://{}:{}", cli.host, transport.port()));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    println!();
    println!("  Shutting down...");
    transport.stop().await;
    println!("  Server stopped.");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    run(cli).await.inspect_err(|e| error!("{e:#}"))
}
