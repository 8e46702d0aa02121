//! Manuscript viewer shell.
//!
//! Authenticates against the identity provider, attaches the bearer token to
//! the shared API client, then mounts the application and navigates its
//! route table from the terminal.
//!
//! ```text
//!   config ──▶ logging ──▶ identity handshake ──▶ Authorization default ──▶ mount
//!                                  │                                         │
//!                                  └── failure: log, never mount             ▼
//!                                                                  navigate paths
//!                                                       (args, or stdin until EOF/Ctrl+C)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use folio_viewer::config::load_with_env;
use folio_viewer::http::ApiClient;
use folio_viewer::identity::KeycloakClient;
use folio_viewer::lifecycle::{bootstrap, Application, MountPoint};
use folio_viewer::observability::{logging, metrics};
use folio_viewer::routing::{ResolvedRoute, Router};

#[derive(Parser)]
#[command(name = "folio-viewer")]
#[command(about = "Terminal shell for the manuscript viewer", long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,

    /// Base path the route table is served under.
    #[arg(long, default_value = "")]
    base: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the route table
    Routes,
    /// Resolve paths without authenticating
    Resolve { paths: Vec<String> },
    /// Authenticate, mount and navigate (the default)
    Run {
        paths: Vec<String>,
        /// Print the Prometheus exposition on exit
        #[arg(long)]
        metrics: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = load_with_env(cli.config.as_deref()).context("loading configuration")?;
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    logging::init(&config.observability)?;
    metrics::set_enabled(config.observability.metrics_enabled);
    if config.observability.metrics_enabled {
        metrics::install()?;
    }

    let router = Arc::new(Router::default_table().with_base(&cli.base));

    let command = cli.command.unwrap_or(Commands::Run {
        paths: Vec::new(),
        metrics: false,
    });
    match command {
        Commands::Routes => {
            for route in router.routes() {
                println!("{:<45} {:<12} {}", route.template.as_str(), route.label(), route.view.kind());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Resolve { paths } => {
            let mut failed = false;
            for path in paths {
                match router.resolve(&path) {
                    Ok(route) => print_route(&route),
                    Err(e) => {
                        eprintln!("{}", e);
                        failed = true;
                    }
                }
            }
            Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }
        Commands::Run {
            paths,
            metrics: print_metrics,
        } => {
            tracing::info!(
                api = %config.api.base_url,
                identity = %config.identity.server_url,
                realm = %config.identity.realm,
                client_id = %config.identity.client_id,
                "folio-viewer starting"
            );

            let api = ApiClient::new(&config.api)?;
            let identity = KeycloakClient::new(&config.identity)?;
            let mut root = MountPoint::new("#app");

            let outcome = bootstrap(&identity, &api, router, &mut root).await;
            let code = match root.take() {
                Some(app) => {
                    run_shell(&app, paths).await?;
                    tracing::info!("Shutdown complete");
                    ExitCode::SUCCESS
                }
                None => {
                    // Already logged by bootstrap
                    tracing::debug!(outcome = ?outcome, "Exiting without a mounted application");
                    ExitCode::FAILURE
                }
            };

            if print_metrics {
                match metrics::render() {
                    Some(exposition) => print!("{}", exposition),
                    None => eprintln!("metrics are disabled (observability.metrics_enabled = false)"),
                }
            }
            Ok(code)
        }
    }
}

/// Navigate the given paths, or read one path per line from stdin.
async fn run_shell(app: &Application, paths: Vec<String>) -> anyhow::Result<()> {
    if !paths.is_empty() {
        for path in paths {
            if let Ok(route) = app.navigate(&path) {
                print_route(&route);
            }
        }
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let path = line.trim();
                if path.is_empty() {
                    continue;
                }
                match app.navigate(path) {
                    Ok(route) => print_route(&route),
                    Err(e) => eprintln!("{}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }
    Ok(())
}

fn print_route(route: &ResolvedRoute) {
    if route.params.is_empty() {
        println!("{} -> {} ({})", route.path, route.name(), route.view.title);
    } else {
        println!("{} -> {} ({}) [{}]", route.path, route.name(), route.view.title, route.params);
    }
}
