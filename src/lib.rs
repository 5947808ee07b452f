pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod listing;
pub mod services;

use tokio::signal;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use cli::{
    Cli, Commands, ExportCommands, OrderCommands, UserCommands, cmd_export_orders,
    cmd_export_users, cmd_order_fulfill, cmd_order_list, cmd_user_create, cmd_user_list,
    cmd_user_points, cmd_user_remove,
};
pub use config::Config;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let mut builder = tracing_loki::builder();
        for (key, value) in &config.observability.loki_labels {
            builder = builder.label(key, value)?;
        }

        let (layer, task) = builder
            .extra_field("version", env!("CARGO_PKG_VERSION"))?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    let cli = Cli::parse();

    match cli.command {
        None => {
            Cli::command().print_help()?;
            Ok(())
        }

        Some(Commands::Serve) => run_server(config, prometheus_handle).await,

        Some(Commands::Init) => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("Config file already exists.");
            }
            Ok(())
        }

        Some(Commands::Users { command }) => match command {
            UserCommands::List { search, page } => {
                cmd_user_list(&config, search.as_deref(), page).await
            }
            UserCommands::Create {
                username,
                name,
                role,
                points,
                password,
            } => {
                cmd_user_create(
                    &config,
                    &username,
                    name.as_deref(),
                    &role,
                    points,
                    password.as_deref(),
                )
                .await
            }
            UserCommands::Points {
                username,
                op,
                amount,
            } => cmd_user_points(&config, &username, &op, amount).await,
            UserCommands::Remove { username, yes } => {
                cmd_user_remove(&config, &username, yes).await
            }
        },

        Some(Commands::Orders { command }) => match command {
            OrderCommands::List { all } => cmd_order_list(&config, all).await,
            OrderCommands::Fulfill { id } => cmd_order_fulfill(&config, id).await,
        },

        Some(Commands::Export { command }) => match command {
            ExportCommands::Users { output } => cmd_export_users(&config, output.as_deref()).await,
            ExportCommands::Orders { output } => {
                cmd_export_orders(&config, output.as_deref()).await
            }
        },
    }
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Merits v{} starting...", env!("CARGO_PKG_VERSION"));

    let state = api::create_app_state(config.clone(), prometheus_handle).await?;

    let port = config.server.port;
    let app = api::router(state);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("API server running at http://0.0.0.0:{port}");
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {e}");
        }
    });

    info!("Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {e}");
        }
    }

    server_handle.abort();
    info!("Server stopped");

    Ok(())
}
