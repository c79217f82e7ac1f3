//! IWM Terminal: warehouse operations client.
//!
//! Main entry point for the terminal application.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use iwm::adapters::http::HttpWarehouseApi;
use iwm::adapters::memory::MemoryWarehouseApi;
use iwm::adapters::sanitize::SanitizingMakeWriter;
use iwm::tui::App;
use iwm::{ClientConfig, WarehouseApi};

#[derive(Parser, Debug)]
#[command(name = "iwm-terminal", version, about = "Intelligent Warehouse Management terminal")]
struct Cli {
    /// Config file (defaults to ./iwm.toml)
    #[arg(long, env = "IWM_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Backend base URL, e.g. http://10.164.222.93:3000
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Factory code sent with every request
    #[arg(long, value_name = "CODE")]
    factory: Option<String>,

    /// Run against the built-in demo backend instead of the network
    #[arg(long)]
    demo: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs on the terminal would corrupt the TUI (alternate screen).
    // - interactive TTY: log to a file
    // - non-interactive: log to stdout
    let log_mode = std::env::var("IWM_LOG_MODE").unwrap_or_else(|_| "auto".to_string());

    let interactive = std::io::stdout().is_terminal();
    let use_file = match log_mode.as_str() {
        "file" => true,
        "stdout" => false,
        _ => interactive,
    };

    let (writer, _guard) = if use_file {
        let log_file =
            std::env::var("IWM_LOG_FILE").unwrap_or_else(|_| "iwm-terminal.log".to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            // A missing directory surfaces as the open error below.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("cannot open log file {log_file}"))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    let config = load_config(&cli)?;
    tracing::info!(
        api_base_url = %config.api_base_url,
        factory_code = %config.factory_code,
        build = %config.build_label,
        "Starting IWM Terminal..."
    );

    let api: Arc<dyn WarehouseApi> = if cli.demo || !config.is_real_url {
        tracing::info!("Using the in-memory demo backend");
        Arc::new(MemoryWarehouseApi::demo())
    } else {
        Arc::new(HttpWarehouseApi::from_config(&config).context("cannot build HTTP client")?)
    };

    let mut app = App::new(&config, api);
    app.run()?;

    tracing::info!("IWM Terminal shutdown complete.");
    Ok(())
}

/// Defaults, then the TOML file, then `IWM_*` variables, then flags.
fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let mut config = ClientConfig::load(&path)?;
    config.apply_env()?;

    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(factory) = &cli.factory {
        config.factory_code = factory.clone();
    }

    config.validate()?;
    Ok(config)
}
