use std::path::{Path, PathBuf};
use std::time::Duration;

use env_flags::env_flags;
use once_cell::sync::OnceCell;
use rust_mcp_sdk::error::SdkResult;
use rust_mcp_sdk::mcp_server::{
    HyperServerOptions, ServerRuntime, hyper_server_core, server_runtime_core,
};
use rust_mcp_sdk::schema::{
    Implementation, InitializeResult, LATEST_PROTOCOL_VERSION, ServerCapabilities,
    ServerCapabilitiesTools,
};
use rust_mcp_sdk::{McpServer, StdioTransport, TransportOptions};

use agent_catalog_mcp::config::{UserConfig, default_agents_dir, expand_home, load_user_config};
use agent_catalog_mcp::handler::CatalogServerHandler;
use agent_catalog_mcp::model::DEFAULT_EXTENSION;
use agent_catalog_mcp::{Catalog, CatalogSettings};

fn env_set(k: &str) -> bool {
    std::env::var_os(k).is_some()
}

/// Catalog home: `AGENT_CATALOG_HOME`, else `$HOME/.agent-catalog`, else
/// `.agent-catalog` under the current directory.
fn resolve_home() -> PathBuf {
    env_flags! {
        /// Catalog home directory (absolute). Defaults to $HOME/.agent-catalog
        AGENT_CATALOG_HOME: &str = "";
    }
    if !(*AGENT_CATALOG_HOME).is_empty() {
        PathBuf::from((*AGENT_CATALOG_HOME).to_string())
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".agent-catalog")
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".agent-catalog")
    }
}

fn init_tracing(home: &Path, user_cfg: Option<&UserConfig>) {
    env_flags! {
        /// Tracing filter, e.g. "info", "debug", or targets format.
        RUST_LOG: &str = "info";
        /// Preferred filter env (alias). If set, overrides RUST_LOG.
        TRACING_FILTER: &str = "";
        /// Pretty formatting for logs (ignored if TRACING_JSON=true).
        TRACING_PRETTY: bool = false;
        /// Compact single-line formatting for logs (ignored if TRACING_JSON=true)
        TRACING_COMPACT: bool = true;
        /// JSON formatting for logs
        TRACING_JSON: bool = false;
        /// If true, also log to file under <AGENT_CATALOG_HOME>/logs or LOG_DIR
        LOG_TO_FILE: bool = false;
        /// Optional explicit log directory (absolute). Defaults to <AGENT_CATALOG_HOME>/logs
        LOG_DIR: &str = "";
    }

    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let mut rust_log = if !(*TRACING_FILTER).is_empty() {
        (*TRACING_FILTER).to_string()
    } else {
        (*RUST_LOG).to_string()
    };
    let mut tracing_json = *TRACING_JSON;
    let mut tracing_compact = *TRACING_COMPACT;
    let mut tracing_pretty = *TRACING_PRETTY;
    let mut log_to_file = *LOG_TO_FILE;
    let mut log_dir: Option<PathBuf> = if !(*LOG_DIR).is_empty() {
        Some(PathBuf::from((*LOG_DIR).to_string()))
    } else {
        None
    };

    if let Some(cfg) = user_cfg.and_then(|c| c.logging.as_ref()) {
        if !(env_set("TRACING_FILTER") || env_set("RUST_LOG"))
            && let Some(level) = cfg.level.as_ref()
        {
            rust_log = level.clone();
        }
        if !env_set("TRACING_JSON")
            && let Some(v) = cfg.json
        {
            tracing_json = v;
        }
        if !env_set("TRACING_COMPACT")
            && let Some(v) = cfg.compact
        {
            tracing_compact = v;
        }
        if !env_set("TRACING_PRETTY")
            && let Some(v) = cfg.pretty
        {
            tracing_pretty = v;
        }
        if !env_set("LOG_TO_FILE")
            && let Some(v) = cfg.to_file
        {
            log_to_file = v;
        }
        if !env_set("LOG_DIR")
            && let Some(dir) = cfg.dir.as_ref()
        {
            log_dir = Some(expand_home(dir));
        }
    }

    let filter = EnvFilter::try_new(rust_log).unwrap_or_else(|_| EnvFilter::new("info"));

    // Always write logs to stderr to avoid contaminating stdio JSON-RPC.
    let base = fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr);

    static FILE_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();
    let mut deferred_warning = None;
    let file_writer = if log_to_file {
        let dir = log_dir.unwrap_or_else(|| home.join("logs"));
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(dir, "agent-catalog-mcp.log");
                let (nb, guard) = tracing_appender::non_blocking(appender);
                let _ = FILE_GUARD.set(guard);
                Some(nb)
            }
            Err(e) => {
                deferred_warning = Some(format!(
                    "failed to create log dir {}: {}",
                    dir.display(),
                    e
                ));
                None
            }
        }
    } else {
        None
    };

    macro_rules! file_layer {
        ($writer:expr) => {
            fmt::layer()
                .with_file(false)
                .with_line_number(false)
                .with_target(true)
                .with_ansi(false)
                .with_writer($writer)
        };
    }

    let reg = tracing_subscriber::registry().with(filter);
    let installed = if tracing_json {
        reg.with(base.json())
            .with(file_writer.map(|nb| file_layer!(nb).json()))
            .try_init()
    } else if tracing_compact {
        reg.with(base.compact())
            .with(file_writer.map(|nb| file_layer!(nb).compact()))
            .try_init()
    } else if tracing_pretty {
        reg.with(base.pretty())
            .with(file_writer.map(|nb| file_layer!(nb).pretty()))
            .try_init()
    } else {
        reg.with(base)
            .with(file_writer.map(|nb| file_layer!(nb)))
            .try_init()
    };
    if let Err(e) = installed {
        tracing::debug!("tracing already set: {:?}", e);
    }
    if let Some(msg) = deferred_warning {
        tracing::warn!("{}", msg);
    }
}

/// Resolve catalog settings: env wins, else user config, else defaults.
fn catalog_settings(user_cfg: Option<&UserConfig>) -> CatalogSettings {
    env_flags! {
        /// Directory holding agent definition files. Defaults to $HOME/.claude/agents
        AGENTS_DIR: &str = "";
        /// Definition file suffix stripped to form agent ids. Defaults to ".md"
        AGENTS_EXTENSION: &str = "";
    }
    let catalog_cfg = user_cfg.and_then(|c| c.catalog.as_ref());

    let agents_dir = if !(*AGENTS_DIR).is_empty() {
        expand_home(*AGENTS_DIR)
    } else {
        catalog_cfg
            .and_then(|c| c.agents_dir.as_deref())
            .map(expand_home)
            .unwrap_or_else(default_agents_dir)
    };
    let extension = if !(*AGENTS_EXTENSION).is_empty() {
        (*AGENTS_EXTENSION).to_string()
    } else {
        catalog_cfg
            .and_then(|c| c.extension.clone())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
    };
    CatalogSettings::new(agents_dir).with_extension(extension)
}

#[tokio::main]
async fn main() -> SdkResult<()> {
    let home = resolve_home();
    let (user_cfg, cfg_error) = match load_user_config(&home) {
        Ok(cfg) => (cfg, None),
        Err(e) => (None, Some(e)),
    };
    init_tracing(&home, user_cfg.as_ref());
    if let Some(e) = cfg_error {
        tracing::warn!("ignoring user config: {:#}", e);
    }

    env_flags! {
        /// Transport: "stdio" (default) or "http"
        TRANSPORT: &str = "stdio";
        /// Host for HTTP transport
        HOST: &str = "127.0.0.1";
        /// Port for HTTP transport
        PORT: u16 = 8081;
        /// Ping interval for HTTP SSE
        PING_SECS: u64 = 5;
        /// Enable JSON response mode for HTTP
        HTTP_JSON: bool = false;
    }

    tracing::info!("starting agent-catalog-mcp (transport={})", *TRANSPORT);
    tracing::info!("agent_catalog_home={}", home.display());

    let settings = catalog_settings(user_cfg.as_ref());
    tracing::info!(
        "agents_dir={} (extension={})",
        settings.agents_dir.display(),
        settings.extension
    );
    if !settings.agents_dir.is_dir() {
        tracing::warn!(
            "agents directory {} does not exist yet; listings will be empty",
            settings.agents_dir.display()
        );
    }

    let server_details = InitializeResult {
        server_info: Implementation {
            name: "agent-catalog-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: Some("Agent Catalog MCP Server".to_string()),
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools { list_changed: None }),
            ..Default::default()
        },
        meta: None,
        instructions: Some(
            "Call list_agents with optional { search, color, tools } filters, or get_agent with { id }."
                .to_string(),
        ),
        protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
    };

    let handler = CatalogServerHandler::new(Catalog::new(settings));

    if *TRANSPORT == "stdio" {
        let transport = StdioTransport::new(TransportOptions::default())?;
        let server: ServerRuntime =
            server_runtime_core::create_server(server_details, transport, handler);
        tracing::info!("starting stdio server");
        if let Err(e) = server.start().await {
            let msg = match e.rpc_error_message() {
                Some(m) => m.to_string(),
                None => e.to_string(),
            };
            tracing::error!("server runtime error: {}", msg);
        }
    } else {
        let host = (*HOST).to_string();
        let port = *PORT;
        let ping = Duration::from_secs(*PING_SECS);
        let server = hyper_server_core::create_server(
            server_details,
            handler,
            HyperServerOptions {
                host: host.clone(),
                port,
                ping_interval: ping,
                enable_json_response: Some(*HTTP_JSON),
                ..Default::default()
            },
        );
        tracing::info!(
            "http server configured; starting listener on {}:{} (json={}, ping_secs={})",
            host,
            port,
            *HTTP_JSON,
            *PING_SECS
        );
        if let Err(e) = server.start().await {
            let msg = match e.rpc_error_message() {
                Some(m) => m.to_string(),
                None => e.to_string(),
            };
            tracing::error!("hyper server error: {}", msg);
        }
    }
    tracing::info!("server stopped");
    Ok(())
}
