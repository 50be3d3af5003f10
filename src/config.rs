use std::env;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const ENV_WORKSPACE: &str = "QUARTZD_WORKSPACE";
pub const ENV_LOG: &str = "QUARTZD_LOG";
pub const ENV_LOG_JSON: &str = "QUARTZD_LOG_JSON";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Opened at startup when set; `workspace.select` can still switch later.
    pub workspace: Option<PathBuf>,
    pub log_filter: String,
    pub log_json: bool,
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            workspace: env_non_empty(ENV_WORKSPACE).map(PathBuf::from),
            log_filter: env_non_empty(ENV_LOG)
                .or_else(|| env_non_empty("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),
            log_json: env_bool(ENV_LOG_JSON, false),
        }
    }
}

/// Logs go to stderr; stdout belongs to the IPC channel.
pub fn init_tracing(cfg: &Config) {
    let filter = EnvFilter::try_new(&cfg.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    let result = if cfg.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    if let Err(e) = result {
        eprintln!("quartzd: tracing already initialised: {e}");
    }
}
