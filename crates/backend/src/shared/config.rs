use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the loan-origination backend
    pub base_url: String,
    /// Timeout for disbursal/AUM requests, seconds
    pub timeout_secs: u64,
    /// Shorter timeout for the collection metrics call so a slow
    /// metrics endpoint cannot stall the whole page
    pub metrics_timeout_secs: u64,
    /// Service API key used when a request carries no employee session
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
bind_addr = "0.0.0.0:3000"

[upstream]
base_url = "https://backend.blinkrloan.com"
timeout_secs = 30
metrics_timeout_secs = 10
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// The `BLINKR_API_KEY` environment variable overrides `upstream.api_key`.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = read_config_file()?;

    if let Ok(key) = std::env::var("BLINKR_API_KEY") {
        if !key.trim().is_empty() {
            config.upstream.api_key = Some(key);
        }
    }

    Ok(config)
}

fn read_config_file() -> anyhow::Result<Config> {
    // Try to find config.toml next to the executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    // Fall back to default config
    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}
