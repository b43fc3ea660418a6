use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;
use std::collections::HashSet;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/reservas.db?mode=rwc";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub booking: BookingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: Some(4),
            frontend_dir: default_frontend_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

/// How many reservations a single resource may hold on one date.
///
/// Written in TOML either as the string `"unbounded"` or as the integer `1`.
/// With `One`, a new booking replaces whatever the resource already had that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "DailyLimitRepr")]
pub enum DailyLimit {
    #[default]
    Unbounded,
    One,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DailyLimitRepr {
    Count(i64),
    Word(String),
}

impl TryFrom<DailyLimitRepr> for DailyLimit {
    type Error = String;

    fn try_from(value: DailyLimitRepr) -> Result<Self, Self::Error> {
        match value {
            DailyLimitRepr::Count(1) => Ok(DailyLimit::One),
            DailyLimitRepr::Word(w) if w.eq_ignore_ascii_case("unbounded") => Ok(DailyLimit::Unbounded),
            DailyLimitRepr::Word(w) if w.trim() == "1" => Ok(DailyLimit::One),
            DailyLimitRepr::Count(n) => Err(format!("max_reservations_per_resource_per_day must be \"unbounded\" or 1, got {n}")),
            DailyLimitRepr::Word(w) => Err(format!("max_reservations_per_resource_per_day must be \"unbounded\" or 1, got {w:?}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    /// Closed set of bookable computers shown by the form. Empty disables the check.
    #[serde(default = "default_resources")]
    pub resources: Vec<String>,
    #[serde(default)]
    pub max_reservations_per_resource_per_day: DailyLimit,
    #[serde(default = "default_allow_owner_release")]
    pub allow_owner_release: bool,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            resources: default_resources(),
            max_reservations_per_resource_per_day: DailyLimit::default(),
            allow_owner_release: default_allow_owner_release(),
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5000 }
fn default_frontend_dir() -> String { "frontend".to_string() }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_resources() -> Vec<String> { vec!["Jabalí".to_string(), "Lince".to_string()] }
fn default_allow_owner_release() -> bool { true }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load and validate the config file. A missing file falls back to
    /// defaults plus `SERVER_HOST` / `SERVER_PORT` / `DATABASE_URL`.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => {
                let mut cfg = AppConfig::default();
                cfg.server.apply_env();
                cfg
            }
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        // TOML 中未提供 URL 时，从环境变量或默认 SQLite 文件填充
        self.database.normalize_from_env();
        self.database.validate()?;
        self.booking.normalize();
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            self.url = std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        }
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.to_lowercase().starts_with("sqlite:")
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("sqlite:") || lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with sqlite:, postgres:// or postgresql://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl BookingConfig {
    fn normalize(&mut self) {
        // 去重但保留配置中的顺序（下拉框按此顺序展示）
        let mut seen = HashSet::new();
        self.resources = self
            .resources
            .iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty() && seen.insert(r.clone()))
            .collect();
    }

    /// Whether the presentation layer should accept this resource name.
    pub fn is_known_resource(&self, resource_id: &str) -> bool {
        self.resources.is_empty() || self.resources.iter().any(|r| r == resource_id.trim())
    }
}
