use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Origins allowed to open a socket when running in production, unless
/// `ALLOWED_ORIGINS` says otherwise.
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "https://tvo-video-chat.netlify.app",
    "https://tvo-video-chat.vercel.app",
    "https://vindexadmin.github.io",
    "https://tvo.netlify.app",
    "https://tvo.vercel.app",
];

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: IpAddr,
    pub server_port: u16,
    pub environment: Environment,
    pub log_level: String,
    pub allowed_origins: Vec<String>,
    pub reaper_interval: Duration,
    pub match_on_announce: bool,
}

/// Deployment environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: IpAddr::from([127, 0, 0, 1]),
            server_port: 3001,
            environment: Environment::Development,
            log_level: "info".to_string(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(ToString::to_string)
                .collect(),
            reaper_interval: Duration::from_secs(300),
            match_on_announce: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if present).
    ///
    /// All variables are optional: `SERVER_HOST`, `PORT` / `SERVER_PORT`,
    /// `ENVIRONMENT`, `LOG_LEVEL`, `ALLOWED_ORIGINS`, `REAPER_INTERVAL_SECS`,
    /// `MATCH_ON_ANNOUNCE`.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set to an unparseable value.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let environment = match var("ENVIRONMENT").as_deref().unwrap_or("development") {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        // Hosting platforms provide PORT; fall back to SERVER_PORT
        let server_port = match var("PORT").or_else(|| var("SERVER_PORT")) {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT / PORT must be a valid u16"))?,
            None => defaults.server_port,
        };

        let default_host = if environment == Environment::Production {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };
        let server_host = var("SERVER_HOST")
            .unwrap_or_else(|| default_host.to_string())
            .parse::<IpAddr>()
            .map_err(|_| anyhow::anyhow!("SERVER_HOST must be a valid IP address"))?;

        let log_level = var("LOG_LEVEL").unwrap_or(defaults.log_level);

        let allowed_origins = match var("ALLOWED_ORIGINS") {
            Some(list) => parse_origins(&list),
            None => defaults.allowed_origins,
        };

        let reaper_interval = match var("REAPER_INTERVAL_SECS") {
            Some(secs) => match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => anyhow::bail!("REAPER_INTERVAL_SECS must be a positive number of seconds"),
            },
            None => defaults.reaper_interval,
        };

        let match_on_announce = match var("MATCH_ON_ANNOUNCE") {
            Some(flag) => parse_flag(&flag)
                .ok_or_else(|| anyhow::anyhow!("MATCH_ON_ANNOUNCE must be true or false"))?,
            None => defaults.match_on_announce,
        };

        Ok(Self {
            server_host,
            server_port,
            environment,
            log_level,
            allowed_origins,
            reaper_interval,
            match_on_announce,
        })
    }

    /// Build the socket address for the server to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }
}

fn parse_origins(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
