//! Server configuration
//!
//! Everything is read from `INV_*` environment variables (a `.env` file is loaded first if one exists). Invalid values
//! are reported and replaced with their defaults rather than stopping the server.
use std::{env, io::Write};

use inv_common::{helpers::parse_boolean_flag, Secret};
use log::*;
use rand::RngCore;
use tempfile::NamedTempFile;

const DEFAULT_INV_HOST: &str = "127.0.0.1";
const DEFAULT_INV_PORT: u16 = 8000;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/inventory.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_SIGNATURE_HEADER: &str = "X-Signature";
const DEFAULT_CONFLICT_RETRIES: u32 = 5;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// If true, the SQLite database file is created on startup when it does not exist yet.
    pub create_database: bool,
    /// How many times a unit of work is attempted when it collides with a concurrent write.
    pub conflict_retries: u32,
    pub webhook: WebhookConfig,
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    /// The shared secret that payment providers sign their webhook payloads with.
    pub secret: Secret<String>,
    /// The header that carries the hex HMAC-SHA256 of the request body.
    pub signature_header: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_INV_HOST.to_string(),
            port: DEFAULT_INV_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            create_database: true,
            conflict_retries: DEFAULT_CONFLICT_RETRIES,
            webhook: WebhookConfig::default(),
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The webhook secret has not been set. I'm using a random value for this session. Payment \
             notifications signed with any other secret will be rejected. 🚨️🚨️🚨️"
        );
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let secret = hex::encode(bytes);
        match NamedTempFile::new().ok().and_then(|f| f.keep().ok()) {
            Some((mut f, p)) => match writeln!(f, "{secret}") {
                Ok(()) => warn!(
                    "🚨️🚨️🚨️ The webhook secret for this session was written to {}. If this is a production instance, \
                     you are doing it wrong! Set the INV_WEBHOOK_SECRET environment variable instead. 🚨️🚨️🚨️",
                    p.to_str().unwrap_or("???")
                ),
                Err(e) => warn!("🪛️ Could not write the webhook secret to the temporary file. {e}"),
            },
            None => warn!("🪛️ Could not create a temporary file to store the webhook secret."),
        }
        Self { secret: Secret::new(secret), signature_header: DEFAULT_SIGNATURE_HEADER.to_string() }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any source of named values. `lookup` returns `None` for unset values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String> {
        let host = lookup("INV_HOST").unwrap_or_else(|| DEFAULT_INV_HOST.into());
        let port = parse_or_default(lookup("INV_PORT"), "INV_PORT", DEFAULT_INV_PORT);
        let database_url = lookup("INV_DATABASE_URL").unwrap_or_else(|| {
            warn!("🪛️ INV_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections =
            parse_or_default(lookup("INV_DB_MAX_CONNECTIONS"), "INV_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let create_database = parse_boolean_flag(lookup("INV_CREATE_DATABASE"), true);
        let conflict_retries =
            parse_or_default(lookup("INV_CONFLICT_RETRIES"), "INV_CONFLICT_RETRIES", DEFAULT_CONFLICT_RETRIES).max(1);
        let signature_header =
            lookup("INV_WEBHOOK_SIGNATURE_HEADER").unwrap_or_else(|| DEFAULT_SIGNATURE_HEADER.to_string());
        let webhook = match lookup("INV_WEBHOOK_SECRET").filter(|s| !s.trim().is_empty()) {
            Some(secret) => WebhookConfig { secret: Secret::new(secret), signature_header },
            None => WebhookConfig { signature_header, ..WebhookConfig::default() },
        };
        Self { host, port, database_url, max_connections, create_database, conflict_retries, webhook }
    }
}

fn parse_or_default<T>(value: Option<String>, name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match value {
        None => default,
        Some(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
    }
}
