use std::{env, fs, ops::Deref, path::Path, sync::Arc};

use anyhow::Context;
use tracing::debug;

use crate::{error::Error, provider::DatabasePool};

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub database: DatabasePool,
}

impl State {
    pub fn new(config: Config, database: DatabasePool) -> State {
        State { config, database }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub static_dir: Option<String>,
    pub allowed_origins: Vec<String>,
    pub tick_interval: u64,
    pub push_timeout: u64,
    pub push_ttl: i64,
    pub max_push_tasks: usize,
    pub status_code_to_delete: Vec<u16>,
    pub mail_to: String,
    pub vapid_private_key: Vec<u8>,
    pub vapid_public_key: String,
    pub notification_icon: String,
    pub reminder_dedup: bool,
}

fn parse_config_vapid_keys() -> Result<(Vec<u8>, String), Error> {
    let private_key_path = env::var("VAPID_PRIVATE_KEY_PATH")?;
    let public_key_path = env::var("VAPID_PUBLIC_KEY_PATH")?;

    let private_key = fs::read(&private_key_path).with_context(|| {
        format!("reading VAPID private key {}", private_key_path)
    })?;
    let public_key = fs::read_to_string(&public_key_path).with_context(|| {
        format!("reading VAPID public key {}", public_key_path)
    })?;

    Ok((private_key, public_key.trim().to_owned()))
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect()
}

pub fn get_configuration() -> Result<Config, Error> {
    let server_host = env::var("SERVER_HOST")?;
    let port: u16 = env::var("PORT")?.parse()?;
    let database_url = env::var("DATABASE_URL")?;
    let max_connections: u32 = env::var("MAX_CONNECTIONS")?.parse()?;

    let static_dir = env::var("STATIC_DIRECTORY")
        .ok()
        .filter(|dir| !dir.trim().is_empty());
    let allowed_origins = parse_list(&env::var("ALLOWED_ORIGINS")?);

    let tick_interval: u64 = env::var("TICK_INTERVAL_SECS")?.parse()?;
    if tick_interval == 0 {
        return Err(Error::ConfigurationError(String::from(
            "TICK_INTERVAL_SECS must be greater than zero",
        )));
    }

    let push_timeout: u64 = env::var("PUSH_TIMEOUT_SECS")?.parse()?;
    let push_ttl: i64 = env::var("PUSH_TTL")?.parse()?;
    let max_push_tasks: usize = env::var("MAX_PUSH_TASKS")?.parse()?;

    let mut status_code_to_delete = vec![];
    for code in parse_list(&env::var("STATUS_CODE_TO_DELETE")?) {
        status_code_to_delete.push(code.parse::<u16>()?);
    }

    let mail_to = env::var("MAIL_TO")?;
    let (vapid_private_key, vapid_public_key) = parse_config_vapid_keys()?;
    let notification_icon = env::var("NOTIFICATION_ICON")?;
    let reminder_dedup = env::var("REMINDER_DEDUP")?.parse()?;

    let config = Config {
        server_host,
        port,
        database_url,
        max_connections,
        static_dir,
        allowed_origins,
        tick_interval,
        push_timeout,
        push_ttl,
        max_push_tasks: max_push_tasks.max(1),
        status_code_to_delete,
        mail_to,
        vapid_private_key,
        vapid_public_key,
        notification_icon,
        reminder_dedup,
    };

    Ok(config)
}

/// Seeds the process environment from `calendar.conf` (defaults) and `.env`
/// (local overrides). Variables already present in the environment win.
pub fn set_configuration() -> Result<(), Error> {
    for file in [".env", "calendar.conf"] {
        let path = Path::new(file);
        if !path.exists() {
            debug!("Configuration file {} not found, skipping", file);
            continue;
        }

        let config_string = fs::read_to_string(path)?;
        for (key, value) in parse_config_string(&config_string) {
            if env::var_os(&key).is_none() {
                env::set_var(key, value);
            }
        }
    }

    Ok(())
}

fn parse_config_string(config: &str) -> Vec<(String, String)> {
    config
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_at(line.find('=')?);
            Some((key.trim().to_owned(), value[1..].trim().to_owned()))
        })
        .collect()
}
