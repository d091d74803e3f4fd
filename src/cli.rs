//! Command-line interface.
//!
//! Besides serving, the binary can apply migrations or run a single
//! notification tick without starting the HTTP server.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};

use crate::{
    configuration::{get_configuration, set_configuration, Config},
    error::Error,
    handler::{DispatchSettings, Dispatcher},
    migration,
    provider::DatabasePool,
    push::WebPush,
};

pub const TICK_AT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Shared calendar with Web Push notifications
#[derive(Parser)]
#[command(name = "calendar-push")]
#[command(about = "Shared calendar server and push notification dispatcher", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server and the notification scheduler (default)
    Serve,

    /// Run database migrations
    Migrate {
        /// Show migration status without running migrations
        #[arg(long)]
        status: bool,
    },

    /// Run one notification tick and exit
    Tick {
        /// Local instant to evaluate, e.g. 2026-10-15T13:50 (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
}

/// Initialize configuration and return Config
pub fn init_config() -> Result<Config, Error> {
    set_configuration()?;
    get_configuration()
}

pub fn parse_tick_at(value: Option<&str>) -> Result<NaiveDateTime, Error> {
    match value {
        Some(value) => {
            NaiveDateTime::parse_from_str(value.trim(), TICK_AT_FORMAT)
                .map_err(|_| {
                    Error::InvalidOption {
                        option: format!("--at {}", value),
                    }
                })
        },
        None => Ok(Local::now().naive_local()),
    }
}

pub async fn run_migrate(status_only: bool) -> Result<(), Error> {
    let config = init_config()?;
    let database = DatabasePool::new(&config).await?;

    if status_only {
        tracing::info!("Checking migration status...");
        for (version, description) in
            migration::applied_versions(database.get_pool()).await?
        {
            tracing::info!("Applied: {:04}_{}", version, description);
        }
        for (version, description) in
            migration::pending_versions(database.get_pool()).await?
        {
            tracing::info!("Pending: {:04}_{}", version, description);
        }
        return Ok(());
    }

    migration::run_migrations(database.get_pool()).await?;
    tracing::info!("Migrations complete");

    Ok(())
}

pub async fn run_tick(at: Option<String>) -> Result<(), Error> {
    let now = parse_tick_at(at.as_deref())?;

    let config = init_config()?;
    let database = DatabasePool::new(&config).await?;
    migration::run_migrations(database.get_pool()).await?;

    let settings = DispatchSettings::from_config(&config);
    let push = WebPush::new(config)?;
    let dispatcher = Dispatcher::new(&database, Arc::new(push), settings);

    tracing::info!("Running notification tick at {}", now);
    let report = dispatcher.run_tick(now).await;

    tracing::info!(
        "{} payload(s), {} delivered, {} failed, {} pruned",
        report.payloads,
        report.delivered,
        report.failed,
        report.pruned
    );
    for category in &report.failed_categories {
        tracing::warn!("Category {} could not be evaluated", category);
    }
    if report.subscriptions_unavailable {
        tracing::warn!("Subscriptions could not be read, nothing was sent");
    }

    Ok(())
}
