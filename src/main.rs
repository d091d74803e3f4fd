use std::{sync::Arc, time::Duration};

use clap::Parser;
use tracing::{error, info, Level};

use calendar_push::{
    cli::{self, Cli, Commands},
    configuration::{AppState, Config, State},
    error::Error,
    handler::{DispatchSettings, Dispatcher, Scheduler},
    migration::run_migrations,
    provider::DatabasePool,
    push::WebPush,
    server,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level({
            #[cfg(debug_assertions)]
            {
                Level::DEBUG
            }

            #[cfg(not(debug_assertions))]
            {
                Level::INFO
            }
        })
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let args = Cli::parse();

    match args.command {
        None | Some(Commands::Serve) => serve().await,
        Some(Commands::Migrate { status }) => cli::run_migrate(status).await,
        Some(Commands::Tick { at }) => cli::run_tick(at).await,
    }
}

async fn serve() -> Result<(), Error> {
    let (config, database) = match init().await {
        Ok((config, database)) => (config, database),
        Err(e) => return Err(Error::ConfigurationError(e.to_string())),
    };

    let settings = DispatchSettings::from_config(&config);
    let push = WebPush::new(config.clone())?;
    let dispatcher = Dispatcher::new(&database, Arc::new(push), settings);
    let scheduler = Scheduler::start(
        dispatcher,
        Duration::from_secs(config.tick_interval),
    );

    let app_state = AppState::new(State::new(config, database));
    let server = server::init_server(app_state)?;
    let handle = server.handle();
    let mut server = tokio::spawn(server);

    let result = tokio::select! {
        result = &mut server => {
            result.map_err(Error::from).and_then(|r| r.map_err(Error::from))
        },
        signal = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
            handle.stop(true).await;
            signal.map_err(Error::from)
        },
    };

    scheduler.stop().await?;
    info!("Stopped");

    result
}

async fn init() -> Result<(Config, DatabasePool), Error> {
    let config = cli::init_config()?;
    let database = DatabasePool::new(&config).await?;
    run_migrations(database.get_pool()).await?;
    Ok((config, database))
}
