use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sitewatch::{
    actors::messages::ShutdownPolicy,
    config::read_config_file,
    lifecycle::Monitor,
    monitors::HttpProbe,
    setup::scaffold,
    telegram::TelegramTransport,
    util::get_log_level,
};
use tracing::{error, info, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short, long, default_value = "config.json")]
    file: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Create .env and config.json from the example files
    Setup {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

fn init() {
    dotenv::dotenv().ok();

    let level = get_log_level();
    let filter = filter::Targets::new().with_targets(vec![("sitewatch", level)]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();

    // Panics inside tasks are contained by the runtime; make sure they show up in the log.
    std::panic::set_hook(Box::new(|info| {
        error!("unexpected fault: {info}");
    }));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    if let Some(Command::Setup { dir }) = args.command {
        for (file, outcome) in scaffold(&dir)? {
            info!("{file}: {outcome:?}");
        }
        info!("edit .env to set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID, and config.json to add websites");
        return Ok(());
    }

    let config = read_config_file(&args.file)?.resolve()?;

    let client = reqwest::Client::builder().build()?;
    let transport = Arc::new(TelegramTransport::from_env(client.clone()));
    let probe = Arc::new(HttpProbe::new(client));

    let grace = config.shutdown_grace;
    let monitor = Monitor::start(&config, transport, probe);

    wait_for_signal().await;

    monitor.shutdown(ShutdownPolicy::Drain { grace }).await;

    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(terminate) => terminate,
        Err(e) => {
            error!("could not listen for SIGTERM: {e}");
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("could not listen for ctrl-c: {e}");
            }
            return;
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("could not listen for ctrl-c: {e}");
            }
        }
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("could not listen for ctrl-c: {e}");
    }
}
