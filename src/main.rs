use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use copydesk::api::{ContentApi, StudioClient};
use copydesk::cli::{Cli, Command, IntervalArg};
use copydesk::config::CopydeskConfig;
use copydesk::gate::InferenceGate;
use copydesk::queue::WorkQueue;
use copydesk::runner::{BatchRunner, BatchStrategy};
use copydesk::scheduler::AutomationScheduler;
use copydesk::stats::SharedStats;
use copydesk::store::{StateStore, TomlStateStore};
use copydesk::ui::{self, BatchProgress};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => CopydeskConfig::load_from(Path::new(path))
            .with_context(|| format!("failed to load config from {path}"))?,
        None => CopydeskConfig::load()?,
    };

    let client = Arc::new(StudioClient::with_timeout(
        config.token(),
        config.api_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    ));
    let gate = Arc::new(InferenceGate::new(Arc::clone(&client)));

    match cli.command {
        Command::Run { remote } => run_once(&config, client, gate, remote).await,
        Command::Watch { every } => watch(&config, client, gate, every).await,
        Command::Status => status(&config, client, gate).await,
        Command::Queue => queue_view(client).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "copydesk=debug"
    } else {
        "copydesk=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run_once(
    config: &CopydeskConfig,
    client: Arc<StudioClient>,
    gate: Arc<InferenceGate<StudioClient>>,
    remote: bool,
) -> Result<()> {
    let strategy = if remote {
        BatchStrategy::Remote
    } else {
        config.strategy
    };
    let runner = BatchRunner::new(
        client,
        gate,
        strategy,
        Duration::from_millis(config.item_delay_ms),
    );

    let progress = BatchProgress::start();
    let observer = spawn_observer(&progress, runner.stats());
    let result = runner.execute().await;
    observer.abort();

    match result {
        Ok(report) => {
            progress.finish(&report.stats);
            progress.print_report(&report.items);
            Ok(())
        }
        Err(e) => {
            progress.fail(&e.to_string());
            Err(e.into())
        }
    }
}

/// Acompanha os contadores compartilhados e alimenta o spinner até o
/// fim do lote.
fn spawn_observer(progress: &BatchProgress, stats: SharedStats) -> JoinHandle<()> {
    let progress = progress.clone();
    tokio::spawn(async move {
        loop {
            {
                let stats = stats.lock().await;
                if stats.is_finished() {
                    break;
                }
                progress.observe(&stats);
            }
            tokio::time::sleep(Duration::from_millis(120)).await;
        }
    })
}

async fn watch(
    config: &CopydeskConfig,
    client: Arc<StudioClient>,
    gate: Arc<InferenceGate<StudioClient>>,
    every: Option<IntervalArg>,
) -> Result<()> {
    let runner = Arc::new(BatchRunner::new(
        Arc::clone(&client),
        Arc::clone(&gate),
        config.strategy,
        Duration::from_millis(config.item_delay_ms),
    ));
    let store = TomlStateStore::new(&config.state_path);
    let mut scheduler = AutomationScheduler::new(client, runner, gate, store)?;

    match every {
        Some(arg) => scheduler.enable(arg.minutes()).await?,
        None => {
            // Retoma o agendamento salvo; sem estado salvo, liga no
            // intervalo padrão da configuração.
            if !scheduler.resume().await? {
                scheduler.enable(config.default_interval_minutes).await?;
            }
        }
    }

    let automation = scheduler.config().await;
    println!(
        "automation on, every {} min (ctrl-c to stop)",
        automation.interval_minutes
    );
    tokio::signal::ctrl_c().await?;

    println!("stopping, waiting for any in-flight run to finish");
    scheduler.disable().await?;
    Ok(())
}

async fn status(
    config: &CopydeskConfig,
    client: Arc<StudioClient>,
    gate: Arc<InferenceGate<StudioClient>>,
) -> Result<()> {
    let engine = gate.refresh().await;
    let pending = client.pending_count().await?;
    let automation = TomlStateStore::new(&config.state_path).load()?;
    ui::print_status(engine, pending, &automation);
    Ok(())
}

async fn queue_view(client: Arc<StudioClient>) -> Result<()> {
    let mut queue = WorkQueue::new();
    queue.reload(client.as_ref()).await?;
    ui::print_queue(queue.items());
    Ok(())
}
