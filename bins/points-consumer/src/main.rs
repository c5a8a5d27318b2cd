use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;

use points_engine::broker::MemoryBroker;
use points_engine::config::ConsumerConfig;
use points_engine::consumer::ConsumeLoop;
use points_engine::handler::PointsHandler;

mod model;
mod replay;

#[derive(Parser)]
#[command(name = "points-consumer", about = "Points stream consumer")]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(long, default_value = "config.toml", env = "POINTS_CONFIG")]
    config: String,

    /// Optional JSONL file of records to replay through the in-memory
    /// broker (offline mode).
    #[arg(long)]
    replay: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!(config = %cli.config, "loading configuration");
    let config = match ConsumerConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "failed to load config");
            std::process::exit(1);
        }
    };

    // In-memory broker: the replay/demo transport. A real deployment
    // substitutes its broker adapter behind the same BrokerClient trait.
    let broker = Arc::new(MemoryBroker::new());
    for topic in &config.topics {
        if let Err(e) = broker.create_topic(topic.clone(), 1) {
            tracing::error!(topic = %topic, error = %e, "failed to create topic");
            std::process::exit(1);
        }
    }

    if let Some(ref path) = cli.replay {
        match replay::seed_from_file(&broker, path, &config.topics[0]) {
            Ok(count) => tracing::info!(replay = %path, records = count, "replay file loaded"),
            Err(e) => {
                tracing::error!(replay = %path, error = %e, "failed to load replay file");
                std::process::exit(1);
            }
        }
    }

    let handler = Arc::new(PointsHandler::new(Arc::new(model::TallyModel)));

    tracing::info!(
        consumer = %config.name,
        group = %config.group_id,
        brokers = ?config.brokers,
        topics = ?config.topics,
        "starting consume loop, press Ctrl+C to stop"
    );

    let consume = ConsumeLoop::new(&config, broker, handler);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut task = tokio::spawn(async move { consume.run(shutdown_rx).await });

    let finished = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down...");
            let _ = shutdown_tx.send(true);
            task.await
        }
        finished = &mut task => finished,
    };

    match finished {
        Ok(Ok(())) => tracing::info!("consumer stopped"),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "consumer terminated with error");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(error = %e, "consumer task panicked");
            std::process::exit(1);
        }
    }
}
