use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use clap::Parser;
use rabbitmq::{PublisherMode, RabbitMQBuilder, SubscriberMode};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use music_catalog::{
    Catalog, CatalogStore, Config, EventKind, EventPublisher, InMemoryBroker, Outbox,
    OutboxRelay, ProjectionStore, ProjectionWorker, Projections, RabbitEventPublisher,
    api::Api, inbounds::rabbit_source::RabbitMessageSource, seed,
};

const RELAY_INTERVAL: Duration = Duration::from_secs(2);

/// CLI options for the application
#[derive(Parser, Debug)]
#[command(name = "music-catalog", about = "Event-driven music catalog")]
struct Opt {
    /// Serve the HTTP API
    #[arg(long)]
    api: bool,

    /// Run the projection worker
    #[arg(long)]
    worker: bool,

    /// Replay the Ramones "Rocket to Russia" catalogue through the commands on startup
    #[arg(long)]
    seed: bool,

    /// Use the process-local broker instead of RabbitMQ
    #[arg(long)]
    in_memory: bool,

    /// API address, overrides API_ADDR
    #[arg(long)]
    addr: Option<SocketAddr>,
}

impl Opt {
    /// Without an explicit role the process runs both the API and the worker
    fn roles(&self) -> (bool, bool) {
        if self.api || self.worker {
            (self.api, self.worker)
        } else {
            (true, true)
        }
    }
}

/// Broker resources that need an orderly close
enum Transport {
    InMemory(InMemoryBroker),
    Rabbit {
        publisher: rabbitmq::Publisher,
        connections: Vec<rabbitmq::Connection>,
    },
}

impl Transport {
    async fn close(self) {
        match self {
            Transport::InMemory(broker) => broker.close(),
            Transport::Rabbit {
                publisher,
                connections,
            } => {
                if let Err(err) = publisher.close().await {
                    warn!("error while closing publisher: {}", err);
                }
                for conn in connections {
                    if let Err(err) = conn.close().await {
                        warn!("error while closing connection: {}", err);
                    }
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let opt = Opt::parse();
    let (run_api, run_worker) = opt.roles();

    let config = match Config::try_from_env() {
        Ok(config) => config,
        Err(err) if opt.in_memory => {
            warn!("{}, using defaults", err);
            Config::default()
        }
        Err(err) => return Err(err).context("loading configuration"),
    };
    let api_addr = opt.addr.unwrap_or(config.api_addr);

    let shutdown = CancellationToken::new();
    let write = Arc::new(CatalogStore::new());
    let read = Arc::new(ProjectionStore::new());
    let projections = Projections::new(read.clone());
    let mut worker = ProjectionWorker::new(shutdown.child_token());

    let (publisher, transport): (Arc<dyn EventPublisher>, Transport) = if opt.in_memory {
        info!("using the in-memory broker");
        let broker = InMemoryBroker::new();
        for kind in EventKind::ALL {
            broker.bind(config.queues.for_kind(kind), kind.routing_key());
        }

        if run_worker {
            for kind in EventKind::ALL {
                let handler = projections
                    .handler_for(kind)
                    .with_context(|| format!("no projection for {}", kind))?;
                worker.spawn(broker.subscription(config.queues.for_kind(kind)), handler);
            }
        }

        let events: Arc<dyn EventPublisher> = Arc::new(broker.clone());
        (events, Transport::InMemory(broker))
    } else {
        info!(url = %config.rabbit_url, exchange = %config.exchange, "connecting to RabbitMQ");
        let client = RabbitMQBuilder::new(&config.rabbit_url, &config.app_id)
            .publisher(&config.exchange, PublisherMode::Topic)
            .build()
            .await
            .context("building RabbitMQ publisher")?;
        let mut connections = vec![client.connection()];
        let publisher = client
            .get_publishers()
            .take_ownership(&config.exchange)
            .context("taking the exchange publisher")?;

        if run_worker {
            let queue = |kind: EventKind| config.queues.for_kind(kind);
            let bound = |kind: EventKind| {
                SubscriberMode::bound(&config.exchange, &[kind.routing_key()])
            };
            let server = RabbitMQBuilder::new(&config.rabbit_url, &config.app_id)
                .subscriber(
                    queue(EventKind::ArtistSubscribed),
                    bound(EventKind::ArtistSubscribed),
                )
                .subscriber(
                    queue(EventKind::AlbumPublished),
                    bound(EventKind::AlbumPublished),
                )
                .subscriber(
                    queue(EventKind::SongPublished),
                    bound(EventKind::SongPublished),
                )
                .subscriber(queue(EventKind::SongPlayed), bound(EventKind::SongPlayed))
                .build()
                .await
                .context("building RabbitMQ subscribers")?;
            connections.push(server.connection());

            let mut subscriptions = server.get_subscribers();
            for kind in EventKind::ALL {
                let subscription = subscriptions
                    .take_ownership(config.queues.for_kind(kind))
                    .with_context(|| format!("taking the {} subscription", kind))?;
                let handler = projections
                    .handler_for(kind)
                    .with_context(|| format!("no projection for {}", kind))?;
                worker.spawn(RabbitMessageSource::new(subscription), handler);
            }
        }

        let events: Arc<dyn EventPublisher> =
            Arc::new(RabbitEventPublisher::new(publisher.get_dispatcher()));
        (
            events,
            Transport::Rabbit {
                publisher,
                connections,
            },
        )
    };

    let outbox = Arc::new(Outbox::new());
    let relay = OutboxRelay::new(outbox.clone(), publisher.clone(), RELAY_INTERVAL)
        .spawn(shutdown.child_token());
    let catalog = Catalog::new(write, read, publisher).with_outbox(outbox.clone());

    if opt.seed {
        let report = seed::rocket_to_russia(&catalog)
            .await
            .context("seeding the catalogue")?;
        info!(artist_id = %report.artist.id, album_id = %report.album.id, "seed published");
    }

    let api = if run_api {
        let api = Api::new(api_addr, catalog);
        Some(tokio::spawn(api.serve(shutdown.child_token())))
    } else {
        None
    };

    info!(api = run_api, worker = run_worker, "music catalog running, press Ctrl-C to stop");
    let stopped_early = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("waiting for Ctrl-C")?;
            info!("shutting down");
            false
        }
        _ = worker.stopped() => {
            error!("a subscriber stopped, shutting down");
            true
        }
    };
    shutdown.cancel();

    if let Some(api) = api {
        match api.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!("API server failed: {}", err),
            Err(err) => error!("API task failed: {}", err),
        }
    }

    let failures: Vec<String> = worker
        .join()
        .await
        .into_iter()
        .filter_map(|(queue, result)| result.err().map(|err| format!("{}: {}", queue, err)))
        .collect();

    if let Err(err) = relay.await {
        error!("outbox relay task failed: {}", err);
    }
    if !outbox.is_empty() {
        warn!(pending = outbox.len(), "events still parked in the outbox");
    }

    transport.close().await;

    if !failures.is_empty() {
        bail!("subscribers failed: {}", failures.join("; "));
    }
    if stopped_early {
        bail!("a subscriber stopped before shutdown was requested");
    }
    Ok(())
}
