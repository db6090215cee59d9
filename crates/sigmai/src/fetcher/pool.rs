//! The fetcher worker pool: one dedicated event-listing worker feeding a
//! bare channel, and `workers - 1` enrichment workers racing to pull
//! from it and attach objects/attributes before forwarding onto the
//! output channel.
//!
//! Each worker owns its client for the lifetime of its own task, so —
//! unlike a shared-worker design — no mutex is needed to serialise a
//! worker's HTTP use: ownership already guarantees only one in-flight
//! request per worker.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use sigmai_core::config::FetcherOptions;
use sigmai_core::misp::Event;

use crate::error::FetchError;
use crate::fetcher::client::MispClient;

/// Page size beyond which a page is assumed non-terminal, per worker.
const CHANNEL_CAPACITY: usize = 1;

/// The output side of a fetcher run: a stream of fully-enriched events
/// plus a slot recording the first error any worker hit.
pub struct FetcherHandle {
    pub events: mpsc::Receiver<Event>,
    error: Arc<Mutex<Option<FetchError>>>,
    tasks: Vec<JoinHandle<()>>,
}

impl FetcherHandle {
    /// The last error observed by any worker (last-writer-wins across
    /// the pool), if the run is finished and something went wrong.
    /// Callers should drain `events` to completion before calling this.
    pub fn error(&self) -> Option<String> {
        self.error.lock().unwrap().as_ref().map(|e| e.to_string())
    }

    /// Waits for every worker task to finish. Call after `events` has
    /// been fully drained.
    pub async fn join(self) {
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

/// Spawns the listing worker and the enrichment workers, wiring them
/// into a single output channel of enriched events.
pub fn spawn(options: FetcherOptions) -> FetcherHandle {
    let options = Arc::new(options);
    let error = Arc::new(Mutex::new(None));
    let mut tasks = Vec::new();

    let (bare_tx, bare_rx) = mpsc::channel::<Event>(CHANNEL_CAPACITY);
    let (out_tx, out_rx) = mpsc::channel::<Event>(CHANNEL_CAPACITY);

    {
        let options = options.clone();
        let error = error.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(err) = run_listing(&options, bare_tx).await {
                *error.lock().unwrap() = Some(err);
            }
        }));
    }

    let bare_rx = Arc::new(tokio::sync::Mutex::new(bare_rx));
    let enrichers = (options.workers - 1).max(0) as usize;
    for _ in 0..enrichers {
        let options = options.clone();
        let error = error.clone();
        let bare_rx = bare_rx.clone();
        let out_tx = out_tx.clone();
        tasks.push(tokio::spawn(async move {
            run_enrichment(&options, bare_rx, out_tx, error).await;
        }));
    }
    drop(out_tx);

    FetcherHandle {
        events: out_rx,
        error,
        tasks,
    }
}

async fn run_listing(
    options: &FetcherOptions,
    tx: mpsc::Sender<Event>,
) -> Result<(), FetchError> {
    let client = MispClient::new(&options.url, &options.key, options.insecure)?;
    let mut page = 1i64;
    loop {
        let events = client
            .fetch_events_page(&options.filters, options.buffer, page)
            .await?;
        let count = events.len() as i64;
        for event in events {
            if tx.send(event).await.is_err() {
                return Ok(());
            }
        }
        if count < options.buffer {
            return Ok(());
        }
        page += 1;
    }
}

async fn run_enrichment(
    options: &FetcherOptions,
    bare_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<Event>>>,
    out_tx: mpsc::Sender<Event>,
    error: Arc<Mutex<Option<FetchError>>>,
) {
    let client = match MispClient::new(&options.url, &options.key, options.insecure) {
        Ok(client) => client,
        Err(err) => {
            *error.lock().unwrap() = Some(err);
            return;
        }
    };
    loop {
        let next = {
            let mut rx = bare_rx.lock().await;
            rx.recv().await
        };
        let Some(mut event) = next else {
            return;
        };
        match enrich(&client, options, &mut event).await {
            Ok(()) => {
                if out_tx.send(event).await.is_err() {
                    return;
                }
            }
            Err(err) => {
                *error.lock().unwrap() = Some(err);
                return;
            }
        }
    }
}

async fn enrich(
    client: &MispClient,
    options: &FetcherOptions,
    event: &mut Event,
) -> Result<(), FetchError> {
    enrich_objects(client, options, event).await?;
    enrich_attributes(client, options, event).await?;
    Ok(())
}

async fn enrich_objects(
    client: &MispClient,
    options: &FetcherOptions,
    event: &mut Event,
) -> Result<(), FetchError> {
    let mut page = 1i64;
    loop {
        let objects = client
            .fetch_objects_page(&event.id, options.buffer, page)
            .await?;
        let count = objects.len() as i64;
        event.object.extend(objects);
        if count < options.buffer {
            return Ok(());
        }
        page += 1;
    }
}

async fn enrich_attributes(
    client: &MispClient,
    options: &FetcherOptions,
    event: &mut Event,
) -> Result<(), FetchError> {
    let index: HashMap<String, usize> = event
        .object
        .iter()
        .enumerate()
        .map(|(i, o)| (o.id.clone(), i))
        .collect();
    let mut page = 1i64;
    loop {
        let attributes = client
            .fetch_attributes_page(&event.id, &options.filters, options.buffer, page)
            .await?;
        let count = attributes.len() as i64;
        for attribute in attributes {
            match attribute.object_id.as_deref() {
                Some(id) if id != "0" => {
                    if let Some(&idx) = index.get(id) {
                        event.object[idx].attribute.push(attribute);
                    }
                }
                _ => event.attribute.push(attribute),
            }
        }
        if count < options.buffer {
            return Ok(());
        }
        page += 1;
    }
}
