//! Task wrapper that owns a [`PageFeed`] and drives its upstream requests.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tcgshop_core::{CatalogPage, NormalizedCatalogItem};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::CatalogError;

use super::feed::{FeedOutcome, PageFeed, PageTicket};
use super::{PageSource, SearchParams};

type InFlight = BoxFuture<'static, (PageTicket, Result<CatalogPage, CatalogError>)>;

/// The feed task has stopped.
#[derive(Debug, Error)]
#[error("page feed task is no longer running")]
pub struct FeedClosed;

/// Notifications emitted by a running feed.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    PageLoaded {
        generation: u64,
        added: usize,
        total: usize,
        has_more: bool,
    },
    /// A page request failed. Nothing is retried; send another
    /// [`FeedHandle::fetch_next`] to try again.
    FetchFailed {
        generation: u64,
        error: Arc<CatalogError>,
    },
    StaleDiscarded {
        generation: u64,
    },
    Reset {
        generation: u64,
    },
}

/// Point-in-time copy of a feed's state.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub generation: u64,
    pub params: SearchParams,
    /// Accumulated items in display order.
    pub items: Vec<NormalizedCatalogItem>,
    pub pages_loaded: usize,
    pub has_more: bool,
    pub fetching: bool,
}

enum FeedCommand {
    FetchNext,
    Reset(SearchParams),
    Snapshot(oneshot::Sender<FeedSnapshot>),
}

/// Cloneable handle to a feed task. The task exits once every handle is
/// dropped.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    tx: mpsc::UnboundedSender<FeedCommand>,
}

impl FeedHandle {
    /// Requests the next page. Ignored while a request is in flight or once
    /// the result set is exhausted.
    ///
    /// # Errors
    ///
    /// [`FeedClosed`] if the task has stopped.
    pub fn fetch_next(&self) -> Result<(), FeedClosed> {
        self.tx.send(FeedCommand::FetchNext).map_err(|_| FeedClosed)
    }

    /// Switches to new parameters, discarding accumulated items, and starts
    /// fetching the first page.
    ///
    /// # Errors
    ///
    /// [`FeedClosed`] if the task has stopped.
    pub fn reset(&self, params: SearchParams) -> Result<(), FeedClosed> {
        self.tx
            .send(FeedCommand::Reset(params))
            .map_err(|_| FeedClosed)
    }

    /// # Errors
    ///
    /// [`FeedClosed`] if the task has stopped.
    pub async fn snapshot(&self) -> Result<FeedSnapshot, FeedClosed> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(FeedCommand::Snapshot(reply))
            .map_err(|_| FeedClosed)?;
        rx.await.map_err(|_| FeedClosed)
    }
}

/// Spawns a task that owns a [`PageFeed`] for `params`.
///
/// Nothing is fetched until the first [`FeedHandle::fetch_next`]. Events are
/// delivered on the returned receiver; dropping it does not stop the task.
pub fn spawn_feed<S: PageSource>(
    source: Arc<S>,
    params: SearchParams,
) -> (
    FeedHandle,
    mpsc::UnboundedReceiver<FeedEvent>,
    JoinHandle<()>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_feed(source, PageFeed::new(params), rx, event_tx));
    (FeedHandle { tx }, event_rx, task)
}

async fn run_feed<S: PageSource>(
    source: Arc<S>,
    mut feed: PageFeed,
    mut commands: mpsc::UnboundedReceiver<FeedCommand>,
    events: mpsc::UnboundedSender<FeedEvent>,
) {
    let mut in_flight: FuturesUnordered<InFlight> = FuturesUnordered::new();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                None => break,
                Some(FeedCommand::FetchNext) => start_fetch(&source, &mut feed, &in_flight),
                Some(FeedCommand::Reset(params)) => {
                    let generation = feed.reset(params);
                    tracing::debug!(generation, "feed reset");
                    emit(&events, FeedEvent::Reset { generation });
                    start_fetch(&source, &mut feed, &in_flight);
                }
                Some(FeedCommand::Snapshot(reply)) => {
                    // The requester may have given up waiting.
                    let _ = reply.send(snapshot(&feed));
                }
            },
            Some((ticket, result)) = in_flight.next(), if !in_flight.is_empty() => {
                let generation = ticket.generation;
                let event = match feed.complete(ticket, result) {
                    FeedOutcome::Appended { added, has_more } => {
                        tracing::info!(
                            generation,
                            added,
                            total = feed.items().len(),
                            has_more,
                            "catalog page appended"
                        );
                        FeedEvent::PageLoaded {
                            generation,
                            added,
                            total: feed.items().len(),
                            has_more,
                        }
                    }
                    FeedOutcome::Failed(error) => {
                        tracing::warn!(generation, error = %error, "catalog page fetch failed");
                        FeedEvent::FetchFailed {
                            generation,
                            error: Arc::new(error),
                        }
                    }
                    FeedOutcome::Stale => FeedEvent::StaleDiscarded { generation },
                };
                emit(&events, event);
            }
        }
    }
}

fn start_fetch<S: PageSource>(
    source: &Arc<S>,
    feed: &mut PageFeed,
    in_flight: &FuturesUnordered<InFlight>,
) {
    let Some(ticket) = feed.begin_fetch() else {
        tracing::debug!(
            fetching = feed.is_fetching(),
            has_more = feed.has_more(),
            "fetch request ignored"
        );
        return;
    };
    let source = Arc::clone(source);
    in_flight.push(Box::pin(async move {
        let result = source
            .fetch_page(&ticket.params, ticket.cursor.as_deref())
            .await;
        (ticket, result)
    }));
}

fn snapshot(feed: &PageFeed) -> FeedSnapshot {
    FeedSnapshot {
        generation: feed.generation(),
        params: feed.params().clone(),
        items: feed.display_items(),
        pages_loaded: feed.pages_loaded(),
        has_more: feed.has_more(),
        fetching: feed.is_fetching(),
    }
}

fn emit(events: &mpsc::UnboundedSender<FeedEvent>, event: FeedEvent) {
    if events.send(event).is_err() {
        tracing::trace!("feed event receiver dropped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::Notify;

    use super::*;

    /// Two pages per search term (`<term>-1`, `<term>-2`). The term `slow`
    /// blocks until `gate` is notified; `flaky` fails on its second page.
    #[derive(Default)]
    struct ScriptedSource {
        calls: AtomicUsize,
        gate: Notify,
    }

    impl PageSource for ScriptedSource {
        async fn fetch_page(
            &self,
            params: &SearchParams,
            cursor: Option<&str>,
        ) -> Result<CatalogPage, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let term = params.search.clone().unwrap_or_default();
            if term == "slow" {
                self.gate.notified().await;
            }
            let (n, next) = match cursor {
                None => (1, Some("c2".to_owned())),
                Some(_) if term == "flaky" => {
                    return Err(CatalogError::UnexpectedStatus {
                        status: 503,
                        url: "http://localhost/v2/catalog/search".to_owned(),
                    })
                }
                Some(_) => (2, None),
            };
            Ok(CatalogPage {
                items: vec![NormalizedCatalogItem {
                    item_id: format!("{term}-{n}"),
                    ..NormalizedCatalogItem::default()
                }],
                cursor: next,
            })
        }
    }

    fn params(term: &str) -> SearchParams {
        SearchParams {
            search: Some(term.to_owned()),
            ..SearchParams::default()
        }
    }

    async fn next_event(events: &mut mpsc::UnboundedReceiver<FeedEvent>) -> FeedEvent {
        tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("event within timeout")
            .expect("event channel open")
    }

    fn ids(snapshot: &FeedSnapshot) -> Vec<&str> {
        snapshot.items.iter().map(|i| i.item_id.as_str()).collect()
    }

    #[tokio::test]
    async fn rapid_triggers_issue_one_request() {
        let source = Arc::new(ScriptedSource::default());
        let (handle, mut events, _task) = spawn_feed(Arc::clone(&source), params("slow"));

        handle.fetch_next().unwrap();
        handle.fetch_next().unwrap();
        handle.fetch_next().unwrap();
        let during = handle.snapshot().await.unwrap();
        assert!(during.fetching);

        source.gate.notify_one();
        assert!(matches!(
            next_event(&mut events).await,
            FeedEvent::PageLoaded { added: 1, total: 1, has_more: true, .. }
        ));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn loads_pages_until_exhausted() {
        let source = Arc::new(ScriptedSource::default());
        let (handle, mut events, _task) = spawn_feed(Arc::clone(&source), params("mtg"));

        handle.fetch_next().unwrap();
        next_event(&mut events).await;
        handle.fetch_next().unwrap();
        assert!(matches!(
            next_event(&mut events).await,
            FeedEvent::PageLoaded { total: 2, has_more: false, .. }
        ));

        handle.fetch_next().unwrap();
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(ids(&snapshot), vec!["mtg-1", "mtg-2"]);
        assert!(!snapshot.has_more);
        assert!(!snapshot.fetching);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_page_keeps_accumulated_items() {
        let source = Arc::new(ScriptedSource::default());
        let (handle, mut events, _task) = spawn_feed(Arc::clone(&source), params("flaky"));

        handle.fetch_next().unwrap();
        next_event(&mut events).await;
        handle.fetch_next().unwrap();
        match next_event(&mut events).await {
            FeedEvent::FetchFailed { generation, error } => {
                assert_eq!(generation, 0);
                assert!(matches!(*error, CatalogError::UnexpectedStatus { status: 503, .. }));
            }
            other => panic!("expected FetchFailed, got {other:?}"),
        }

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(ids(&snapshot), vec!["flaky-1"]);
        assert!(snapshot.has_more);
        assert!(!snapshot.fetching);
    }

    #[tokio::test]
    async fn response_for_old_params_is_discarded_after_reset() {
        let source = Arc::new(ScriptedSource::default());
        let (handle, mut events, _task) = spawn_feed(Arc::clone(&source), params("slow"));

        handle.fetch_next().unwrap();
        handle.reset(params("fast")).unwrap();

        assert!(matches!(next_event(&mut events).await, FeedEvent::Reset { generation: 1 }));
        assert!(matches!(
            next_event(&mut events).await,
            FeedEvent::PageLoaded { generation: 1, .. }
        ));

        source.gate.notify_one();
        assert!(matches!(
            next_event(&mut events).await,
            FeedEvent::StaleDiscarded { generation: 0 }
        ));

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.generation, 1);
        assert_eq!(ids(&snapshot), vec!["fast-1"]);
    }

    #[tokio::test]
    async fn task_exits_when_handles_drop() {
        let source = Arc::new(ScriptedSource::default());
        let (handle, _events, task) = spawn_feed(source, params("mtg"));
        drop(handle);
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("task exits")
            .expect("task did not panic");
    }
}
