// Fixed-interval polling of upstream resources into watch snapshots
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Latest value of a polled resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot<T> {
    pub data: T,
    /// When `data` was last replaced; `None` until the first successful poll.
    pub updated_at: Option<DateTime<Utc>>,
    /// Error from the most recent poll if it failed. `data` is then stale.
    pub last_error: Option<String>,
}

impl<T> Snapshot<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            updated_at: None,
            last_error: None,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }
}

/// Single writer of one resource snapshot.
pub struct Poller<T> {
    resource: &'static str,
    tx: watch::Sender<Snapshot<T>>,
}

impl<T> Poller<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(resource: &'static str, initial: T) -> (Self, watch::Receiver<Snapshot<T>>) {
        let (tx, rx) = watch::channel(Snapshot::new(initial));
        (Self { resource, tx }, rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.tx.subscribe()
    }

    /// Run one fetch and fold its result into the snapshot.
    ///
    /// On failure the previous data is kept and receivers are not woken.
    pub async fn poll_once<R, Fut, A>(&self, fetch: Fut, apply: A) -> bool
    where
        Fut: Future<Output = anyhow::Result<R>>,
        A: FnOnce(&T, R) -> T,
    {
        match fetch.await {
            Ok(response) => {
                let next = {
                    let current = self.tx.borrow();
                    apply(&current.data, response)
                };
                self.tx.send_replace(Snapshot {
                    data: next,
                    updated_at: Some(Utc::now()),
                    last_error: None,
                });
                tracing::debug!(resource = self.resource, "Snapshot refreshed");
                true
            }
            Err(e) => {
                tracing::warn!(
                    resource = self.resource,
                    "Poll failed, keeping previous snapshot: {:#}",
                    e
                );
                let message = format!("{:#}", e);
                self.tx.send_if_modified(|snapshot| {
                    snapshot.last_error = Some(message);
                    false
                });
                false
            }
        }
    }

    /// Poll forever on `period`, starting immediately.
    pub fn spawn<R, F, Fut, A>(self, period: Duration, mut fetch: F, mut apply: A) -> JoinHandle<()>
    where
        R: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        A: FnMut(&T, R) -> T + Send + 'static,
    {
        tokio::spawn(async move {
            tracing::info!(resource = self.resource, ?period, "Starting poller");
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if self.tx.is_closed() {
                    tracing::info!(resource = self.resource, "No readers left, stopping poller");
                    break;
                }
                self.poll_once(fetch(), |current, response| apply(current, response))
                    .await;
            }
        })
    }
}

/// Replace the snapshot wholesale with the latest response.
pub fn replace<T>(_current: &T, response: T) -> T {
    response
}
