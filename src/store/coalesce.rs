//! Single in-flight request guard.

use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::errors::{ApiError, Result};

type Outcome<T> = Option<Result<T>>;

/// While one call is running, later calls wait for its outcome instead of
/// starting their own. Every waiter receives a clone of the same result.
///
/// There is no queue: once the running call settles, the next call starts
/// fresh.
#[derive(Debug)]
pub struct Coalescer<T> {
    in_flight: Mutex<Option<watch::Receiver<Outcome<T>>>>,
}

enum Role<T> {
    Leader(watch::Sender<Outcome<T>>),
    Follower(watch::Receiver<Outcome<T>>),
}

impl<T: Clone> Coalescer<T> {
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// Run `call`, or join the call already in flight.
    pub async fn run<F, Fut>(&self, call: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let role = {
            let mut slot = self.in_flight.lock();
            match slot.as_ref() {
                Some(rx) => Role::Follower(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    *slot = Some(rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Follower(mut rx) => {
                tracing::debug!("Joining in-flight request");
                match rx.wait_for(Option::is_some).await {
                    Ok(outcome) => (*outcome).clone().unwrap_or(Err(ApiError::Cancelled)),
                    // The leader was dropped before it settled.
                    Err(_) => Err(ApiError::Cancelled),
                }
            }
            Role::Leader(tx) => {
                let _release = scopeguard::guard((), |_| {
                    *self.in_flight.lock() = None;
                });
                let result = call().await;
                tx.send_replace(Some(result.clone()));
                result
            }
        }
    }
}

impl<T: Clone> Default for Coalescer<T> {
    fn default() -> Self {
        Self::new()
    }
}
