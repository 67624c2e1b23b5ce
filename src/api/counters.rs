//! Daily registration and tourist counters at the border.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{ApiError, Result};
use crate::http::{ApiClient, Body};
use crate::models::{CounterAdjustment, RegistrationCounter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKind {
    /// `/no-of-register`: registrations filed.
    Register,
    /// `/no-of-tourists`: tourists counted.
    Tourists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Enter,
    Exit,
}

impl CounterKind {
    pub const ALL: [CounterKind; 2] = [CounterKind::Register, CounterKind::Tourists];

    fn segment(&self) -> &'static str {
        match self {
            CounterKind::Register => "no-of-register",
            CounterKind::Tourists => "no-of-tourists",
        }
    }
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Enter, Direction::Exit];

    fn segment(&self) -> &'static str {
        match self {
            Direction::Enter => "enter",
            Direction::Exit => "exit",
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

impl FromStr for CounterKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "register" | "no-of-register" => Ok(CounterKind::Register),
            "tourists" | "no-of-tourists" => Ok(CounterKind::Tourists),
            other => Err(ApiError::Validation(format!("unknown counter {:?}", other))),
        }
    }
}

impl FromStr for Direction {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "enter" => Ok(Direction::Enter),
            "exit" => Ok(Direction::Exit),
            other => Err(ApiError::Validation(format!("unknown direction {:?}", other))),
        }
    }
}

fn counter_path(kind: CounterKind, direction: Direction) -> String {
    format!("/{}/{}", kind.segment(), direction.segment())
}

/// One counter reading, as printed by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CounterReading {
    pub kind: CounterKind,
    pub direction: Direction,
    #[serde(flatten)]
    pub counter: RegistrationCounter,
}

pub struct CounterStore {
    client: ApiClient,
    counters: RwLock<HashMap<(CounterKind, Direction), RegistrationCounter>>,
    in_flight: AtomicUsize,
}

impl CounterStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            counters: RwLock::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Last reading; zero until fetched.
    pub fn get(&self, kind: CounterKind, direction: Direction) -> RegistrationCounter {
        self.counters
            .read()
            .get(&(kind, direction))
            .copied()
            .unwrap_or_default()
    }

    /// GET the counter. A failed fetch leaves a zero reading behind and still
    /// returns the error.
    pub async fn fetch(&self, kind: CounterKind, direction: Direction) -> Result<RegistrationCounter> {
        let path = counter_path(kind, direction);
        let result: Result<Option<RegistrationCounter>> = self.tracked(self.client.get(&path, None)).await;

        let (counter, outcome) = match result {
            Ok(counter) => {
                let counter = counter.unwrap_or_default();
                (counter, Ok(counter))
            }
            Err(e) => {
                tracing::error!(%kind, %direction, "Failed to fetch counter: {}", e);
                (RegistrationCounter::default(), Err(e))
            }
        };
        self.counters.write().insert((kind, direction), counter);
        outcome
    }

    /// Every counter, zero-filled where a fetch failed.
    pub async fn fetch_all(&self) -> Vec<CounterReading> {
        let mut readings = Vec::new();
        for kind in CounterKind::ALL {
            for direction in Direction::ALL {
                let counter = self.fetch(kind, direction).await.unwrap_or_default();
                readings.push(CounterReading {
                    kind,
                    direction,
                    counter,
                });
            }
        }
        readings
    }

    /// POST `.../increment` with `{ number }`, then re-read the counter.
    pub async fn increment(&self, kind: CounterKind, direction: Direction, number: u64) -> Result<RegistrationCounter> {
        self.adjust(kind, direction, "increment", number).await
    }

    /// POST `.../decrement` with `{ number }`, then re-read the counter.
    pub async fn decrement(&self, kind: CounterKind, direction: Direction, number: u64) -> Result<RegistrationCounter> {
        self.adjust(kind, direction, "decrement", number).await
    }

    async fn adjust(
        &self,
        kind: CounterKind,
        direction: Direction,
        action: &str,
        number: u64,
    ) -> Result<RegistrationCounter> {
        if number == 0 {
            return Err(ApiError::Validation("Adjustment must be at least 1".to_string()));
        }
        let path = format!("{}/{}", counter_path(kind, direction), action);
        let body = Body::json(&CounterAdjustment { number })?;
        self.tracked(self.client.post::<Value>(&path, body))
            .await
            .inspect_err(|e| tracing::error!(%kind, %direction, action, "Failed to adjust counter: {}", e))?;
        tracing::info!(%kind, %direction, action, number, "Counter adjusted");
        self.fetch(kind, direction).await
    }

    async fn tracked<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _done = scopeguard::guard(&self.in_flight, |n| {
            n.fetch_sub(1, Ordering::SeqCst);
        });
        fut.await
    }
}
